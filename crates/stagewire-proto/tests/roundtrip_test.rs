//! Property tests for the wire codec.
//!
//! Every constructible event must survive `decode(encode(e))` unchanged, on
//! whichever channel it belongs to, and arbitrary bytes must never make either
//! decoder panic.

use bytes::Bytes;
use proptest::prelude::*;
use serde_json::{Map, Value};
use stagewire_proto::{
    AudioFormat, CodecError, Config, Content, ContentAddition, ContentKind, Direction, Event, Id,
    InputMedia, InputMode, InputText, Interrupt, InterruptType, OutputFunctionCall, OutputMedia,
    OutputText, Ready, Segment, Stage, Transcription, VideoFormat, WireFrame, decode, decode_binary,
    decode_text, encode,
};

fn id_strategy() -> impl Strategy<Value = Id> {
    any::<u128>().prop_map(Id::from_u128)
}

/// Every finite float, down to subnormals.
fn seconds_strategy() -> impl Strategy<Value = f64> {
    use proptest::num::f64::{NEGATIVE, NORMAL, POSITIVE, SUBNORMAL, ZERO};
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

fn audio_format_strategy() -> impl Strategy<Value = AudioFormat> {
    (1u16..8, 8_000u32..96_000, 1u16..5).prop_map(|(nchannels, sample_rate, sample_width)| {
        AudioFormat { nchannels, sample_rate, sample_width }
    })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop_oneof![Just(InputMode::Audio), Just(InputMode::Text)],
        proptest::option::of(id_strategy()),
        any::<(bool, bool, bool)>(),
        proptest::option::of(seconds_strategy()),
        audio_format_strategy(),
    )
        .prop_map(|(input_mode, chat_id, (output_text, output_audio, output_video), silence_duration, audio)| {
            Config { input_mode, chat_id, output_text, output_audio, output_video, silence_duration, audio }
        })
}

fn kind_strategy() -> impl Strategy<Value = ContentKind> {
    prop_oneof![
        Just(ContentKind::Text),
        Just(ContentKind::FunctionCall),
        audio_format_strategy().prop_map(ContentKind::Audio),
        (1u32..120, 1u32..4096, 1u32..4096)
            .prop_map(|(fps, width, height)| ContentKind::Video(VideoFormat { fps, width, height })),
    ]
}

fn metadata_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..4).prop_map(|entries| {
        entries.into_iter().map(|(key, value)| (key, Value::from(value))).collect()
    })
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        config_strategy().prop_map(Event::Config),
        ".*".prop_map(|data| Event::InputText(InputText { data })),
        prop::collection::vec(any::<u8>(), 1..256)
            .prop_map(|data| Event::InputMedia(InputMedia { data: Bytes::from(data) })),
        Just(Event::InputEnd),
        prop_oneof![Just(InterruptType::User), Just(InterruptType::System)]
            .prop_map(|interrupt_type| Event::Interrupt(Interrupt { interrupt_type })),
        (id_strategy(), id_strategy())
            .prop_map(|(chat_id, request_id)| Event::Ready(Ready { chat_id, request_id })),
        prop::collection::vec(
            (".*", seconds_strategy(), seconds_strategy())
                .prop_map(|(text, start, end)| Segment { text, start, end }),
            0..4
        )
        .prop_map(|segments| Event::Transcription(Transcription { segments })),
        (id_strategy(), proptest::option::of(id_strategy()), ".*", ".*").prop_map(
            |(id, parent_id, title, description)| {
                Event::Stage(Stage { id, parent_id, title, description })
            }
        ),
        (id_strategy(), id_strategy(), kind_strategy())
            .prop_map(|(id, stage_id, kind)| Event::Content(Content { id, stage_id, kind })),
        (id_strategy(), metadata_strategy()).prop_map(|(content_id, metadata)| {
            Event::ContentAddition(ContentAddition { content_id, metadata })
        }),
        (id_strategy(), ".*")
            .prop_map(|(content_id, data)| Event::OutputText(OutputText { content_id, data })),
        (id_strategy(), prop::collection::vec(any::<u8>(), 0..256)).prop_map(|(content_id, data)| {
            Event::OutputMedia(OutputMedia { content_id, data: Bytes::from(data) })
        }),
        (id_strategy(), ".*").prop_map(|(content_id, data)| {
            Event::OutputFunctionCall(OutputFunctionCall { content_id, data })
        }),
        Just(Event::OutputEnd),
        Just(Event::SessionEnd),
    ]
}

/// Direction a frame carrying `event` travels in.
fn direction_of(event: &Event) -> Direction {
    match event {
        Event::InputMedia(_) => Direction::ClientToServer,
        _ => Direction::ServerToClient,
    }
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(event in event_strategy()) {
        let frame = encode(&event).unwrap();
        prop_assert_eq!(matches!(frame, WireFrame::Binary(_)), event.event_type().is_binary());

        let decoded = decode(direction_of(&event), frame).unwrap();
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn prop_server_media_frame_length(
        content_id in id_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..1024)
    ) {
        let event = Event::OutputMedia(OutputMedia { content_id, data: Bytes::from(payload.clone()) });
        let WireFrame::Binary(frame) = encode(&event).unwrap() else {
            return Err(TestCaseError::fail("media must use the binary channel"));
        };

        prop_assert_eq!(frame.len(), 16 + payload.len());
        prop_assert_eq!(&frame[..16], content_id.as_bytes().as_slice());
    }

    #[test]
    fn prop_text_decoder_never_panics(text in ".*") {
        let _ = decode_text(&text);
    }

    #[test]
    fn prop_binary_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for direction in [Direction::ClientToServer, Direction::ServerToClient] {
            let result = decode_binary(direction, Bytes::from(bytes.clone()));
            match (direction, bytes.len()) {
                (_, 0) => prop_assert_eq!(result, Err(CodecError::EmptyFrame)),
                (Direction::ServerToClient, 1..=15) => {
                    prop_assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
                },
                _ => prop_assert!(result.is_ok()),
            }
        }
    }

    #[test]
    fn prop_discriminant_dispatch(value in 0u64..64) {
        let text = format!("{{\"event_type\":{value}}}");
        match decode_text(&text) {
            Err(CodecError::UnknownDiscriminant(raw)) => {
                prop_assert!(value > 14);
                prop_assert_eq!(raw, value.to_string());
            },
            // Unit variants decode from the bare discriminant; the rest need fields.
            Ok(event) => prop_assert_eq!(u64::from(event.event_type().to_u8()), value),
            Err(CodecError::MalformedPayload(_)) => prop_assert!(value <= 14),
            Err(other) => return Err(TestCaseError::fail(format!("unexpected {other}"))),
        }
    }
}

#[test]
fn empty_server_payload_roundtrips() {
    let event = Event::OutputMedia(OutputMedia { content_id: Id::from_u128(9), data: Bytes::new() });
    let frame = encode(&event).unwrap();
    assert_eq!(frame.len(), 16);
    assert_eq!(decode(Direction::ServerToClient, frame).unwrap(), event);
}

#[test]
fn empty_client_payload_is_not_encodable() {
    let event = Event::InputMedia(InputMedia { data: Bytes::new() });
    assert_eq!(encode(&event), Err(CodecError::EmptyFrame));
}
