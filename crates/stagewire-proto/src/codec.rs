//! Text codec and frame routing.
//!
//! Text frames are flat JSON objects: the payload's fields plus the integer
//! `event_type` discriminant. The decoder reads the discriminant first and
//! only then deserialises the remaining fields into the matching payload.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    CodecError, Direction, Event, EventType, Result, WireFrame, decode_binary, encode_binary,
    frame::check_size,
};

/// Field carrying the discriminant in every text frame.
const DISCRIMINANT: &str = "event_type";

/// Encode a structured event as a JSON text frame.
///
/// Media events are rejected with [`CodecError::BinaryOnly`]; use [`encode`]
/// to route them to the binary channel. NaN and infinite numbers are rejected
/// with [`CodecError::MalformedPayload`].
pub fn encode_text(event: &Event) -> Result<String> {
    let mut object = match event {
        Event::Config(config) => {
            ensure_finite(config.silence_duration)?;
            to_object(config)?
        },
        Event::InputText(input) => to_object(input)?,
        Event::Interrupt(interrupt) => to_object(interrupt)?,
        Event::Ready(ready) => to_object(ready)?,
        Event::Transcription(transcription) => {
            ensure_finite(transcription.segments.iter().flat_map(|s| [s.start, s.end]))?;
            to_object(transcription)?
        },
        Event::Stage(stage) => to_object(stage)?,
        Event::Content(content) => to_object(content)?,
        Event::ContentAddition(addition) => to_object(addition)?,
        Event::OutputText(text) => to_object(text)?,
        Event::OutputFunctionCall(call) => to_object(call)?,
        Event::InputEnd | Event::OutputEnd | Event::SessionEnd => Map::new(),
        Event::InputMedia(_) | Event::OutputMedia(_) => {
            return Err(CodecError::BinaryOnly(event.event_type()));
        },
    };

    object.insert(DISCRIMINANT.to_owned(), Value::from(event.event_type().to_u8()));

    let text = serde_json::to_string(&Value::Object(object)).map_err(CodecError::malformed)?;
    check_size(text.len())?;
    Ok(text)
}

/// Decode a JSON text frame.
///
/// # Errors
///
/// - `FrameTooLarge` before any parsing
/// - `MalformedPayload` for invalid JSON, non-object frames, schema mismatch,
///   or a media discriminant
/// - `MissingDiscriminant` when `event_type` is absent or null
/// - `UnknownDiscriminant` when it is not a known integer
pub fn decode_text(text: &str) -> Result<Event> {
    check_size(text.len())?;

    let value: Value = serde_json::from_str(text).map_err(CodecError::malformed)?;
    let Value::Object(mut object) = value else {
        return Err(CodecError::malformed("text frame is not a JSON object"));
    };

    let event_type = match object.remove(DISCRIMINANT) {
        None | Some(Value::Null) => return Err(CodecError::MissingDiscriminant),
        Some(raw) => raw
            .as_u64()
            .and_then(EventType::from_u64)
            .ok_or_else(|| CodecError::UnknownDiscriminant(raw.to_string()))?,
    };

    let payload = Value::Object(object);
    let event = match event_type {
        EventType::Config => Event::Config(from_payload(payload)?),
        EventType::InputText => Event::InputText(from_payload(payload)?),
        EventType::InputEnd => Event::InputEnd,
        EventType::Interrupt => Event::Interrupt(from_payload(payload)?),
        EventType::Ready => Event::Ready(from_payload(payload)?),
        EventType::Transcription => Event::Transcription(from_payload(payload)?),
        EventType::Stage => Event::Stage(from_payload(payload)?),
        EventType::Content => Event::Content(from_payload(payload)?),
        EventType::ContentAddition => Event::ContentAddition(from_payload(payload)?),
        EventType::OutputText => Event::OutputText(from_payload(payload)?),
        EventType::OutputFunctionCall => Event::OutputFunctionCall(from_payload(payload)?),
        EventType::OutputEnd => Event::OutputEnd,
        EventType::SessionEnd => Event::SessionEnd,
        EventType::InputMedia | EventType::OutputMedia => {
            return Err(CodecError::MalformedPayload(format!(
                "{event_type:?} events travel on the binary channel"
            )));
        },
    };

    Ok(event)
}

/// Encode any event onto the channel it belongs to.
pub fn encode(event: &Event) -> Result<WireFrame> {
    match event {
        Event::InputMedia(media) => {
            encode_binary(Direction::ClientToServer, None, &media.data).map(WireFrame::Binary)
        },
        Event::OutputMedia(media) => {
            encode_binary(Direction::ServerToClient, Some(media.content_id), &media.data)
                .map(WireFrame::Binary)
        },
        _ => encode_text(event).map(WireFrame::Text),
    }
}

/// Decode a frame received from a peer travelling in `direction`.
pub fn decode(direction: Direction, frame: WireFrame) -> Result<Event> {
    match frame {
        WireFrame::Text(text) => decode_text(&text),
        WireFrame::Binary(bytes) => decode_binary(direction, bytes),
    }
}

/// JSON has no representation for NaN or infinities.
fn ensure_finite(values: impl IntoIterator<Item = f64>) -> Result<()> {
    match values.into_iter().find(|value| !value.is_finite()) {
        Some(value) => Err(CodecError::MalformedPayload(format!("non-finite number {value}"))),
        None => Ok(()),
    }
}

fn to_object<T: Serialize>(payload: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(payload).map_err(CodecError::malformed)? {
        Value::Object(object) => Ok(object),
        other => Err(CodecError::MalformedPayload(format!(
            "payload serialised to a non-object: {other}"
        ))),
    }
}

fn from_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(CodecError::malformed)
}
