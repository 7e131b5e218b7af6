//! Frames and the binary media layout.
//!
//! # Binary layout
//!
//! ```text
//! server -> client   +------------------+---------------------+
//!                    | content id (16B) | payload (0..n bytes) |
//!                    +------------------+---------------------+
//!
//! client -> server   +----------------------+
//!                    | payload (1..n bytes) |
//!                    +----------------------+
//! ```
//!
//! The content id is the raw UUID, not its text form. A zero-length frame is
//! never valid, so an empty client payload cannot be framed.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{CodecError, Event, Id, InputMedia, OutputMedia, Result};

/// Length of the content id prefix on server media frames.
pub const ID_LEN: usize = 16;

/// Largest frame accepted by either codec (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Which way a frame travels.
///
/// Only the binary layout depends on it; text frames are self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server (input)
    ClientToServer,
    /// Server to client (output)
    ServerToClient,
}

impl Direction {
    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::ClientToServer => Self::ServerToClient,
            Self::ServerToClient => Self::ClientToServer,
        }
    }
}

/// A frame as handed to or received from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    /// JSON text frame
    Text(String),
    /// Binary media frame
    Binary(Bytes),
}

impl WireFrame {
    /// Frame size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Whether the frame carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn check_size(size: usize) -> Result<()> {
    if size > MAX_FRAME_SIZE {
        return Err(CodecError::FrameTooLarge { size, max: MAX_FRAME_SIZE });
    }
    Ok(())
}

/// Frame a media chunk for the binary channel.
///
/// Server frames require the content id; client frames must not carry one.
pub fn encode_binary(direction: Direction, content_id: Option<Id>, payload: &[u8]) -> Result<Bytes> {
    match (direction, content_id) {
        (Direction::ServerToClient, Some(id)) => {
            check_size(ID_LEN + payload.len())?;
            let mut buf = BytesMut::with_capacity(ID_LEN + payload.len());
            buf.put_slice(id.as_bytes());
            buf.put_slice(payload);
            Ok(buf.freeze())
        },
        (Direction::ServerToClient, None) => {
            Err(CodecError::malformed("server media frames require a content id"))
        },
        (Direction::ClientToServer, None) => {
            if payload.is_empty() {
                return Err(CodecError::EmptyFrame);
            }
            check_size(payload.len())?;
            Ok(Bytes::copy_from_slice(payload))
        },
        (Direction::ClientToServer, Some(_)) => {
            Err(CodecError::malformed("client media frames carry no content id"))
        },
    }
}

/// Decode a binary frame into a media event.
///
/// Server frames shorter than [`ID_LEN`] are `MalformedPayload`; a frame of
/// exactly [`ID_LEN`] bytes is a media event with an empty payload.
pub fn decode_binary(direction: Direction, mut frame: Bytes) -> Result<Event> {
    if frame.is_empty() {
        return Err(CodecError::EmptyFrame);
    }
    check_size(frame.len())?;

    match direction {
        Direction::ClientToServer => Ok(Event::InputMedia(InputMedia { data: frame })),
        Direction::ServerToClient => {
            if frame.len() < ID_LEN {
                return Err(CodecError::MalformedPayload(format!(
                    "server media frame of {} bytes is shorter than the {ID_LEN} byte content id",
                    frame.len()
                )));
            }

            let prefix = frame.split_to(ID_LEN);
            let mut raw = [0u8; ID_LEN];
            raw.copy_from_slice(&prefix);

            Ok(Event::OutputMedia(OutputMedia { content_id: Id::from_bytes(raw), data: frame }))
        },
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const CONTENT: [u8; 16] = hex!("00112233445566778899aabbccddeeff");

    #[test]
    fn server_frame_prefixes_raw_id() {
        let id = Id::from_bytes(CONTENT);
        let frame = encode_binary(Direction::ServerToClient, Some(id), b"abc").unwrap();

        assert_eq!(&frame[..ID_LEN], &CONTENT);
        assert_eq!(&frame[ID_LEN..], b"abc");
    }

    #[test]
    fn server_frame_with_empty_payload_decodes() {
        let frame = Bytes::copy_from_slice(&CONTENT);
        let event = decode_binary(Direction::ServerToClient, frame).unwrap();

        assert_eq!(
            event,
            Event::OutputMedia(OutputMedia { content_id: Id::from_bytes(CONTENT), data: Bytes::new() })
        );
    }

    #[test]
    fn short_server_frame_is_malformed() {
        let frame = Bytes::copy_from_slice(&CONTENT[..15]);
        let result = decode_binary(Direction::ServerToClient, frame);
        assert!(matches!(result, Err(CodecError::MalformedPayload(_))));
    }

    #[test]
    fn empty_frame_rejected_both_directions() {
        for direction in [Direction::ClientToServer, Direction::ServerToClient] {
            assert_eq!(decode_binary(direction, Bytes::new()), Err(CodecError::EmptyFrame));
        }
    }

    #[test]
    fn client_frame_is_bare_payload() {
        let frame = encode_binary(Direction::ClientToServer, None, &hex!("deadbeef")).unwrap();
        assert_eq!(&frame[..], &hex!("deadbeef"));

        let event = decode_binary(Direction::ClientToServer, frame).unwrap();
        assert_eq!(
            event,
            Event::InputMedia(InputMedia { data: Bytes::copy_from_slice(&hex!("deadbeef")) })
        );
    }

    #[test]
    fn empty_client_payload_cannot_be_framed() {
        let result = encode_binary(Direction::ClientToServer, None, &[]);
        assert_eq!(result, Err(CodecError::EmptyFrame));
    }

    #[test]
    fn id_presence_must_match_direction() {
        let id = Id::from_bytes(CONTENT);
        assert!(matches!(
            encode_binary(Direction::ClientToServer, Some(id), b"x"),
            Err(CodecError::MalformedPayload(_))
        ));
        assert!(matches!(
            encode_binary(Direction::ServerToClient, None, b"x"),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn oversized_frame_rejected() {
        let frame = Bytes::from(vec![0u8; MAX_FRAME_SIZE + 1]);
        let result = decode_binary(Direction::ClientToServer, frame);
        assert!(matches!(result, Err(CodecError::FrameTooLarge { .. })));
    }

    #[test]
    fn direction_reverses() {
        assert_eq!(Direction::ClientToServer.reverse(), Direction::ServerToClient);
        assert_eq!(Direction::ServerToClient.reverse(), Direction::ClientToServer);
    }
}
