//! Arbitrary client frames must never panic the server, change its phase
//! when rejected, or leave it accepting output it should refuse.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use stagewire_core::{Completion, Transport, TransportError};
use stagewire_proto::{Event, WireFrame};
use stagewire_server::{Server, ServerOptions};

struct Discard;

impl Transport for Discard {
    fn send_text(&mut self, _: String) -> Result<Option<Completion>, TransportError> {
        Ok(None)
    }

    fn send_bytes(&mut self, _: Bytes) -> Result<Option<Completion>, TransportError> {
        Ok(None)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut server = Server::new(Discard, ServerOptions::default(), Box::new(|_: &Event| {}));

    // Frames are separated by 0xff; a leading 0 byte marks a binary frame
    for chunk in data.split(|byte| *byte == 0xff) {
        let frame = match chunk.split_first() {
            Some((0, rest)) => WireFrame::Binary(Bytes::copy_from_slice(rest)),
            _ => WireFrame::Text(String::from_utf8_lossy(chunk).into_owned()),
        };
        let before = server.state().request().phase();
        if server.receive(frame).is_err() {
            assert_eq!(server.state().request().phase(), before);
        }
    }

    if !server.state().request().input_ended() {
        assert!(server.end().is_err());
    }
});
