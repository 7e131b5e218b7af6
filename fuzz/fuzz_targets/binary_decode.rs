//! Binary frames in either direction must decode or fail cleanly.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use stagewire_proto::{Direction, WireFrame, decode_binary, encode};

fuzz_target!(|data: &[u8]| {
    for direction in [Direction::ClientToServer, Direction::ServerToClient] {
        let Ok(event) = decode_binary(direction, Bytes::copy_from_slice(data)) else {
            continue;
        };

        let frame = encode(&event).expect("decoded media must re-encode");
        assert_eq!(frame, WireFrame::Binary(Bytes::copy_from_slice(data)));
    }
});
