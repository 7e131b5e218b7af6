//! Text frames must decode or fail cleanly, and whatever decodes must
//! re-encode to a frame that decodes to the same event.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stagewire_proto::{decode_text, encode_text};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(event) = decode_text(text) else {
        return;
    };

    let encoded = encode_text(&event).expect("decoded event must re-encode");
    let again = decode_text(&encoded).expect("re-encoded event must decode");
    assert_eq!(again, event);
});
