//! Fuzz target: `Message::decode`
//!
//! Feeds arbitrary radio payloads to the decoder.  Decoding must never
//! panic, and anything it accepts must encode back into a payload that
//! decodes to the same message.
//!
//! cargo fuzz run fuzz_wire_decode

#![no_main]

use homenet::transport::wire::Message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = Message::decode(data) {
        let payload = message.encode().expect("decoded message must re-encode");
        assert_eq!(Message::decode(&payload), Ok(message));
    }
});
