#![no_main]

//! Fuzz target for inbound game coordinator packet decoding.
//!
//! Malformed envelopes and truncated GC headers must come back as errors,
//! never panics.

use libfuzzer_sys::fuzz_target;
use prost::Message;
use steamgen_gc::{CMsgGcClient, GcPacket, PROTO_MASK};

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = CMsgGcClient::decode(data) {
        let _ = GcPacket::from_envelope(&envelope);
    }

    // Also feed the raw bytes as a payload under both header kinds.
    for msgtype in [4004, 4006 | PROTO_MASK] {
        let envelope = CMsgGcClient {
            appid: Some(440),
            msgtype: Some(msgtype),
            payload: Some(data.to_vec().into()),
            ..CMsgGcClient::default()
        };
        let _ = GcPacket::from_envelope(&envelope);
    }
});
