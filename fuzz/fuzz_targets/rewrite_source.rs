#![no_main]

//! Fuzz target for the generated-source rewrite pass.
//!
//! Arbitrary text must be either rejected with an error or rewritten, and a
//! rewritten file that parses again must be stable under a second pass.

use camino::Utf8Path;
use libfuzzer_sys::fuzz_target;
use steamgen_rewrite::{RewriteRules, rewrite};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let rules = RewriteRules::default();
    let target = Utf8Path::new("protocol/protobuf/steam/client_server.pb.go");
    let Ok(first) = rewrite(s, target, &rules) else {
        return;
    };
    if let Ok(second) = rewrite(&first.text, target, &rules) {
        assert_eq!(first.text, second.text);
    }
});
