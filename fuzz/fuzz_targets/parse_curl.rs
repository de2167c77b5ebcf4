#![no_main]

use libfuzzer_sys::fuzz_target;
use restqa_adapters::{CurlRequest, split_command};

fuzz_target!(|cmd: &str| {
    if let Ok(args) = split_command(cmd) {
        if let Ok(req) = CurlRequest::parse(&args) {
            assert_eq!(req.method, req.method.to_ascii_uppercase());
        }
    }
});
