#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = zendib::Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };

    // Header parsing and full decode must never panic
    let _ = zendib::probe(data);
    let _ = zendib::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable);
});
