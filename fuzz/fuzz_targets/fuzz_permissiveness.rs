#![no_main]
use libfuzzer_sys::fuzz_target;
use zendib::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };
    let decode_at = |level| {
        DecodeRequest::new(data)
            .with_limits(&limits)
            .with_permissiveness(level)
            .decode(enough::Unstoppable)
    };

    // Each level only relaxes the one above it: whatever a stricter level
    // accepts, a looser one accepts with identical pixels.
    let strict = decode_at(Permissiveness::Strict);
    let standard = decode_at(Permissiveness::Standard);
    let permissive = decode_at(Permissiveness::Permissive);

    if let Ok(strict) = &strict {
        let standard = standard.as_ref().expect("Strict accepted but Standard rejected");
        assert_eq!(strict.pixels(), standard.pixels());
    }
    if let Ok(standard) = &standard {
        let permissive = permissive.as_ref().expect("Standard accepted but Permissive rejected");
        assert_eq!(standard.pixels(), permissive.pixels());

        let info = probe(data).expect("decodable data must probe");
        assert_eq!((info.width, info.height), (standard.width, standard.height));
    }
});
