#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are not
    if let Ok((payload, format)) = wavjoin_core::decode(data) {
        assert!(payload.len() <= data.len());
        assert!(format.is_pcm());

        let wav = wavjoin_core::to_wav(&payload, &format).expect("decoded payload fits a header");
        let (again, reparsed) = wavjoin_core::decode(&wav).expect("rebuilt WAV parses");
        assert_eq!(again, payload);
        assert_eq!(reparsed, format.normalized());
    }
});
