#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let descriptor = String::from_utf8_lossy(data);
    let format = wavjoin_core::resolve(&descriptor);
    assert_eq!(format.num_channels, 1);
    assert!(format.sample_rate > 0);
    assert!(format.bits_per_sample > 0 && format.bits_per_sample % 8 == 0);
});
