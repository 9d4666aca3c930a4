#![no_main]
use libfuzzer_sys::fuzz_target;
use lulab_tex::sanitize_unicode_math;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let once = sanitize_unicode_math(&s);
    assert_eq!(sanitize_unicode_math(&once), once);
});
