#![no_main]

use libfuzzer_sys::fuzz_target;
use locktrim_core::lockfile::Lockfile;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let lock = Lockfile::parse(text);
    assert_eq!(lock.to_text(), text);
});
