#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the complete pipeline: byte decoding -> XML tree -> scene walk
    if let Ok(text) = xaml3d::xml::decode_document(data) {
        let _ = xaml3d::parse_str(&text);
    }
});
