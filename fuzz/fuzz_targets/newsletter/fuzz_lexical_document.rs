// Run with: cargo fuzz run fuzz_lexical_document
#![no_main]

use ghostcron::domain::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(document) = Document::from_json(json) {
        let serialized = document.to_json().expect("parsed document must serialize");
        let reparsed = Document::from_json(&serialized).expect("serialized document must parse");
        assert_eq!(reparsed, document);
    }
});
