extern crate afl;
extern crate pullxml;

use std::str;

use afl::fuzz;

fn main() {
    fuzz(|data| {
        if let Ok(text) = str::from_utf8(data) {
            let doc = match pullxml::Document::parse(&text) {
                Ok(doc) => doc,
                Err(_) => return,
            };

            // Serialized text must parse back into the same text.
            if let Some(root) = doc.root() {
                let xml = root.to_xml_string();
                let doc2 = pullxml::Document::parse(&xml).unwrap();
                assert_eq!(doc2.root().map(|n| n.to_xml_string()), Some(xml));
            }
        }
    });
}
