extern crate pullxml;

use std::collections::HashSet;
use std::fs;
use std::env;
use std::io::Read;
use std::process;

use pullxml::{NodeKind, Reader};

fn main() {
    let args: Vec<_> = env::args().collect();

    if args.len() != 2 {
        println!("Usage:\n\tcargo run --example stats -- input.xml");
        process::exit(1);
    }

    let text = load_file(&args[1]);

    let mut elements = 0;
    let mut attrs_count = 0;
    let mut max_depth = 0;
    let mut comments = Vec::new();
    let mut uris = HashSet::new();

    let mut reader = Reader::from(text.as_str());
    loop {
        match reader.read() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                println!("Error: {}.", e);
                process::exit(1);
            }
        }

        match reader.node_kind() {
            NodeKind::Element => {
                elements += 1;
                attrs_count += reader.attributes().len();
                max_depth = max_depth.max(reader.depth());

                for attr in reader.attributes() {
                    if attr.name() == "xmlns" || attr.prefix() == "xmlns" {
                        uris.insert((attr.local_name().to_string(), attr.value().to_string()));
                    }
                }
            }
            NodeKind::Comment => comments.push(reader.value().to_string()),
            _ => {}
        }
    }

    println!("Elements count: {}", elements);
    println!("Attributes count: {}", attrs_count);
    println!("Max depth: {}", max_depth);

    println!("Unique namespaces count: {}", uris.len());
    if !uris.is_empty() {
        println!("Unique namespaces:");
        for (key, value) in uris {
            println!("  {:?}: {}", key, value);
        }
    }

    println!("Comments count: {}", comments.len());

    println!("Comments:");
    for comment in comments {
        println!("{:?}", comment);
    }
}

fn load_file(path: &str) -> String {
    let mut file = fs::File::open(&path).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}
