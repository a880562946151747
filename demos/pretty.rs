extern crate pullxml;

use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<_> = env::args().collect();

    if args.len() != 2 {
        println!("Usage:\n\tcargo run --example pretty -- input.xml");
        process::exit(1);
    }

    let text = fs::read_to_string(&args[1]).unwrap();
    let doc = match pullxml::Document::parse(&text) {
        Ok(v) => v,
        Err(e) => {
            println!("Error: {}.", e);
            process::exit(1);
        }
    };

    let root = match doc.root() {
        Some(root) => root,
        None => return,
    };

    let mut writer = pullxml::TextWriter::with_indent(String::new(), "  ");
    if let Err(e) = writer.write_node(root) {
        println!("Error: {}.", e);
        process::exit(1);
    }

    match writer.into_string() {
        Ok(s) => println!("{}", s),
        Err(e) => println!("Error: {}.", e),
    }
}
