extern crate pullxml;
extern crate xmlparser;
#[macro_use] extern crate pretty_assertions;

use pullxml::*;

fn well_formed(text: &str) {
    for token in xmlparser::Tokenizer::from(text) {
        if let Err(e) = token {
            panic!("'{}' is malformed: {}", text, e);
        }
    }
}

#[test]
fn write_element_root() {
    let mut w = TextWriter::new(String::new());
    w.start_element("Header").unwrap()
     .write_element("DocDate", "28.07.2016").unwrap()
     .end_element().unwrap();

    let text = w.into_string().unwrap();
    well_formed(&text);

    let doc = Document::parse(&text).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Element);
    assert_eq!(root.name(), "Header");
    assert_eq!(root.children().count(), 1);
    assert_eq!(root.to_xml_string(), text);
}

#[test]
fn write_document_root() {
    let mut w = TextWriter::new(String::new());
    w.start_document("1.0", "utf-8").unwrap()
     .start_element("Root").unwrap()
     .write_attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance").unwrap()
     .start_element("Header").unwrap()
     .write_attribute("standalone", "no").unwrap()
     .write_element("Description", "Cake with grapes 300g").unwrap()
     .write_element("DocDate", "28.07.2016").unwrap()
     .end_element().unwrap()
     .end_element().unwrap()
     .end_document().unwrap();

    let text = w.into_string().unwrap();
    well_formed(&text);
    assert_eq!(text, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
<Root xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<Header standalone=\"no\"><Description>Cake with grapes 300g</Description>\
<DocDate>28.07.2016</DocDate></Header></Root>");

    let doc = Document::parse(&text).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Document);
    assert_eq!(root.to_xml_string(), text);
}

#[test]
fn standalone_declaration() {
    let mut w = TextWriter::new(String::new());
    w.start_document_standalone("", "", Some(true)).unwrap()
     .write_element("a", "").unwrap();

    assert_eq!(w.as_str(), "<?xml version=\"1.0\" standalone=\"yes\"?><a></a>");
    well_formed(w.as_str());
}

#[test]
fn second_doctype() {
    let mut w = TextWriter::new(String::new());
    w.write_document_type("a", None, None, None).unwrap();

    let err = w.write_document_type("a", None, None, None).err().unwrap();
    assert_eq!(err, Error::InvalidFormat("DOCTYPE is already written", 0));
    assert_eq!(w.as_str(), "<!DOCTYPE a>");
}

#[test]
fn doctype_inside_element() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap();
    let err = w.write_document_type("a", None, None, None).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[test]
fn doctype_public_without_system() {
    let mut w = TextWriter::new(String::new());
    let err = w.write_document_type("a", Some("-//A//EN"), None, None).err().unwrap();
    assert_eq!(err, Error::InvalidArgument("system_id"));
}

#[test]
fn meta_inside_element() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap();
    let err = w.write_meta("pi", "data").err().unwrap();
    assert_eq!(err, Error::InvalidFormat("meta inside an element", 1));
}

#[test]
fn meta_attributes() {
    let mut w = TextWriter::new(String::new());
    w.start_meta("style").unwrap()
     .write_attribute("href", "a.css").unwrap()
     .write_string(" ").unwrap();

    let err = w.start_attribute("type").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);

    w.end_meta().unwrap();
    assert_eq!(w.as_str(), "<?style href=\"a.css\" ?>");
}

#[test]
fn namespace_conflict() {
    let mut w = TextWriter::new(String::new());
    w.start_element_ns("n", "a", "http://a").unwrap();

    let err = w.start_element_ns("n", "b", "http://b").err().unwrap();
    assert_eq!(err, Error::NamespaceConflict { prefix: "n".to_string(), uri: "http://b".to_string() });
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = w.write_attribute("xmlns:n", "http://c").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn namespace_attribute() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap()
     .write_attribute_ns("x", "b", "http://x", "1").unwrap()
     .write_element_ns("x", "c", "http://x", "").unwrap();

    let text = w.into_string().unwrap();
    assert_eq!(text, "<a xmlns:x=\"http://x\" x:b=\"1\"><x:c></x:c></a>");
    well_formed(&text);
}

#[test]
fn text_outside_root() {
    let mut w = TextWriter::new(String::new());
    let err = w.write_string("text").err().unwrap();
    assert_eq!(err, Error::UnexpectedContent("text outside of the root element"));

    w.write_element("a", "").unwrap();
    assert!(w.write_string("tail").is_err());
}

#[test]
fn attribute_after_content() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap().write_string("text").unwrap();

    let err = w.start_attribute("b").err().unwrap();
    assert_eq!(err, Error::InvalidFormat("attribute outside of a start tag", 1));
}

#[test]
fn nested_comment() {
    let mut w = TextWriter::new(String::new());
    w.start_comment().unwrap();

    let err = w.start_comment().err().unwrap();
    assert_eq!(err, Error::InvalidFormat("comment is already open", 0));
    assert!(w.start_element("a").is_err());
    assert!(w.end_cdata().is_err());

    w.end_comment().unwrap();
    assert_eq!(w.as_str(), "<!---->");
}

#[test]
fn mixed_content_indent() {
    let mut w = TextWriter::with_indent(String::new(), "\t");
    w.start_element("a").unwrap()
     .start_element("b").unwrap()
     .write_string("x").unwrap()
     .write_element("i", "y").unwrap()
     .write_string("z").unwrap()
     .end_element().unwrap()
     .write_cdata("c").unwrap();

    let text = w.into_string().unwrap();
    assert_eq!(text, "<a>\n\t<b>x<i>y</i>z</b><![CDATA[c]]></a>");
    well_formed(&text);
}

#[test]
fn flush_closes_elements() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap().start_element("b").unwrap().write_string("t").unwrap();
    assert_eq!(w.depth(), 2);

    w.flush().unwrap();
    assert_eq!(w.depth(), 0);
    assert_eq!(w.as_str(), "<a><b>t</b></a>");
}

#[test]
fn write_node_01() {
    let data = "<?xml version=\"1.0\"?><!--c--><a x=\"1\">\
<b>t &amp; u</b><c></c><d/><![CDATA[<x>]]></a>";

    let doc = Document::parse(data).unwrap();
    let root = doc.root().unwrap();

    let mut w = TextWriter::new(String::new());
    w.write_node(root).unwrap();

    let text = w.into_string().unwrap();
    well_formed(&text);
    assert_eq!(text, root.to_xml_string());
    assert_eq!(Document::parse(&text).unwrap(), doc);
}

#[test]
fn write_node_text_outside_root() {
    let mut doc = Document::new();
    let text = doc.create_node(NodeKind::Text, "", Some("t")).unwrap();
    doc.set_root(text);

    let mut w = TextWriter::new(String::new());
    let err = w.write_node(doc.root().unwrap()).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn custom_sink() {
    struct Chunks(Vec<String>);

    impl Sink for Chunks {
        fn emit(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
    }

    let mut w = Writer::new(Chunks(Vec::new()));
    w.write_element("a", "b").unwrap();
    assert_eq!(w.into_sink().0.concat(), "<a>b</a>");
}

#[test]
fn unterminated_markup() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap()
     .end_element().unwrap()
     .start_comment().unwrap()
     .write_string("note").unwrap();
    assert_eq!(w.into_string().err(), Some(Error::InvalidFormat("unterminated markup", 0)));

    let mut w = TextWriter::new(String::new());
    w.start_meta("pi").unwrap().write_attribute("x", "1").unwrap();
    assert_eq!(w.flush().err().map(|e| e.kind()), Some(ErrorKind::InvalidFormat));

    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap().start_cdata().unwrap();
    assert!(w.into_string().is_err());
}

#[test]
fn write_node_quotes() {
    let doc = Document::parse("<a x='\"' y=\"'\" z='&quot;&lt;'/>").unwrap();
    let root = doc.root().unwrap();

    let mut w = TextWriter::new(String::new());
    w.write_node(root).unwrap();

    let text = w.into_string().unwrap();
    assert_eq!(text, "<a x='\"' y=\"'\" z=\"&quot;&lt;\"/>");
    assert_eq!(text, root.to_xml_string());
    well_formed(&text);
}

#[test]
fn whitespace_text() {
    let mut w = TextWriter::new(String::new());
    w.start_element("a").unwrap()
     .write_string(" ").unwrap()
     .write_element("b", "").unwrap()
     .end_element().unwrap();

    let text = w.into_string().unwrap();
    assert_eq!(text, "<a> <b></b></a>");

    let opt = ReaderOptions {
        ignore_whitespace: false,
        .. ReaderOptions::default()
    };
    let doc = Document::parse_with_options(&text, opt).unwrap();
    assert_eq!(doc.root().unwrap().to_xml_string(), text);

    let doc = Document::parse(&text).unwrap();
    assert_eq!(doc.root().unwrap().to_xml_string(), "<a><b></b></a>");
}
