extern crate pullxml;
#[macro_use] extern crate pretty_assertions;

use pullxml::*;

#[test]
fn parse_element_root() {
    let data = "<Header><DocDate>28.07.2016</DocDate></Header>";

    let doc = Document::parse(data).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Element);
    assert_eq!(root.name(), "Header");
    assert_eq!(root.children().count(), 1);
    assert_eq!(root.to_xml_string(), data);
    assert_eq!(root.to_string(), data);
}

#[test]
fn parse_document_root() {
    let data = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
<Root xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<Header standalone=\"no\"><Description>Cake with grapes 300g</Description>\
<DocDate>28.07.2016</DocDate></Header></Root>";

    let doc = Document::parse(data).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Document);
    assert_eq!(root.to_xml_string(), data);

    let decl = root.first_child().unwrap();
    assert_eq!(decl.kind(), NodeKind::XmlDeclaration);
    assert_eq!(decl.attribute("encoding"), Some("utf-8"));

    let header = root.search("header", 1).unwrap();
    assert_eq!(header.attribute("standalone"), Some("no"));
    assert_eq!(header.parent().unwrap().name(), "Root");
    assert_eq!(header.lookup_namespace_uri("xsi"), Some("http://www.w3.org/2001/XMLSchema-instance"));
}

#[test]
fn parse_empty() {
    let doc = Document::parse("").unwrap();
    assert!(doc.root().is_none());
    assert_eq!(format!("{:?}", doc), "Document []");

    let doc = Document::parse("  \n  ").unwrap();
    assert!(doc.root().is_none());
}

#[test]
fn parse_error() {
    let err = Document::parse("<a x='<'/>").unwrap_err();
    assert_eq!(err, Error::UnexpectedToken("<".to_string(), TextPos::new(1, 7)));
    assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn parse_with_options_01() {
    let data = "<!--c--><a> <b/> </a>";

    let opt = ReaderOptions {
        ignore_comments: true,
        ignore_whitespace: false,
        .. ReaderOptions::default()
    };

    let doc = Document::parse_with_options(data, opt).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Element);
    assert_eq!(root.to_xml_string(), "<a> <b/> </a>");

    let kinds: Vec<NodeKind> = root.children().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Whitespace, NodeKind::Element, NodeKind::Whitespace]);
}

#[test]
fn from_reader_01() {
    let reader = Reader::new(StrSource::with_offset("<x/><a>text</a>", 4));
    let doc = Document::from_reader(reader).unwrap();
    assert_eq!(doc.root().unwrap().to_xml_string(), "<a>text</a>");
}

#[test]
fn duplicated_attribute() {
    let doc = Document::parse("<a x=\"1\" x=\"2\"/>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.attributes().len(), 1);
    assert_eq!(root.attribute("x"), Some("1"));
}

#[test]
fn round_trip_01() {
    let data = "\
<?xml version='1.0'?>
<!DOCTYPE note [<!ENTITY w \"World\">]>
<!-- prolog -->
<note a='&quot;' b=\"'\">
    <to>Tove &amp; &w;</to>
    <body><![CDATA[<hello>]]><?pi x?></body>
    <empty></empty>
    <closed/>
</note>
";

    let doc = Document::parse(data).unwrap();
    let text = doc.root().unwrap().to_xml_string();
    let doc2 = Document::parse(&text).unwrap();
    assert_eq!(doc2.root().unwrap().to_xml_string(), text);
    assert_eq!(doc2, doc);
}

#[test]
fn debug_01() {
    let doc = Document::parse("<a x='1'><b/>text</a>").unwrap();
    assert_eq!(format!("{:?}", doc), "\
Document [
    Element {
        name: \"a\"
        value: \"\"
        attributes: [
            Attribute { name: \"x\", value: \"1\" }
        ]
        children: [
            Element { name: \"b\", value: None }
            Text(\"text\")
        ]
    }
]
");
}

#[test]
fn create_node_errors() {
    let mut doc = Document::new();
    assert_eq!(doc.create_node(NodeKind::EndElement, "a", None),
               Err(Error::InvalidNodeKind(NodeKind::EndElement)));
    assert_eq!(doc.create_node(NodeKind::Attribute, "a", Some("b")),
               Err(Error::InvalidNodeKind(NodeKind::Attribute)));
    assert_eq!(doc.create_node(NodeKind::Text, "", None),
               Err(Error::InvalidArgument("value")));
    assert_eq!(doc.create_node(NodeKind::Element, "", None),
               Err(Error::InvalidArgument("name")));
    assert_eq!(doc.create_node(NodeKind::Comment, "", None).unwrap_err().kind(),
               ErrorKind::InvalidArgument);
}

#[test]
fn parent_capability() {
    let mut doc = Document::new();
    let text = doc.create_node(NodeKind::Text, "", Some("t")).unwrap();
    let comment = doc.create_node(NodeKind::Comment, "", Some("c")).unwrap();
    let elem = doc.create_node(NodeKind::Element, "e", None).unwrap();

    assert!(!doc.append_child(text, elem));
    assert!(!doc.append_child(comment, elem));
    assert!(!doc.node(text).has_children());
    assert!(doc.node(elem).parent().is_none());

    assert!(doc.append_child(elem, text));
    assert!(doc.contains_child(elem, text));
}

#[test]
fn append_child_reparents() {
    let mut doc = Document::new();
    let a = doc.create_node(NodeKind::Element, "a", None).unwrap();
    let b = doc.create_node(NodeKind::Element, "b", None).unwrap();
    let c = doc.create_node(NodeKind::Element, "c", None).unwrap();
    doc.set_root(a);

    assert!(doc.append_child(a, b));
    assert!(doc.append_child(a, c));
    assert!(doc.append_child(a, b));
    assert_eq!(doc.node(a).to_xml_string(), "<a><b/><c/></a>");

    assert!(doc.append_child(b, c));
    assert!(!doc.contains_child(a, c));
    assert_eq!(doc.node(c).parent().unwrap().name(), "b");
    assert_eq!(doc.node(a).to_xml_string(), "<a><b><c/></b></a>");
}

#[test]
fn append_child_cycles() {
    let mut doc = Document::new();
    let a = doc.create_node(NodeKind::Element, "a", None).unwrap();
    let b = doc.create_node(NodeKind::Element, "b", None).unwrap();
    let c = doc.create_node(NodeKind::Element, "c", None).unwrap();
    doc.set_root(a);
    doc.append_child(a, b);
    doc.append_child(b, c);

    assert!(!doc.append_child(c, c));
    assert!(!doc.append_child(c, a));
    assert!(!doc.append_child(c, b));
    assert_eq!(doc.node(a).to_xml_string(), "<a><b><c/></b></a>");
}

#[test]
fn append_children_rollback() {
    let mut doc = Document::new();
    let a = doc.create_node(NodeKind::Element, "a", None).unwrap();
    let b = doc.create_node(NodeKind::Element, "b", None).unwrap();
    let c = doc.create_node(NodeKind::Element, "c", None).unwrap();
    doc.set_root(a);

    assert!(!doc.append_children(b, &[c, a]));
    assert!(!doc.node(b).has_children());
    assert!(doc.node(c).parent().is_none());

    assert!(doc.append_children(a, &[b, c]));
    assert_eq!(doc.node(a).to_xml_string(), "<a><b/><c/></a>");
}

#[test]
fn remove_and_clear() {
    let mut doc = Document::parse("<a><b/><c/><d/></a>").unwrap();
    let a = doc.root_id().unwrap();
    let b = doc.node(a).get("b").unwrap().id();
    let c = doc.node(a).get("c").unwrap().id();

    assert!(doc.remove_child(a, b));
    assert!(!doc.remove_child(a, b));
    assert!(!doc.remove_child(b, c));
    assert_eq!(doc.node(a).to_xml_string(), "<a><c/><d/></a>");

    doc.clear_children(a);
    assert!(doc.node(c).parent().is_none());
    assert_eq!(doc.node(a).to_xml_string(), "<a></a>");
}

#[test]
fn deep_clone_01() {
    let mut doc = Document::parse("<a><b x='1'>text</b></a>").unwrap();
    let a = doc.root_id().unwrap();
    let b = doc.node(a).first_child().unwrap().id();

    let copy = doc.deep_clone(b);
    assert!(doc.node(copy).parent().is_none());
    doc.set_attribute(copy, "x", "2");
    assert!(doc.append_child(a, copy));

    assert_eq!(doc.node(a).to_xml_string(), "<a><b x=\"1\">text</b><b x=\"2\">text</b></a>");
}

#[test]
fn attributes_and_values() {
    let mut doc = Document::parse("<a x='1' y='2'/>").unwrap();
    let a = doc.root_id().unwrap();

    assert_eq!(doc.set_attribute(a, "x", "3"), Some("1".to_string()));
    assert_eq!(doc.set_attribute(a, "z", "4"), None);
    assert_eq!(doc.remove_attribute(a, "y"), Some("2".to_string()));
    assert_eq!(doc.remove_attribute(a, "y"), None);
    assert_eq!(doc.node(a).to_xml_string(), "<a x=\"3\" z=\"4\"/>");

    doc.set_value(a, Some("")).unwrap();
    assert_eq!(doc.node(a).to_xml_string(), "<a x=\"3\" z=\"4\"></a>");

    let text = doc.create_node(NodeKind::Text, "", Some("t")).unwrap();
    assert_eq!(doc.set_value(text, None), Err(Error::InvalidArgument("value")));
}

#[test]
fn search_01() {
    let data = "\
<root>
    <Item>1</Item>
    <group>
        <item>2</item>
        <deep><item>3</item></deep>
    </group>
</root>
";

    let doc = Document::parse(data).unwrap();
    let root = doc.root().unwrap();

    assert_eq!(root.get("ITEM").unwrap().first_child().unwrap().value(), Some("1"));
    assert_eq!(root.get("deep"), None);
    assert_eq!(root.search(" Deep ", 1).unwrap().name(), "deep");
    assert_eq!(root.search("missing", 10), None);

    let group = root.get("group").unwrap();
    let item = group.search("item", 5).unwrap();
    assert_eq!(item.first_child().unwrap().value(), Some("2"));
}

#[test]
fn descendants_01() {
    let doc = Document::parse("<a><b><c/></b><d/></a>").unwrap();
    let names: Vec<&str> = doc.descendants().map(|n| n.name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);

    let b = doc.root().unwrap().first_child().unwrap();
    let names: Vec<&str> = b.descendants().map(|n| n.name()).collect();
    assert_eq!(names, vec!["b", "c"]);

    let names: Vec<&str> = b.first_child().unwrap().ancestors().map(|n| n.name()).collect();
    assert_eq!(names, vec!["b", "a"]);

    assert_eq!(Document::new().descendants().count(), 0);
}

#[test]
fn siblings_01() {
    let doc = Document::parse("<a><b/><c/><d/></a>").unwrap();
    let c = doc.root().unwrap().get("c").unwrap();
    assert_eq!(c.prev_sibling().unwrap().name(), "b");
    assert_eq!(c.next_sibling().unwrap().name(), "d");
    assert_eq!(doc.root().unwrap().last_child().unwrap().next_sibling(), None);

    let names: Vec<&str> = doc.root().unwrap().children().rev().map(|n| n.name()).collect();
    assert_eq!(names, vec!["d", "c", "b"]);
}

#[test]
fn lookup_prefix_01() {
    let data = "<e xmlns:n1='http://www.w3.org' xmlns='http://www.w4.org'><c/></e>";

    let doc = Document::parse(data).unwrap();
    let node = doc.root().unwrap().first_child().unwrap();
    assert_eq!(node.lookup_prefix("http://www.w3.org"), Some("n1"));
    assert_eq!(node.lookup_prefix("http://www.w4.org"), Some(""));
    assert_eq!(node.lookup_prefix("http://www.w5.org"), None);
    assert_eq!(node.lookup_prefix(NS_XML_URI), Some("xml"));
}

#[test]
fn lookup_namespace_uri_01() {
    let data = "<e xmlns:n1='http://www.w3.org' xmlns='http://www.w4.org'/>";

    let doc = Document::parse(data).unwrap();
    let node = doc.root().unwrap();
    assert_eq!(node.lookup_namespace_uri("n1"), Some("http://www.w3.org"));
    assert_eq!(node.lookup_namespace_uri(""), Some("http://www.w4.org"));
    assert_eq!(node.lookup_namespace_uri("n2"), None);
    assert_eq!(node.lookup_namespace_uri("xml"), Some(NS_XML_URI));
}

#[test]
fn prolog_nodes_get_document_root() {
    let doc = Document::parse("<?xml version='1.0'?><!--c--><a/>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Document);
    assert_eq!(root.to_xml_string(), "<?xml version=\"1.0\"?><!--c--><a/>");

    let doc = Document::parse("<!DOCTYPE a><a/>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Document);
    assert_eq!(root.first_child().unwrap().kind(), NodeKind::DocumentType);
    assert_eq!(root.to_xml_string(), "<!DOCTYPE a><a/>");
}

#[test]
fn leading_comment_becomes_root() {
    let doc = Document::parse("<!--c--><a/>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Comment);
    assert!(!root.has_children());
    assert_eq!(root.to_xml_string(), "<!--c-->");

    let doc = Document::parse("<?pi?><a/>").unwrap();
    assert_eq!(doc.root().unwrap().kind(), NodeKind::ProcessingInstruction);
}

#[test]
fn decode_text() {
    let doc = Document::parse("<a>&#x41E;&amp;</a>").unwrap();
    let text = doc.root().unwrap().first_child().unwrap().value().unwrap();
    assert_eq!(text, "&#x41E;&amp;");
    assert_eq!(text::decode_references(text), "\u{41E}&");
}
