use crate::{Attributes, Node, NodeKind};

pub(crate) fn node_to_string(node: Node, indent: Option<usize>) -> String {
    let mut out = String::new();
    write_node(node, indent, &mut out);
    out
}

fn write_node(node: Node, indent: Option<usize>, out: &mut String) {
    match node.kind() {
        NodeKind::Document => {
            for child in node.children() {
                write_node(child, indent, out);
            }

            return;
        }
        NodeKind::DocumentFragment => {
            push_text(node.value().unwrap_or(""), out);
            for child in node.children() {
                write_node(child, indent, out);
            }

            return;
        }
        _ => {}
    }

    if let Some(tabs) = indent {
        push_tabs(tabs, out);
    }

    let value = node.value().unwrap_or("");
    match node.kind() {
        NodeKind::CData => {
            out.push_str("<![CDATA[");
            out.push_str(value);
            out.push_str("]]>");
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        NodeKind::DocumentType => {
            out.push_str("<!");
            out.push_str(if node.name().is_empty() { "DOCTYPE" } else { node.name() });
            out.push(' ');
            out.push_str(value);
            out.push('>');
        }
        NodeKind::Element => {
            write_element(node, indent, out);
        }
        NodeKind::Entity => {
            out.push_str("<!ENTITY ");
            out.push_str(value);
            out.push('>');
        }
        NodeKind::EntityReference => {
            out.push('&');
            out.push_str(node.name());
            out.push(';');
        }
        NodeKind::ProcessingInstruction | NodeKind::XmlDeclaration => {
            out.push_str("<?");
            out.push_str(node.name());
            write_attributes(node.attributes(), out);
            if !value.is_empty() && !node.has_attributes() {
                out.push(' ');
            }
            out.push_str(value);
            out.push_str("?>");
        }
        NodeKind::Notation => {
            out.push_str("<!NOTATION ");
            out.push_str(value);
            out.push('>');
        }
        NodeKind::Text | NodeKind::Whitespace | NodeKind::SignificantWhitespace => {
            push_text(value, out);
        }
        _ => {}
    }

    if indent.is_some() {
        out.push('\n');
    }
}

fn write_element(node: Node, indent: Option<usize>, out: &mut String) {
    out.push('<');
    out.push_str(node.name());
    write_attributes(node.attributes(), out);

    if node.has_children() {
        out.push('>');
        match indent {
            Some(tabs) if node.children().any(|c| !c.is_text()) => {
                out.push('\n');
                for child in node.children() {
                    write_node(child, Some(tabs + 1), out);
                }
                push_tabs(tabs, out);
            }
            _ => {
                for child in node.children() {
                    write_node(child, None, out);
                }
            }
        }
    } else if let Some(value) = node.value() {
        out.push('>');
        push_text(value, out);
    } else {
        out.push_str("/>");
        return;
    }

    out.push_str("</");
    out.push_str(node.name());
    out.push('>');
}

fn write_attributes(attributes: &Attributes, out: &mut String) {
    for attr in attributes {
        out.push(' ');
        out.push_str(attr.name());
        out.push('=');

        let quote = attribute_quote(attr.value());
        out.push(quote);
        push_attribute_value(attr.value(), quote, out);
        out.push(quote);
    }
}

/// Returns the quote that needs no escaping for `value`, if possible.
pub(crate) fn attribute_quote(value: &str) -> char {
    if value.contains('"') && !value.contains('\'') { '\'' } else { '"' }
}

// The reader rejects `<` and the closing quote inside a value.
pub(crate) fn push_attribute_value(value: &str, quote: char, out: &mut String) {
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

// A literal `<` would start markup on the next read.
fn push_text(text: &str, out: &mut String) {
    push_escaped(text, '<', "&lt;", out);
}

fn push_escaped(text: &str, c: char, escaped: &str, out: &mut String) {
    if !text.contains(c) {
        out.push_str(text);
        return;
    }

    for ch in text.chars() {
        if ch == c {
            out.push_str(escaped);
        } else {
            out.push(ch);
        }
    }
}

fn push_tabs(count: usize, out: &mut String) {
    for _ in 0..count {
        out.push('\t');
    }
}
