//! Text escaping and reference decoding.
//!
//! The [`Reader`] reports text and attribute values exactly as written.
//! [`decode_references`] is an optional post-processing step.
//!
//! [`Reader`]: ../struct.Reader.html
//! [`decode_references`]: fn.decode_references.html

use std::borrow::Cow;

use xmlparser::{Reference, Stream};


/// Decodes character references and predefined entity references.
///
/// Unknown entities and malformed references are kept as is.
///
/// # Examples
///
/// ```
/// use pullxml::text::decode_references;
///
/// assert_eq!(decode_references("&#x41E;&lt;&unknown;"), "О<&unknown;");
/// assert_eq!(decode_references("a & b"), "a & b");
/// ```
pub fn decode_references(text: &str) -> Cow<str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut s = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        s.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let mut stream = Stream::from(rest);
        let decoded = match stream.try_consume_reference() {
            Some(Reference::Char(c)) => Some(c),
            Some(Reference::Entity(name)) => predefined_entity(name),
            None => None,
        };

        match decoded {
            Some(c) => {
                s.push(c);
                rest = &rest[stream.pos()..];
            }
            None => {
                s.push('&');
                rest = &rest[1..];
            }
        }
    }

    s.push_str(rest);
    Cow::Owned(s)
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Escapes `&`, `<` and `>` in a text content.
pub fn escape_text(text: &str) -> Cow<str> {
    escape(text, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escapes `&`, `<`, `"`, TAB, LF and CR in a double-quoted attribute value.
pub fn escape_attribute(text: &str) -> Cow<str> {
    escape(text, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

fn escape<F>(text: &str, f: F) -> Cow<str>
    where F: Fn(char) -> Option<&'static str>
{
    if !text.chars().any(|c| f(c).is_some()) {
        return Cow::Borrowed(text);
    }

    let mut s = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match f(c) {
            Some(escaped) => s.push_str(escaped),
            None => s.push(c),
        }
    }

    Cow::Owned(s)
}
