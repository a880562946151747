use xmlparser::XmlCharExt;

use crate::{Attribute, Attributes, Error, NodeKind, Source, StrSource};

type Result<T> = std::result::Result<T, Error>;


/// Reader options.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ReaderOptions {
    /// Validates element names against the XML `Name` production.
    ///
    /// An invalid name is reported as an [`Error::UnexpectedToken`].
    ///
    /// Default: true
    ///
    /// [`Error::UnexpectedToken`]: enum.Error.html#variant.UnexpectedToken
    pub check: bool,

    /// Skips comments.
    ///
    /// Default: false
    pub ignore_comments: bool,

    /// Skips processing instructions. The XML declaration is always reported.
    ///
    /// Default: false
    pub ignore_meta: bool,

    /// Skips whitespace-only text between markup.
    ///
    /// When disabled, such runs are reported as `Whitespace` nodes.
    ///
    /// Default: true
    pub ignore_whitespace: bool,

    /// Replaces CR LF, CR, LF and TAB inside attribute values with a single space.
    ///
    /// Default: true
    pub normalize: bool,

    /// The offset reading starts at.
    ///
    /// Default: 0
    pub start_offset: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            check: true,
            ignore_comments: false,
            ignore_meta: false,
            ignore_whitespace: true,
            normalize: true,
            start_offset: 0,
        }
    }
}


/// A pull XML reader.
///
/// Each [`read`] call advances to the next node and updates the current
/// node kind, name, value, attributes and depth.
///
/// The reader does not decode character or entity references:
/// text and attribute values are reported as written.
/// See [`text::decode_references`] for an optional decoding step.
///
/// # Examples
///
/// ```
/// use pullxml::{NodeKind, Reader};
///
/// let mut reader = Reader::from("<a x='1'><b/>text</a>");
/// let mut events = Vec::new();
/// while reader.read().unwrap() {
///     events.push((reader.node_kind(), reader.name().to_string(), reader.depth()));
/// }
///
/// assert_eq!(events, vec![
///     (NodeKind::Element, "a".to_string(), 0),
///     (NodeKind::Element, "b".to_string(), 1),
///     (NodeKind::Text, "".to_string(), 1),
///     (NodeKind::EndElement, "a".to_string(), 0),
/// ]);
/// ```
///
/// [`read`]: #method.read
/// [`text::decode_references`]: text/fn.decode_references.html
pub struct Reader<S> {
    source: S,
    opt: ReaderOptions,
    depth: usize,
    /// An open element start was reported, so the next node is one level deeper.
    enter_next: bool,
    /// An element was seen, so the document prolog is over.
    in_content: bool,
    kind: NodeKind,
    name: String,
    value: Option<String>,
    empty_element: bool,
    attributes: Attributes,
    attribute_index: Option<usize>,
    namespaces: Attributes,
}

impl<'a> From<&'a str> for Reader<StrSource<'a>> {
    fn from(text: &'a str) -> Self {
        Reader::new(StrSource::new(text))
    }
}

impl<S: Source> Reader<S> {
    /// Creates a reader with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    /// Creates a reader with the specified options.
    pub fn with_options(mut source: S, opt: ReaderOptions) -> Self {
        if opt.start_offset != 0 {
            source.seek(opt.start_offset);
        }

        Reader {
            source,
            opt,
            depth: 0,
            enter_next: false,
            in_content: false,
            kind: NodeKind::None,
            name: String::new(),
            value: None,
            empty_element: false,
            attributes: Attributes::new(),
            attribute_index: None,
            namespaces: Attributes::new(),
        }
    }

    /// Returns reader's options.
    pub fn options(&self) -> &ReaderOptions {
        &self.opt
    }

    /// Advances to the next node.
    ///
    /// Returns `Ok(false)` at the end of the input or when the remaining
    /// input does not start with any known construct.
    pub fn read(&mut self) -> Result<bool> {
        if self.enter_next {
            self.depth += 1;
            self.enter_next = false;
        }

        self.clear();

        let document_level = !self.in_content;
        if !self.parse_content(document_level)? {
            return Ok(false);
        }

        match self.kind {
            NodeKind::EndElement => {
                // Checked by `parse_end_element`.
                self.depth -= 1;
            }
            NodeKind::Element => {
                self.in_content = true;
                self.enter_next = !self.empty_element;
            }
            _ => {}
        }

        Ok(true)
    }

    /// Returns the kind of the current node.
    ///
    /// Returns `Attribute` while positioned on an attribute.
    pub fn node_kind(&self) -> NodeKind {
        if self.attribute_index.is_some() {
            NodeKind::Attribute
        } else {
            self.kind
        }
    }

    /// Returns the qualified name of the current node.
    pub fn name(&self) -> &str {
        match self.current_attribute() {
            Some(attr) => attr.name(),
            None => &self.name,
        }
    }

    /// Returns the local part of the current node name.
    pub fn local_name(&self) -> &str {
        split_qname(self.name()).1
    }

    /// Returns the prefix of the current node name or an empty string.
    pub fn prefix(&self) -> &str {
        split_qname(self.name()).0
    }

    /// Returns the namespace URI bound to the current node prefix.
    ///
    /// Returns an empty string for unprefixed or unbound names.
    pub fn namespace_uri(&self) -> &str {
        let prefix = self.prefix();
        if prefix.is_empty() {
            return "";
        }

        self.lookup_namespace(prefix).unwrap_or("")
    }

    /// Returns the value of the current node or an empty string.
    pub fn value(&self) -> &str {
        self.value_opt().unwrap_or("")
    }

    pub(crate) fn value_opt(&self) -> Option<&str> {
        match self.current_attribute() {
            Some(attr) => Some(attr.value()),
            None => self.value.as_ref().map(String::as_str),
        }
    }

    /// Checks that the current node has a value.
    ///
    /// Self-closed elements have no value.
    pub fn has_value(&self) -> bool {
        self.value_opt().is_some()
    }

    /// Returns the depth of the current node. Root-level nodes have depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Checks that the current node is a self-closed element, like `<e/>`.
    pub fn is_empty_element(&self) -> bool {
        self.node_kind() == NodeKind::Element && self.empty_element
    }

    /// Returns the attributes of the current node in encounter order.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Checks that the current node has attributes.
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Returns the value of the attribute with the specified qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Returns the value of the attribute with the specified local name
    /// whose prefix is bound to `uri`.
    pub fn attribute_ns(&self, local_name: &str, uri: &str) -> Option<&str> {
        self.namespaces.iter()
            .filter(|ns| !ns.name().is_empty() && ns.value().eq_ignore_ascii_case(uri))
            .filter_map(|ns| self.attributes.get(&format!("{}:{}", ns.name(), local_name)))
            .next()
    }

    /// Returns the URI bound to `prefix` by the `xmlns` attributes read so far.
    ///
    /// An empty prefix returns the default namespace.
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(crate::NS_XML_URI);
        }

        self.namespaces.get(prefix)
    }

    /// Moves to the first attribute of the current node.
    ///
    /// Returns `false` when the node has no attributes.
    pub fn move_to_first_attribute(&mut self) -> bool {
        if self.attributes.is_empty() {
            return false;
        }

        self.attribute_index = Some(0);
        true
    }

    /// Moves to the next attribute of the current node.
    ///
    /// When positioned on the node itself, moves to the first attribute.
    pub fn move_to_next_attribute(&mut self) -> bool {
        let next = match self.attribute_index {
            Some(idx) => idx + 1,
            None => 0,
        };

        if next < self.attributes.len() {
            self.attribute_index = Some(next);
            true
        } else {
            false
        }
    }

    /// Moves back from an attribute to the node that owns it.
    pub fn move_to_element(&mut self) -> bool {
        self.attribute_index.take().is_some()
    }

    /// Checks that the reader reached the end of the input.
    pub fn eof(&self) -> bool {
        self.kind == NodeKind::None && self.source.position() > 0
    }

    /// Returns the current source offset.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns the underlying source.
    pub fn into_source(self) -> S {
        self.source
    }

    fn current_attribute(&self) -> Option<&Attribute> {
        self.attribute_index.and_then(|idx| self.attributes.get_index(idx))
    }

    fn clear(&mut self) {
        self.kind = NodeKind::None;
        self.name.clear();
        self.value = None;
        self.empty_element = false;
        self.attributes.clear();
        self.attribute_index = None;
    }

    fn set_node(&mut self, kind: NodeKind, name: String, value: Option<String>) {
        self.kind = kind;
        self.name = name;
        self.value = value;
    }

    // Dispatches to the first production matching at the cursor.
    //
    // document ::= (PI | Comment | CDATA | doctype | S)* element ...
    // content  ::= (PI | Comment | CDATA | ETag | element | Text)*
    fn parse_content(&mut self, document_level: bool) -> Result<bool> {
        loop {
            let start = self.source.position();
            let c = match self.source.peek_char() {
                Some(c) => c,
                None => return Ok(false),
            };

            if c == '<' {
                if self.parse_meta()? {
                    if self.kind == NodeKind::ProcessingInstruction && self.opt.ignore_meta {
                        self.clear();
                        continue;
                    }

                    return Ok(true);
                }

                if self.parse_comment() {
                    if self.opt.ignore_comments {
                        self.clear();
                        continue;
                    }

                    return Ok(true);
                }

                if self.parse_cdata() {
                    return Ok(true);
                }

                if document_level {
                    if self.parse_doctype() {
                        return Ok(true);
                    }

                    if self.try_lead_in("</") {
                        let pos = self.source.text_pos(start);
                        return Err(Error::UnexpectedToken("</".to_string(), pos));
                    }
                } else if self.parse_end_element()? {
                    return Ok(true);
                }

                if self.parse_element()? {
                    return Ok(true);
                }

                log::trace!("no markup production matches at offset {}", start);
                self.source.seek(start);
                return Ok(false);
            }

            if c == '&' {
                log::trace!("text starts with a reference at offset {}", start);
            }

            if self.parse_text() {
                return Ok(true);
            }

            // A whitespace-only run up to the next markup.
            if self.parse_whitespace() && !self.opt.ignore_whitespace {
                return Ok(true);
            }

            self.clear();
        }
    }

    // Consumes `lead` or restores the cursor.
    fn try_lead_in(&mut self, lead: &str) -> bool {
        let start = self.source.position();
        if self.source.advance(lead.chars().count()) == lead {
            true
        } else {
            self.source.seek(start);
            false
        }
    }

    // Reads until `terminator`, which is consumed but not returned.
    //
    // Returns `None` at the end of input without moving the cursor back:
    // callers restore their own start position.
    fn consume_until(&mut self, terminator: &str) -> Option<String> {
        let mut chars = terminator.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        let rest_len = rest.chars().count();

        let mut s = String::new();
        loop {
            let c = self.source.next_char()?;
            if c == first {
                let p = self.source.position();
                if self.source.advance(rest_len) == rest {
                    return Some(s);
                }

                self.source.seek(p);
            }

            s.push(c);
        }
    }

    // '<!--' ... '-->'
    fn parse_comment(&mut self) -> bool {
        let start = self.source.position();
        if !self.try_lead_in("<!--") {
            return false;
        }

        match self.consume_until("-->") {
            Some(text) => {
                self.set_node(NodeKind::Comment, String::new(), Some(text));
                true
            }
            None => {
                self.source.seek(start);
                false
            }
        }
    }

    // '<![CDATA[' ... ']]>'
    fn parse_cdata(&mut self) -> bool {
        let start = self.source.position();
        if !self.try_lead_in("<![CDATA[") {
            return false;
        }

        match self.consume_until("]]>") {
            Some(text) => {
                self.set_node(NodeKind::CData, String::new(), Some(text));
                true
            }
            None => {
                self.source.seek(start);
                false
            }
        }
    }

    // '<!DOCTYPE' S ... '>'
    //
    // The internal subset and quoted literals may contain '>'.
    fn parse_doctype(&mut self) -> bool {
        let start = self.source.position();
        if !self.try_lead_in("<!DOCTYPE") {
            return false;
        }

        match self.source.next_char() {
            Some(c) if is_xml_space(c) => {}
            _ => {
                self.source.seek(start);
                return false;
            }
        }

        let mut s = String::new();
        let mut subset_depth = 0usize;
        let mut quote = None;
        loop {
            let c = match self.source.next_char() {
                Some(c) => c,
                None => {
                    self.source.seek(start);
                    return false;
                }
            };

            match (c, quote) {
                (_, Some(q)) if c == q => quote = None,
                (_, Some(_)) => {}
                ('"', None) | ('\'', None) => quote = Some(c),
                ('[', None) => subset_depth += 1,
                (']', None) => subset_depth = subset_depth.saturating_sub(1),
                ('>', None) if subset_depth == 0 => break,
                _ => {}
            }

            s.push(c);
        }

        self.set_node(NodeKind::DocumentType, "DOCTYPE".to_string(), Some(s));
        true
    }

    // '<?' PITarget (S (Attribute S?)* Char*)? '?>'
    fn parse_meta(&mut self) -> Result<bool> {
        let start = self.source.position();
        if !self.try_lead_in("<?") {
            return Ok(false);
        }

        let mut name = String::new();
        loop {
            match self.source.peek_char() {
                Some(c) if c == '?' || is_xml_space(c) => break,
                Some(c) => {
                    name.push(c);
                    self.source.next_char();
                }
                None => break,
            }
        }

        if name.is_empty() {
            self.source.seek(start);
            return Ok(false);
        }

        let kind = if name.len() >= 3 && name.is_char_boundary(3)
            && name[..3].eq_ignore_ascii_case("xml")
        {
            NodeKind::XmlDeclaration
        } else {
            NodeKind::ProcessingInstruction
        };

        let mut attributes = Attributes::new();
        if self.source.peek_char().map(is_xml_space) == Some(true) {
            let separator = self.source.position();
            attributes = self.parse_attributes(false)?;
            if attributes.is_empty() {
                self.source.seek(separator);
                self.source.next_char();
            }
        }

        match self.consume_until("?>") {
            Some(value) => {
                self.set_node(kind, name, Some(value));
                self.attributes = attributes;
                Ok(true)
            }
            None => {
                self.source.seek(start);
                Ok(false)
            }
        }
    }

    // '</' Name S? '>'
    fn parse_end_element(&mut self) -> Result<bool> {
        let start = self.source.position();
        if !self.try_lead_in("</") {
            return Ok(false);
        }

        let mut name = String::new();
        loop {
            match self.source.next_char() {
                Some('>') => break,
                Some('<') | None => {
                    self.source.seek(start);
                    return Ok(false);
                }
                Some(c) => name.push(c),
            }
        }

        let name = name.trim_end();
        if name.is_empty() {
            self.source.seek(start);
            return Ok(false);
        }

        if self.depth == 0 {
            let pos = self.source.text_pos(start);
            return Err(Error::UnexpectedToken(format!("</{}>", name), pos));
        }

        self.set_node(NodeKind::EndElement, name.to_string(), None);
        Ok(true)
    }

    // '<' Name (S Attribute)* S? ('>' | '/>')
    fn parse_element(&mut self) -> Result<bool> {
        let start = self.source.position();
        if self.source.next_char() != Some('<') {
            self.source.seek(start);
            return Ok(false);
        }

        let mut name = String::new();
        loop {
            match self.source.peek_char() {
                Some(c) if c == '/' || c == '>' || is_xml_space(c) => break,
                Some('<') | Some('"') | Some('\'') | Some('=') | None => {
                    self.source.seek(start);
                    return Ok(false);
                }
                Some(c) => {
                    name.push(c);
                    self.source.next_char();
                }
            }
        }

        if name.is_empty() {
            self.source.seek(start);
            return Ok(false);
        }

        let attributes = self.parse_attributes(true)?;
        self.skip_spaces();

        let empty = match self.source.next_char() {
            Some('>') => false,
            Some('/') if self.source.next_char() == Some('>') => true,
            _ => {
                self.source.seek(start);
                return Ok(false);
            }
        };

        if self.opt.check && !is_xml_name(&name) {
            let pos = self.source.text_pos(start + 1);
            return Err(Error::UnexpectedToken(name, pos));
        }

        for attr in &attributes {
            if attr.name() == "xmlns" {
                self.namespaces.insert("", attr.value());
            } else if let Some(prefix) = attr.name().strip_prefix("xmlns:") {
                self.namespaces.insert(prefix, attr.value());
            }
        }

        self.set_node(NodeKind::Element, name, if empty { None } else { Some(String::new()) });
        self.empty_element = empty;
        self.attributes = attributes;
        Ok(true)
    }

    // (S Attribute)*
    //
    // Stops before the first position that does not start an attribute.
    fn parse_attributes(&mut self, strict: bool) -> Result<Attributes> {
        let mut attributes = Attributes::new();
        loop {
            let start = self.source.position();
            match self.parse_attribute(strict)? {
                Some((name, value)) => {
                    if !attributes.insert_if_absent(&name, &value) {
                        log::trace!("duplicated attribute '{}' is ignored", name);
                    }
                }
                None => {
                    self.source.seek(start);
                    break;
                }
            }
        }

        Ok(attributes)
    }

    // S? Name S? '=' S? ('"' [^"]* '"' | "'" [^']* "'")
    //
    // A closing quote must be followed by a terminator: space, '?', '/' or '>'.
    fn parse_attribute(&mut self, strict: bool) -> Result<Option<(String, String)>> {
        self.skip_spaces();

        let mut name = String::new();
        loop {
            match self.source.peek_char() {
                Some(c) if c == '=' || is_xml_space(c) => break,
                Some('/') | Some('>') | Some('?') | Some('<') | Some('"') | Some('\'') | None => {
                    break;
                }
                Some(c) => {
                    name.push(c);
                    self.source.next_char();
                }
            }
        }

        if name.is_empty() {
            return Ok(None);
        }

        self.skip_spaces();
        if self.source.next_char() != Some('=') {
            return Ok(None);
        }

        self.skip_spaces();
        let quote = match self.source.next_char() {
            Some(c) if c == '"' || c == '\'' => c,
            _ => return Ok(None),
        };

        let mut value = String::new();
        loop {
            let pos = self.source.position();
            let c = match self.source.next_char() {
                Some(c) => c,
                None => return Ok(None),
            };

            match c {
                _ if c == quote => break,
                '<' => {
                    if strict {
                        let text_pos = self.source.text_pos(pos);
                        return Err(Error::UnexpectedToken("<".to_string(), text_pos));
                    }

                    return Ok(None);
                }
                '&' => {
                    log::trace!("a reference inside the '{}' attribute value is kept as is", name);
                    value.push(c);
                }
                '\r' if self.opt.normalize => {
                    if self.source.peek_char() == Some('\n') {
                        self.source.next_char();
                    }

                    value.push(' ');
                }
                '\n' | '\t' if self.opt.normalize => value.push(' '),
                _ => value.push(c),
            }
        }

        match self.source.peek_char() {
            Some(c) if c == '?' || c == '/' || c == '>' || is_xml_space(c) => {
                Ok(Some((name, value)))
            }
            _ => Ok(None),
        }
    }

    // Text up to the next '<'. A whitespace-only run is not a text node.
    fn parse_text(&mut self) -> bool {
        let start = self.source.position();
        let mut s = String::new();
        while let Some(c) = self.source.peek_char() {
            if c == '<' {
                break;
            }

            s.push(c);
            self.source.next_char();
        }

        if s.chars().all(is_xml_space) {
            self.source.seek(start);
            return false;
        }

        self.set_node(NodeKind::Text, String::new(), Some(s));
        true
    }

    // Consumes a whitespace run and stores it as a `Whitespace` node.
    fn parse_whitespace(&mut self) -> bool {
        let mut s = String::new();
        while let Some(c) = self.source.peek_char() {
            if !is_xml_space(c) {
                break;
            }

            s.push(c);
            self.source.next_char();
        }

        if s.is_empty() {
            return false;
        }

        self.set_node(NodeKind::Whitespace, String::new(), Some(s));
        true
    }

    fn skip_spaces(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if !is_xml_space(c) {
                break;
            }

            self.source.next_char();
        }
    }
}


/// Checks that `c` is an XML whitespace: `[ \r\n\t]`.
pub(crate) fn is_xml_space(c: char) -> bool {
    match c {
        ' ' | '\t' | '\n' | '\r' => true,
        _ => false,
    }
}

/// Checks that `name` matches the XML `Name` production.
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_xml_name_start() => chars.all(|c| c.is_xml_name()),
        _ => false,
    }
}

/// Splits a qualified name into a prefix and a local part.
pub(crate) fn split_qname(name: &str) -> (&str, &str) {
    match name.find(':') {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => ("", name),
    }
}
