use crate::reader::{is_xml_name, is_xml_space};
use crate::serialize::{attribute_quote, push_attribute_value};
use crate::text::{escape_attribute, escape_text};
use crate::{Attributes, Error, Node, NodeKind};

type Result<'a, T> = std::result::Result<&'a mut T, Error>;


/// A text sink used by the [`Writer`].
///
/// [`Writer`]: struct.Writer.html
pub trait Sink {
    /// Appends a text fragment.
    fn emit(&mut self, text: &str);
}

impl Sink for String {
    fn emit(&mut self, text: &str) {
        self.push_str(text);
    }
}


/// A writer into an in-memory string.
pub type TextWriter = Writer<String>;


// Currently open non-element contexts.
#[derive(Clone, Copy, Default, Debug)]
struct OpenContexts {
    start_tag: bool,
    attribute: bool,
    comment: bool,
    cdata: bool,
    doctype: bool,
    meta: bool,
}

impl OpenContexts {
    fn is_markup(&self) -> bool {
        self.comment || self.cdata || self.doctype || self.meta
    }
}

struct Frame {
    name: String,
    has_children: bool,
    has_text: bool,
    declared: Vec<String>,
}

struct PendingAttribute {
    name: String,
    value: String,
    quote: char,
}


/// A checked XML writer.
///
/// Every call validates the call sequence and returns an error instead of
/// producing malformed output. Calls can be chained with `?`.
///
/// # Examples
///
/// ```
/// use pullxml::TextWriter;
///
/// # fn main() -> Result<(), pullxml::Error> {
/// let mut w = TextWriter::new(String::new());
/// w.start_element("Header")?
///  .write_attribute("id", "1")?
///  .write_element("DocDate", "28.07.2016")?
///  .end_element()?;
///
/// assert_eq!(w.into_string()?, "<Header id=\"1\"><DocDate>28.07.2016</DocDate></Header>");
/// # Ok(())
/// # }
/// ```
pub struct Writer<S> {
    sink: S,
    indent: String,
    stack: Vec<Frame>,
    open: OpenContexts,
    attribute: Option<PendingAttribute>,
    meta_has_attributes: bool,
    meta_has_text: bool,
    doctype_written: bool,
    written: bool,
    namespaces: Attributes,
}

impl<S: Sink> Writer<S> {
    /// Creates a writer that produces compact output.
    pub fn new(sink: S) -> Self {
        Self::with_indent(sink, "")
    }

    /// Creates a writer that puts markup on separate lines indented with `indent`.
    pub fn with_indent(sink: S, indent: &str) -> Self {
        Writer {
            sink,
            indent: indent.to_string(),
            stack: Vec::new(),
            open: OpenContexts::default(),
            attribute: None,
            meta_has_attributes: false,
            meta_has_text: false,
            doctype_written: false,
            written: false,
            namespaces: Attributes::new(),
        }
    }

    /// Returns the number of open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink without closing open elements.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Writes an XML declaration.
    pub fn start_document(&mut self, version: &str, encoding: &str) -> Result<Self> {
        self.start_document_standalone(version, encoding, None)
    }

    /// Writes an XML declaration with a `standalone` pseudo-attribute.
    ///
    /// An empty version is written as `1.0`. An empty encoding is omitted.
    pub fn start_document_standalone(
        &mut self,
        version: &str,
        encoding: &str,
        standalone: Option<bool>,
    ) -> Result<Self> {
        self.check_document_level()?;

        self.start_meta("xml")?;
        self.write_attribute("version", if version.is_empty() { "1.0" } else { version })?;
        if !encoding.is_empty() {
            self.write_attribute("encoding", encoding)?;
        }
        if let Some(standalone) = standalone {
            self.write_attribute("standalone", if standalone { "yes" } else { "no" })?;
        }
        self.end_meta()
    }

    /// Checks that the document is complete.
    pub fn end_document(&mut self) -> Result<Self> {
        self.check_document_level()?;
        Ok(self)
    }

    fn check_document_level(&self) -> std::result::Result<(), Error> {
        if !self.stack.is_empty() || self.open.attribute {
            return Err(Error::InvalidFormat("document boundary inside an element", self.depth()));
        }

        Ok(())
    }

    /// Starts an element.
    pub fn start_element(&mut self, name: &str) -> Result<Self> {
        if !is_xml_name(name) {
            return Err(Error::InvalidArgument("name"));
        }

        if self.open.is_markup() {
            return Err(Error::InvalidFormat("element inside markup", self.depth()));
        }

        self.close_start_tag()?;
        self.begin_child(true);

        self.sink.emit("<");
        self.sink.emit(name);
        self.stack.push(Frame {
            name: name.to_string(),
            has_children: false,
            has_text: false,
            declared: Vec::new(),
        });
        self.open.start_tag = true;
        Ok(self)
    }

    /// Starts an element with a namespace-qualified name.
    ///
    /// Declares the prefix unless an open element already does.
    pub fn start_element_ns(&mut self, prefix: &str, local_name: &str, uri: &str) -> Result<Self> {
        self.bind_namespace(prefix, uri)?;
        self.start_element(&qualified_name(prefix, local_name))?;
        if !self.is_declared(prefix) {
            self.write_namespace_declaration(prefix, uri)?;
        }

        Ok(self)
    }

    /// Closes the current element.
    ///
    /// An element without content is self-closed.
    pub fn end_element(&mut self) -> Result<Self> {
        if self.stack.is_empty() {
            return Err(Error::InvalidFormat("no open element", 0));
        }

        if self.open.is_markup() {
            return Err(Error::InvalidFormat("element end inside markup", self.depth()));
        }

        if self.open.attribute {
            self.end_attribute()?;
        }

        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => return Err(Error::InvalidFormat("no open element", 0)),
        };

        if self.open.start_tag {
            self.open.start_tag = false;
            self.sink.emit("/>");
        } else {
            if frame.has_children && !frame.has_text {
                self.write_indent(self.stack.len());
            }

            self.sink.emit("</");
            self.sink.emit(&frame.name);
            self.sink.emit(">");
        }

        Ok(self)
    }

    /// Starts an attribute of the open start tag or meta.
    pub fn start_attribute(&mut self, name: &str) -> Result<Self> {
        self.open_attribute(name, '"')?;
        Ok(self)
    }

    fn open_attribute(&mut self, name: &str, quote: char) -> std::result::Result<(), Error> {
        if !(self.open.start_tag || self.open.meta) || self.open.attribute {
            return Err(Error::InvalidFormat("attribute outside of a start tag", self.depth()));
        }

        if self.open.meta && self.meta_has_text {
            return Err(Error::InvalidFormat("attribute after meta content", self.depth()));
        }

        if !is_xml_name(name) {
            return Err(Error::InvalidArgument("name"));
        }

        self.sink.emit(" ");
        self.sink.emit(name);
        self.sink.emit(if quote == '\'' { "='" } else { "=\"" });
        self.open.attribute = true;
        self.attribute = Some(PendingAttribute {
            name: name.to_string(),
            value: String::new(),
            quote,
        });
        if self.open.meta {
            self.meta_has_attributes = true;
        }

        Ok(())
    }

    /// Starts an attribute with a namespace-qualified name.
    ///
    /// Declares the prefix unless an open element already does.
    pub fn start_attribute_ns(&mut self, prefix: &str, local_name: &str, uri: &str) -> Result<Self> {
        if prefix != "xmlns" && prefix != "xml" && !prefix.is_empty() {
            self.bind_namespace(prefix, uri)?;
            if self.open.start_tag && !self.open.attribute && !self.is_declared(prefix) {
                self.write_namespace_declaration(prefix, uri)?;
            }
        }

        self.start_attribute(&qualified_name(prefix, local_name))
    }

    /// Closes the current attribute.
    pub fn end_attribute(&mut self) -> Result<Self> {
        if !self.open.attribute {
            return Err(Error::InvalidFormat("no open attribute", self.depth()));
        }

        self.open.attribute = false;

        let attr = self.attribute.take();
        match attr {
            Some(ref attr) if attr.quote == '\'' => self.sink.emit("'"),
            _ => self.sink.emit("\""),
        }

        if let Some(attr) = attr {
            let prefix = if attr.name == "xmlns" {
                Some("")
            } else {
                attr.name.strip_prefix("xmlns:")
            };

            if let (Some(prefix), false) = (prefix, self.open.meta) {
                self.bind_namespace(prefix, &attr.value)?;
                if let Some(frame) = self.stack.last_mut() {
                    frame.declared.push(prefix.to_string());
                }
            }
        }

        Ok(self)
    }

    /// Writes an escaped text.
    ///
    /// Inside a comment, CDATA, DOCTYPE or meta the text is written as is.
    ///
    /// Whitespace-only text inside an element is written too, while the
    /// [`Reader`] skips it unless `ReaderOptions::ignore_whitespace` is off.
    /// Read such output with that option to get the same text back.
    ///
    /// # Errors
    ///
    /// `UnexpectedContent` for text outside of any element.
    ///
    /// [`Reader`]: struct.Reader.html
    pub fn write_string(&mut self, text: &str) -> Result<Self> {
        if self.open.attribute {
            if let Some(ref mut attr) = self.attribute {
                attr.value.push_str(text);
            }

            let escaped = escape_attribute(text);
            self.sink.emit(&escaped);
        } else if self.open.meta {
            self.write_meta_text(text);
        } else if self.open.is_markup() {
            self.sink.emit(text);
        } else if self.stack.is_empty() {
            return Err(Error::UnexpectedContent("text outside of the root element"));
        } else {
            self.close_start_tag()?;
            self.mark_text();
            let escaped = escape_text(text);
            self.sink.emit(&escaped);
        }

        Ok(self)
    }

    /// Writes a text as is.
    ///
    /// Closes an open start tag first, unless an attribute value is open.
    pub fn write_raw(&mut self, text: &str) -> Result<Self> {
        if self.open.attribute {
            if let Some(ref mut attr) = self.attribute {
                attr.value.push_str(text);
            }
        } else if self.open.meta {
            self.write_meta_text(text);
            return Ok(self);
        } else if !self.open.is_markup() {
            self.close_start_tag()?;
            self.mark_text();
        }

        self.sink.emit(text);
        self.written = true;
        Ok(self)
    }

    /// Starts a comment.
    pub fn start_comment(&mut self) -> Result<Self> {
        if self.open.comment {
            return Err(Error::InvalidFormat("comment is already open", self.depth()));
        }

        if self.open.is_markup() {
            return Err(Error::InvalidFormat("comment inside markup", self.depth()));
        }

        self.close_start_tag()?;
        self.begin_child(true);
        self.sink.emit("<!--");
        self.open.comment = true;
        Ok(self)
    }

    /// Closes the current comment.
    pub fn end_comment(&mut self) -> Result<Self> {
        if !self.open.comment {
            return Err(Error::InvalidFormat("no open comment", self.depth()));
        }

        self.sink.emit("-->");
        self.open.comment = false;
        Ok(self)
    }

    /// Starts a CDATA section.
    pub fn start_cdata(&mut self) -> Result<Self> {
        if self.open.cdata {
            return Err(Error::InvalidFormat("CDATA is already open", self.depth()));
        }

        if self.open.is_markup() {
            return Err(Error::InvalidFormat("CDATA inside markup", self.depth()));
        }

        self.close_start_tag()?;
        self.begin_child(false);
        self.sink.emit("<![CDATA[");
        self.open.cdata = true;
        Ok(self)
    }

    /// Closes the current CDATA section.
    pub fn end_cdata(&mut self) -> Result<Self> {
        if !self.open.cdata {
            return Err(Error::InvalidFormat("no open CDATA", self.depth()));
        }

        self.sink.emit("]]>");
        self.open.cdata = false;
        Ok(self)
    }

    /// Starts a DOCTYPE declaration.
    ///
    /// A system ID is required when a public ID is set.
    /// The internal subset is written inside brackets.
    pub fn start_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        subset: Option<&str>,
    ) -> Result<Self> {
        self.check_doctype()?;

        if !is_xml_name(name) {
            return Err(Error::InvalidArgument("name"));
        }

        if public_id.is_some() && system_id.is_none() {
            return Err(Error::InvalidArgument("system_id"));
        }

        self.begin_child(true);
        self.sink.emit("<!DOCTYPE ");
        self.sink.emit(name);
        if let Some(public_id) = public_id {
            self.sink.emit(" PUBLIC \"");
            self.sink.emit(public_id);
            self.sink.emit("\"");
        } else if system_id.is_some() {
            self.sink.emit(" SYSTEM");
        }
        if let Some(system_id) = system_id {
            self.sink.emit(" \"");
            self.sink.emit(system_id);
            self.sink.emit("\"");
        }
        if let Some(subset) = subset {
            self.sink.emit(" [");
            self.sink.emit(subset);
            self.sink.emit("]");
        }

        self.open.doctype = true;
        self.doctype_written = true;
        Ok(self)
    }

    /// Closes the DOCTYPE declaration.
    pub fn end_document_type(&mut self) -> Result<Self> {
        if !self.open.doctype {
            return Err(Error::InvalidFormat("no open DOCTYPE", self.depth()));
        }

        self.sink.emit(">");
        self.open.doctype = false;
        Ok(self)
    }

    fn check_doctype(&self) -> std::result::Result<(), Error> {
        if !self.stack.is_empty() {
            return Err(Error::InvalidFormat("DOCTYPE inside an element", self.depth()));
        }

        if self.open.is_markup() || self.open.attribute {
            return Err(Error::InvalidFormat("DOCTYPE inside markup", self.depth()));
        }

        if self.doctype_written {
            return Err(Error::InvalidFormat("DOCTYPE is already written", self.depth()));
        }

        Ok(())
    }

    /// Starts a processing instruction.
    ///
    /// Attributes can be written until the first text.
    pub fn start_meta(&mut self, name: &str) -> Result<Self> {
        if !self.stack.is_empty() {
            return Err(Error::InvalidFormat("meta inside an element", self.depth()));
        }

        if self.open.is_markup() {
            return Err(Error::InvalidFormat("meta inside markup", self.depth()));
        }

        if name.is_empty() || name.contains(|c: char| c == '?' || is_xml_space(c)) {
            return Err(Error::InvalidArgument("name"));
        }

        self.begin_child(true);
        self.sink.emit("<?");
        self.sink.emit(name);
        self.open.meta = true;
        self.meta_has_attributes = false;
        self.meta_has_text = false;
        Ok(self)
    }

    /// Closes the current processing instruction.
    pub fn end_meta(&mut self) -> Result<Self> {
        if !self.open.meta {
            return Err(Error::InvalidFormat("no open meta", self.depth()));
        }

        if self.open.attribute {
            self.end_attribute()?;
        }

        self.sink.emit("?>");
        self.open.meta = false;
        Ok(self)
    }

    /// Writes an element with a text content.
    ///
    /// An empty text produces `<name></name>`.
    pub fn write_element(&mut self, name: &str, text: &str) -> Result<Self> {
        self.start_element(name)?.write_string(text)?.end_element()
    }

    /// Writes a namespace-qualified element with a text content.
    pub fn write_element_ns(&mut self, prefix: &str, local_name: &str, uri: &str, text: &str)
        -> Result<Self>
    {
        self.start_element_ns(prefix, local_name, uri)?.write_string(text)?.end_element()
    }

    /// Writes an attribute.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<Self> {
        self.start_attribute(name)?.write_string(value)?.end_attribute()
    }

    /// Writes a namespace-qualified attribute.
    pub fn write_attribute_ns(&mut self, prefix: &str, local_name: &str, uri: &str, value: &str)
        -> Result<Self>
    {
        self.start_attribute_ns(prefix, local_name, uri)?.write_string(value)?.end_attribute()
    }

    /// Writes a comment.
    pub fn write_comment(&mut self, text: &str) -> Result<Self> {
        self.start_comment()?.write_string(text)?.end_comment()
    }

    /// Writes a CDATA section.
    pub fn write_cdata(&mut self, text: &str) -> Result<Self> {
        self.start_cdata()?.write_string(text)?.end_cdata()
    }

    /// Writes a processing instruction.
    pub fn write_meta(&mut self, name: &str, text: &str) -> Result<Self> {
        self.start_meta(name)?.write_string(text)?.end_meta()
    }

    /// Writes a DOCTYPE declaration.
    pub fn write_document_type(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        subset: Option<&str>,
    ) -> Result<Self> {
        self.start_document_type(name, public_id, system_id, subset)?.end_document_type()
    }

    /// Writes a tree node and its descendants.
    ///
    /// Text and attribute values are written as stored, like the reader reports them.
    pub fn write_node(&mut self, node: Node) -> Result<Self> {
        let value = node.value().unwrap_or("");
        match node.kind() {
            NodeKind::Document => {
                for child in node.children() {
                    self.write_node(child)?;
                }
            }
            NodeKind::DocumentFragment => {
                self.write_raw(value)?;
                for child in node.children() {
                    self.write_node(child)?;
                }
            }
            NodeKind::Element => {
                self.start_element(node.name())?;
                self.write_stored_attributes(node)?;

                if node.has_children() {
                    for child in node.children() {
                        self.write_node(child)?;
                    }
                } else if let Some(value) = node.value() {
                    self.write_raw(&value.replace('<', "&lt;"))?;
                }

                self.end_element()?;
            }
            NodeKind::Text => {
                if self.stack.is_empty() {
                    return Err(Error::UnexpectedContent("text outside of the root element"));
                }

                self.write_raw(&value.replace('<', "&lt;"))?;
            }
            NodeKind::Whitespace | NodeKind::SignificantWhitespace => {
                self.write_raw(value)?;
            }
            NodeKind::CData => {
                self.write_cdata(value)?;
            }
            NodeKind::Comment => {
                self.write_comment(value)?;
            }
            NodeKind::DocumentType => {
                self.check_doctype()?;
                self.begin_child(true);
                self.sink.emit("<!DOCTYPE ");
                self.sink.emit(value);
                self.sink.emit(">");
                self.doctype_written = true;
            }
            NodeKind::ProcessingInstruction | NodeKind::XmlDeclaration => {
                self.start_meta(node.name())?;
                self.write_stored_attributes(node)?;
                self.write_string(value)?;
                self.end_meta()?;
            }
            NodeKind::Entity | NodeKind::EntityReference | NodeKind::Notation => {
                self.write_raw(&node.to_xml_string())?;
            }
            kind => return Err(Error::InvalidNodeKind(kind)),
        }

        Ok(self)
    }

    /// Closes all open elements.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` when a comment, CDATA, DOCTYPE or meta is still open.
    pub fn flush(&mut self) -> Result<Self> {
        if self.open.is_markup() {
            return Err(Error::InvalidFormat("unterminated markup", self.depth()));
        }

        if !self.stack.is_empty() {
            log::debug!("closing {} open element(s)", self.stack.len());
        }

        while !self.stack.is_empty() {
            self.end_element()?;
        }

        Ok(self)
    }

    // Stored values keep references as written, so only delimiters are escaped.
    fn write_stored_attributes(&mut self, node: Node) -> std::result::Result<(), Error> {
        for attr in node.attributes() {
            let quote = attribute_quote(attr.value());
            let mut value = String::with_capacity(attr.value().len());
            push_attribute_value(attr.value(), quote, &mut value);

            self.open_attribute(attr.name(), quote)?;
            self.write_raw(&value)?;
            self.end_attribute()?;
        }

        Ok(())
    }

    fn write_meta_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if !self.meta_has_text && !self.meta_has_attributes {
            self.sink.emit(" ");
        }

        self.meta_has_text = true;
        self.sink.emit(text);
    }

    fn close_start_tag(&mut self) -> std::result::Result<(), Error> {
        if self.open.attribute {
            self.end_attribute()?;
        }

        if self.open.start_tag {
            self.sink.emit(">");
            self.open.start_tag = false;
        }

        Ok(())
    }

    // Registers a new node inside the current element and indents it.
    //
    // Mixed content is never indented.
    fn begin_child(&mut self, is_markup: bool) {
        let mut mixed = false;
        if let Some(frame) = self.stack.last_mut() {
            if is_markup {
                frame.has_children = true;
            } else {
                frame.has_text = true;
            }

            mixed = frame.has_text;
        }

        if is_markup && !mixed && self.written {
            self.write_indent(self.stack.len());
        }

        self.written = true;
    }

    fn mark_text(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.has_text = true;
        }

        self.written = true;
    }

    fn write_indent(&mut self, level: usize) {
        if self.indent.is_empty() {
            return;
        }

        self.sink.emit("\n");
        for _ in 0..level {
            self.sink.emit(&self.indent);
        }
    }

    fn bind_namespace(&mut self, prefix: &str, uri: &str) -> std::result::Result<(), Error> {
        match self.namespaces.get(prefix) {
            Some(bound) if !bound.eq_ignore_ascii_case(uri) => {
                Err(Error::NamespaceConflict { prefix: prefix.to_string(), uri: uri.to_string() })
            }
            Some(_) => Ok(()),
            None => {
                self.namespaces.insert(prefix, uri);
                Ok(())
            }
        }
    }

    fn is_declared(&self, prefix: &str) -> bool {
        prefix == "xml" || self.stack.iter().any(|f| f.declared.iter().any(|p| p == prefix))
    }

    fn write_namespace_declaration(&mut self, prefix: &str, uri: &str) -> std::result::Result<(), Error> {
        let name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };

        self.write_attribute(&name, uri)?;
        Ok(())
    }
}

impl Writer<String> {
    /// Closes all open elements and returns the text.
    pub fn into_string(mut self) -> std::result::Result<String, Error> {
        self.flush()?;
        Ok(self.sink)
    }

    /// Returns the text written so far.
    pub fn as_str(&self) -> &str {
        &self.sink
    }
}


fn qualified_name(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{}:{}", prefix, local_name)
    }
}
