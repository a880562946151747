/*!
Read, build and write [XML 1.0](https://www.w3.org/TR/xml/)-like documents.

The crate consists of three parts:

- [`Reader`], a pull reader that turns text into a sequence of node events
  using speculative tokenization with backtracking.
- [`Document`], a mutable tree assembled from reader events by [`Document::parse`].
- [`Writer`], a checked writer that only produces structurally valid output.

Any tree serialized with [`Node::to_xml_string`] parses back to a tree
that serializes to the same text.

[`Reader`]: struct.Reader.html
[`Document`]: struct.Document.html
[`Document::parse`]: struct.Document.html#method.parse
[`Writer`]: struct.Writer.html
[`Node::to_xml_string`]: struct.Node.html#method.to_xml_string
*/

#![doc(html_root_url = "https://docs.rs/pullxml/0.1.0")]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::slice;

pub use xmlparser::TextPos;

mod parse;
mod reader;
mod serialize;
mod source;
mod writer;
pub mod text;


pub use parse::*;
pub use reader::{Reader, ReaderOptions};
pub use source::{Source, StrSource};
pub use writer::{Sink, TextWriter, Writer};


/// The <http://www.w3.org/XML/1998/namespace> URI.
pub const NS_XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The <http://www.w3.org/2000/xmlns/> URI.
pub const NS_XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";


/// List of node kinds.
///
/// `None`, `Attribute`, `EndElement` and `EndEntity` are reported only by
/// the [`Reader`] and cannot be used as tree nodes.
///
/// [`Reader`]: struct.Reader.html
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[allow(missing_docs)]
pub enum NodeKind {
    None,
    Element,
    Attribute,
    Text,
    CData,
    EntityReference,
    Entity,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    Notation,
    Whitespace,
    SignificantWhitespace,
    EndElement,
    EndEntity,
    XmlDeclaration,
}

impl NodeKind {
    /// Checks that a node of this kind can have children.
    pub fn can_parent(&self) -> bool {
        match *self {
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::Element => true,
            _ => false,
        }
    }

    /// Checks that a node of this kind must have a value.
    pub fn requires_value(&self) -> bool {
        match *self {
            NodeKind::CData
            | NodeKind::Comment
            | NodeKind::DocumentType
            | NodeKind::Entity
            | NodeKind::Notation
            | NodeKind::SignificantWhitespace
            | NodeKind::Text
            | NodeKind::Whitespace => true,
            _ => false,
        }
    }

    /// Checks that this kind is a reader-only signal.
    pub fn is_signal(&self) -> bool {
        match *self {
            NodeKind::None | NodeKind::Attribute | NodeKind::EndElement | NodeKind::EndEntity => true,
            _ => false,
        }
    }

    fn requires_name(&self) -> bool {
        match *self {
            NodeKind::Element
            | NodeKind::EntityReference
            | NodeKind::ProcessingInstruction
            | NodeKind::XmlDeclaration => true,
            _ => false,
        }
    }

    fn is_text_like(&self) -> bool {
        match *self {
            NodeKind::Text | NodeKind::Whitespace | NodeKind::SignificantWhitespace => true,
            _ => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            NodeKind::None => "None",
            NodeKind::Element => "Element",
            NodeKind::Attribute => "Attribute",
            NodeKind::Text => "Text",
            NodeKind::CData => "CDATA",
            NodeKind::EntityReference => "EntityReference",
            NodeKind::Entity => "Entity",
            NodeKind::ProcessingInstruction => "ProcessingInstruction",
            NodeKind::Comment => "Comment",
            NodeKind::Document => "Document",
            NodeKind::DocumentType => "DocumentType",
            NodeKind::DocumentFragment => "DocumentFragment",
            NodeKind::Notation => "Notation",
            NodeKind::Whitespace => "Whitespace",
            NodeKind::SignificantWhitespace => "SignificantWhitespace",
            NodeKind::EndElement => "EndElement",
            NodeKind::EndEntity => "EndEntity",
            NodeKind::XmlDeclaration => "XmlDeclaration",
        };

        f.write_str(s)
    }
}


/// An attribute.
#[derive(Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: String,
}

impl Attribute {
    /// Returns attribute's qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns attribute's value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns attribute's prefix or an empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<e n:a='b'/>").unwrap();
    ///
    /// let attr = doc.root().unwrap().attributes().get_index(0).unwrap();
    /// assert_eq!(attr.prefix(), "n");
    /// assert_eq!(attr.local_name(), "a");
    /// ```
    pub fn prefix(&self) -> &str {
        reader::split_qname(&self.name).0
    }

    /// Returns attribute's local name.
    pub fn local_name(&self) -> &str {
        reader::split_qname(&self.name).1
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Attribute {{ name: {:?}, value: {:?} }}", self.name, self.value)
    }
}


/// A list of attributes with unique names.
///
/// Keeps the encounter order.
#[derive(Clone, PartialEq, Default)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// Creates an empty list.
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks that the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value of the attribute with the specified name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// Returns the attribute at the specified position.
    pub fn get_index(&self, idx: usize) -> Option<&Attribute> {
        self.0.get(idx)
    }

    /// Checks that the list has an attribute with the specified name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a.name == name)
    }

    /// Sets the attribute value.
    ///
    /// Returns the previous value. A replaced attribute keeps its position.
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        match self.0.iter_mut().find(|a| a.name == name) {
            Some(attr) => Some(std::mem::replace(&mut attr.value, value.to_string())),
            None => {
                self.push(name, value);
                None
            }
        }
    }

    /// Adds the attribute unless the list already has one with this name.
    ///
    /// Returns `false` when the attribute was already present.
    pub fn insert_if_absent(&mut self, name: &str, value: &str) -> bool {
        if self.contains(name) {
            return false;
        }

        self.push(name, value);
        true
    }

    /// Removes the attribute and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(idx).value)
    }

    /// Removes all attributes.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns an iterator over attributes in encounter order.
    pub fn iter(&self) -> slice::Iter<Attribute> {
        self.0.iter()
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0.push(Attribute { name: name.to_string(), value: value.to_string() });
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}


/// Node ID.
///
/// Index into a `Document`-internal `Vec`. Valid only for the document
/// that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);


#[derive(Clone)]
struct NodeData {
    kind: NodeKind,
    name: String,
    value: Option<String>,
    attributes: Attributes,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}


/// An XML tree container.
///
/// All nodes are owned by the document and addressed by [`NodeId`].
/// A node is a part of the tree when it is the root or a descendant of it.
/// Detached nodes stay in the document until it is dropped.
///
/// Children are kept in insertion order and a node can be a child of
/// only one parent: adding a node to another parent moves it.
///
/// Two documents are equal when their trees are equal.
///
/// # Examples
///
/// ```
/// use pullxml::{Document, NodeKind};
///
/// let mut doc = Document::new();
/// let root = doc.create_node(NodeKind::Element, "a", None).unwrap();
/// let text = doc.create_node(NodeKind::Text, "", Some("text")).unwrap();
/// doc.set_root(root);
/// assert!(doc.append_child(root, text));
///
/// assert_eq!(doc.root().unwrap().to_xml_string(), "<a>text</a>");
/// ```
///
/// [`NodeId`]: struct.NodeId.html
#[derive(Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Document::default()
    }

    /// Returns the root node, if any.
    pub fn root(&self) -> Option<Node> {
        self.root.map(|id| self.node(id))
    }

    /// Returns the root node ID, if any.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Sets the document root.
    ///
    /// The node is detached from its parent first.
    pub fn set_root(&mut self, id: NodeId) {
        self.detach(id);
        self.root = Some(id);
    }

    /// Returns a node by ID.
    ///
    /// # Panics
    ///
    /// Panics when the ID belongs to another document.
    pub fn node(&self, id: NodeId) -> Node {
        Node { id, d: &self.nodes[id.0], doc: self }
    }

    /// Returns a node by ID or `None` when the ID is out of range.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(id.0).map(|d| Node { id, d, doc: self })
    }

    /// Returns an iterator over the root node and its descendants.
    pub fn descendants(&self) -> Descendants {
        match self.root() {
            Some(root) => root.descendants(),
            None => Descendants(Traverse { root: None, edge: None }),
        }
    }

    /// Creates a detached node.
    ///
    /// # Errors
    ///
    /// - `InvalidNodeKind` for reader-only kinds.
    /// - `InvalidArgument("value")` for a value-bearing kind without a value.
    /// - `InvalidArgument("name")` for an element, a processing instruction,
    ///   an XML declaration or an entity reference without a name.
    pub fn create_node(&mut self, kind: NodeKind, name: &str, value: Option<&str>)
        -> Result<NodeId, Error>
    {
        if kind.is_signal() {
            return Err(Error::InvalidNodeKind(kind));
        }

        if kind.requires_value() && value.is_none() {
            return Err(Error::InvalidArgument("value"));
        }

        if kind.requires_name() && name.is_empty() {
            return Err(Error::InvalidArgument("name"));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            name: name.to_string(),
            value: value.map(str::to_string),
            attributes: Attributes::new(),
            children: Vec::new(),
            parent: None,
        });

        Ok(id)
    }

    /// Appends `child` to `parent`.
    ///
    /// The child is detached from its previous parent.
    /// Appending a node that is already a child of `parent` does nothing.
    ///
    /// Returns `false` without changes when `parent` cannot have children,
    /// when `child` is `parent` or one of its ancestors, or when `child`
    /// is the document root.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_append(parent, child) {
            return false;
        }

        if self.nodes[child.0].parent == Some(parent) {
            return true;
        }

        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Appends all `children` to `parent`.
    ///
    /// Either all nodes are appended or none: returns `false` without
    /// changes when any of them cannot be appended.
    pub fn append_children(&mut self, parent: NodeId, children: &[NodeId]) -> bool {
        if !children.iter().all(|child| self.can_append(parent, *child)) {
            return false;
        }

        for child in children {
            self.append_child(parent, *child);
        }

        true
    }

    /// Detaches `child` from `parent`.
    ///
    /// Returns `false` when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains_child(parent, child) {
            return false;
        }

        self.detach(child);
        true
    }

    /// Checks that `child` is a direct child of `parent`.
    pub fn contains_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes[child.0].parent == Some(parent)
    }

    /// Detaches all children of the node.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::replace(&mut self.nodes[parent.0].children, Vec::new());
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Copies a subtree.
    ///
    /// Returns a detached copy of the node.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut data = self.nodes[id.0].clone();
        let children = std::mem::replace(&mut data.children, Vec::new());
        data.parent = None;

        let copy = NodeId(self.nodes.len());
        self.nodes.push(data);

        for child in children {
            let child_copy = self.deep_clone(child);
            self.nodes[copy.0].children.push(child_copy);
            self.nodes[child_copy.0].parent = Some(copy);
        }

        copy
    }

    /// Sets an attribute value and returns the previous one.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Option<String> {
        self.nodes[id.0].attributes.insert(name, value)
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.nodes[id.0].attributes.remove(name)
    }

    /// Sets the node value.
    ///
    /// # Errors
    ///
    /// `InvalidArgument("value")` when removing the value of a value-bearing node.
    pub fn set_value(&mut self, id: NodeId, value: Option<&str>) -> Result<(), Error> {
        let d = &mut self.nodes[id.0];
        if d.kind.requires_value() && value.is_none() {
            return Err(Error::InvalidArgument("value"));
        }

        d.value = value.map(str::to_string);
        Ok(())
    }

    pub(crate) fn attributes_mut(&mut self, id: NodeId) -> &mut Attributes {
        &mut self.nodes[id.0].attributes
    }

    fn can_append(&self, parent: NodeId, child: NodeId) -> bool {
        if !self.nodes[parent.0].kind.can_parent() || self.root == Some(child) {
            return false;
        }

        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return false;
            }

            current = self.nodes[id.0].parent;
        }

        true
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Document) -> bool {
        match (self.root(), other.root()) {
            (Some(a), Some(b)) => a.tree_eq(&b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let root = match self.root() {
            Some(root) => root,
            None => return write!(f, "Document []"),
        };

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_node(node: Node, depth: usize, f: &mut fmt::Formatter)
            -> Result<(), fmt::Error>
        {
            if !node.has_children() && !node.has_attributes() {
                writeln_indented!(depth, f, "{:?}", node);
                return Ok(());
            }

            writeln_indented!(depth, f, "{} {{", node.kind());
            if !node.name().is_empty() {
                writeln_indented!(depth, f, "    name: {:?}", node.name());
            }

            if let Some(value) = node.value() {
                writeln_indented!(depth, f, "    value: {:?}", value);
            }

            if node.has_attributes() {
                writeln_indented!(depth, f, "    attributes: [");
                for attr in node.attributes() {
                    writeln_indented!(depth + 2, f, "{:?}", attr);
                }
                writeln_indented!(depth, f, "    ]");
            }

            if node.has_children() {
                writeln_indented!(depth, f, "    children: [");
                for child in node.children() {
                    print_node(child, depth + 2, f)?;
                }
                writeln_indented!(depth, f, "    ]");
            }

            writeln_indented!(depth, f, "}}");
            Ok(())
        }

        writeln!(f, "Document [")?;
        print_node(root, 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}


/// A node.
pub struct Node<'a> {
    /// Node ID.
    id: NodeId,

    /// Tree containing the node.
    doc: &'a Document,

    d: &'a NodeData,
}

impl<'a> Copy for Node<'a> {}

impl<'a> Clone for Node<'a> {
    fn clone(&self) -> Self { *self }
}

impl<'a> Eq for Node<'a> {}

impl<'a> PartialEq for Node<'a> {
    fn eq(&self, other: &Self) -> bool {
           self.id == other.id
        && self.doc as *const _ == other.doc as *const _
    }
}

impl<'a> Node<'a> {
    /// Returns node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns node's document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns node's kind.
    pub fn kind(&self) -> NodeKind {
        self.d.kind
    }

    /// Checks that node is an element node.
    pub fn is_element(&self) -> bool {
        self.d.kind == NodeKind::Element
    }

    /// Checks that node is a text, whitespace or significant whitespace node.
    pub fn is_text(&self) -> bool {
        self.d.kind.is_text_like()
    }

    /// Returns node's qualified name. Can be empty.
    pub fn name(&self) -> &'a str {
        &self.d.name
    }

    /// Returns the prefix of node's name or an empty string.
    pub fn prefix(&self) -> &'a str {
        reader::split_qname(&self.d.name).0
    }

    /// Returns the local part of node's name.
    pub fn local_name(&self) -> &'a str {
        reader::split_qname(&self.d.name).1
    }

    /// Returns node's value.
    ///
    /// An element has `Some("")` value when it was written as `<e></e>`
    /// and `None` when written as `<e/>`.
    pub fn value(&self) -> Option<&'a str> {
        self.d.value.as_ref().map(String::as_str)
    }

    /// Checks that node has a value.
    pub fn has_value(&self) -> bool {
        self.d.value.is_some()
    }

    /// Returns node's attributes.
    pub fn attributes(&self) -> &'a Attributes {
        &self.d.attributes
    }

    /// Returns node's attribute value.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<e a='b'/>").unwrap();
    ///
    /// assert_eq!(doc.root().unwrap().attribute("a"), Some("b"));
    /// ```
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.d.attributes.get(name)
    }

    /// Checks that node has attributes.
    pub fn has_attributes(&self) -> bool {
        !self.d.attributes.is_empty()
    }

    /// Checks that node can have children.
    pub fn can_parent(&self) -> bool {
        self.d.kind.can_parent()
    }

    fn gen_node(&self, id: NodeId) -> Node<'a> {
        self.doc.node(id)
    }

    /// Returns the parent of this node.
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.gen_node(id))
    }

    /// Returns the previous sibling of this node.
    pub fn prev_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = &parent.d.children;
        let idx = siblings.iter().position(|id| *id == self.id)?;
        idx.checked_sub(1).map(|idx| self.gen_node(siblings[idx]))
    }

    /// Returns the next sibling of this node.
    pub fn next_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = &parent.d.children;
        let idx = siblings.iter().position(|id| *id == self.id)?;
        siblings.get(idx + 1).map(|id| self.gen_node(*id))
    }

    /// Returns the first child of this node.
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.first().map(|id| self.gen_node(*id))
    }

    /// Returns the last child of this node.
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.last().map(|id| self.gen_node(*id))
    }

    /// Returns true if this node has children.
    pub fn has_children(&self) -> bool {
        !self.d.children.is_empty()
    }

    /// Returns an iterator over ancestor nodes.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(self.parent())
    }

    /// Returns an iterator over children nodes.
    pub fn children(&self) -> Children<'a> {
        Children { doc: self.doc, iter: self.d.children.iter() }
    }

    /// Returns an iterator which traverses the subtree starting at this node.
    pub fn traverse(&self) -> Traverse<'a> {
        Traverse { root: Some(*self), edge: None }
    }

    /// Returns an iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }

    /// Returns the first direct child with the specified name.
    ///
    /// The comparison is case-insensitive.
    pub fn get(&self, name: &str) -> Option<Self> {
        self.search(name, 0)
    }

    /// Searches the subtree for a node with the specified name.
    ///
    /// The search is depth-first and descends at most `depth` levels below
    /// the direct children. The name is trimmed and compared case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<a><b><C/></b><c/></a>").unwrap();
    /// let root = doc.root().unwrap();
    ///
    /// assert_eq!(root.search(" c ", 1).unwrap().name(), "C");
    /// assert_eq!(root.get("c").unwrap().name(), "c");
    /// ```
    pub fn search(&self, name: &str, depth: usize) -> Option<Self> {
        self.search_lowercase(&name.trim().to_lowercase(), depth)
    }

    fn search_lowercase(&self, name: &str, depth: usize) -> Option<Self> {
        for child in self.children() {
            if child.d.name.to_lowercase() == name {
                return Some(child);
            }

            if depth > 0 && child.has_children() {
                if let Some(node) = child.search_lowercase(name, depth - 1) {
                    return Some(node);
                }
            }
        }

        None
    }

    /// Returns an URI for a given prefix.
    ///
    /// Looks for `xmlns:prefix` attributes, or `xmlns` for an empty prefix,
    /// on this node and its ancestors.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<e xmlns:n='http://www.w3.org'><n:c/></e>").unwrap();
    /// let child = doc.root().unwrap().first_child().unwrap();
    ///
    /// assert_eq!(child.lookup_namespace_uri("n"), Some("http://www.w3.org"));
    /// ```
    pub fn lookup_namespace_uri(&self, prefix: &str) -> Option<&'a str> {
        if prefix == "xml" {
            return Some(NS_XML_URI);
        }

        let name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };

        let mut node = Some(*self);
        while let Some(n) = node {
            if let Some(uri) = n.attribute(&name) {
                return Some(uri);
            }

            node = n.parent();
        }

        None
    }

    /// Returns a prefix for a given namespace URI.
    ///
    /// Returns an empty string for the default namespace.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<e xmlns:n='http://www.w3.org'/>").unwrap();
    ///
    /// assert_eq!(doc.root().unwrap().lookup_prefix("http://www.w3.org"), Some("n"));
    /// ```
    pub fn lookup_prefix(&self, uri: &str) -> Option<&'a str> {
        if uri == NS_XML_URI {
            return Some("xml");
        }

        let mut node = Some(*self);
        while let Some(n) = node {
            for attr in n.attributes() {
                if attr.value() != uri {
                    continue;
                }

                if attr.name() == "xmlns" {
                    return Some("");
                }

                if let Some(prefix) = attr.name().strip_prefix("xmlns:") {
                    return Some(prefix);
                }
            }

            node = n.parent();
        }

        None
    }

    /// Serializes the subtree into the exact text form.
    pub fn to_xml_string(&self) -> String {
        serialize::node_to_string(*self, None)
    }

    /// Serializes the subtree with tab indentation, starting at `tabs` tabs.
    ///
    /// The result is meant for humans and does not round-trip exactly.
    pub fn to_xml_string_indented(&self, tabs: usize) -> String {
        serialize::node_to_string(*self, Some(tabs))
    }

    fn tree_eq(&self, other: &Node) -> bool {
           self.d.kind == other.d.kind
        && self.d.name == other.d.name
        && self.d.value == other.d.value
        && self.d.attributes == other.d.attributes
        && self.d.children.len() == other.d.children.len()
        && self.children().zip(other.children()).all(|(a, b)| a.tree_eq(&b))
    }
}

impl<'a> fmt::Debug for Node<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.d.kind {
            NodeKind::Text
            | NodeKind::Whitespace
            | NodeKind::SignificantWhitespace
            | NodeKind::Comment
            | NodeKind::CData => {
                write!(f, "{}({:?})", self.d.kind, self.value().unwrap_or(""))
            }
            _ => {
                write!(f, "{} {{ name: {:?}, value: {:?} }}",
                       self.d.kind, self.d.name, self.d.value)
            }
        }
    }
}

impl<'a> fmt::Display for Node<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.to_xml_string())
    }
}


/// Iterator over ancestors.
#[derive(Clone)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}


/// Iterator over children.
#[derive(Clone)]
pub struct Children<'a> {
    doc: &'a Document,
    iter: slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.doc;
        self.iter.next().map(|id| doc.node(*id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Children<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let doc = self.doc;
        self.iter.next_back().map(|id| doc.node(*id))
    }
}

impl<'a> ExactSizeIterator for Children<'a> {}


/// Open or close edge of a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge<'a> {
    /// Open.
    Open(Node<'a>),
    /// Close.
    Close(Node<'a>),
}


/// Iterator which traverses a subtree.
#[derive(Clone)]
pub struct Traverse<'a> {
    root: Option<Node<'a>>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let root = self.root?;
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == root {
                    self.root = None;
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(root));
            }
        }

        self.edge
    }
}


/// Iterator over a node and its descendants.
#[derive(Clone)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}
