use std::error;
use std::fmt;

use xmlparser::TextPos;

use crate::{
    Document,
    NodeId,
    NodeKind,
    Reader,
    ReaderOptions,
    Source,
    StrSource,
};


/// A list of all possible errors.
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// A required argument is missing or malformed.
    ///
    /// Contains the argument name.
    InvalidArgument(&'static str),

    /// A reader-only node kind was used to create a tree node.
    InvalidNodeKind(NodeKind),

    /// A namespace prefix was already bound to a different URI.
    #[allow(missing_docs)]
    NamespaceConflict { prefix: String, uri: String },

    /// A writer call is not allowed in the current writer state.
    ///
    /// Contains the reason and the writer depth.
    InvalidFormat(&'static str, usize),

    /// A structurally disallowed token in the input.
    UnexpectedToken(String, TextPos),

    /// Content was written where the writer cannot place it.
    UnexpectedContent(&'static str),
}

/// An error class.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// A missing or inconsistent argument.
    InvalidArgument,
    /// A writer call sequence violation.
    InvalidFormat,
    /// A disallowed token or content.
    UnexpectedToken,
}

impl Error {
    /// Returns the error class.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::InvalidArgument(_)
            | Error::InvalidNodeKind(_)
            | Error::NamespaceConflict { .. } => ErrorKind::InvalidArgument,
            Error::InvalidFormat(..) => ErrorKind::InvalidFormat,
            Error::UnexpectedToken(..)
            | Error::UnexpectedContent(_) => ErrorKind::UnexpectedToken,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidArgument(name) => {
                write!(f, "invalid or missing argument '{}'", name)
            }
            Error::InvalidNodeKind(kind) => {
                write!(f, "a node of kind '{}' cannot be created", kind)
            }
            Error::NamespaceConflict { ref prefix, ref uri } => {
                write!(f, "prefix '{}' is already bound to a URI other than '{}'", prefix, uri)
            }
            Error::InvalidFormat(reason, depth) => {
                write!(f, "{} at depth {}", reason, depth)
            }
            Error::UnexpectedToken(ref token, pos) => {
                write!(f, "unexpected token '{}' at {}", token, pos)
            }
            Error::UnexpectedContent(reason) => {
                write!(f, "unexpected content: {}", reason)
            }
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "an XML processing error"
    }
}


impl Document {
    /// Parses the input XML string.
    ///
    /// Returns an empty document when the input has no nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// let doc = pullxml::Document::parse("<e/>").unwrap();
    /// assert_eq!(doc.root().unwrap().name(), "e");
    /// assert_eq!(doc.root().unwrap().to_xml_string(), "<e/>");
    /// ```
    pub fn parse(text: &str) -> Result<Document, Error> {
        Self::parse_with_options(text, ReaderOptions::default())
    }

    /// Parses the input XML string using the specified reader options.
    pub fn parse_with_options(text: &str, opt: ReaderOptions) -> Result<Document, Error> {
        Self::from_reader(Reader::with_options(StrSource::new(text), opt))
    }

    /// Builds a document from the remaining events of a reader.
    ///
    /// A DOCTYPE or an XML declaration read before any other node gets
    /// a synthesized `Document` parent. Any other first node becomes the root
    /// itself, and later depth 0 nodes are appended to it.
    /// Nodes without a parent are dropped.
    pub fn from_reader<S: Source>(mut reader: Reader<S>) -> Result<Document, Error> {
        let mut doc = Document::new();

        // Most recently opened parentable node for each depth.
        let mut parents: Vec<NodeId> = Vec::new();

        while reader.read()? {
            let kind = reader.node_kind();
            if kind == NodeKind::EndElement {
                continue;
            }

            let depth = reader.depth();
            let parent = if depth > 0 {
                parents.get(depth - 1).cloned()
            } else {
                match doc.root {
                    Some(root) if doc.nodes[root.0].kind.can_parent() => Some(root),
                    Some(_) => None,
                    None if starts_document(kind) => {
                        let root = doc.create_node(NodeKind::Document, "", None)?;
                        doc.set_root(root);
                        Some(root)
                    }
                    None => {
                        let id = append_node(&mut doc, &reader)?;
                        doc.set_root(id);
                        record_parent(&mut parents, &doc, depth, id);
                        continue;
                    }
                }
            };

            let parent = match parent {
                Some(id) => id,
                None => {
                    log::debug!("{} node '{}' at depth {} has no parent and is dropped",
                                kind, reader.name(), depth);
                    parents.truncate(depth);
                    continue;
                }
            };

            let id = append_node(&mut doc, &reader)?;
            doc.append_child(parent, id);
            record_parent(&mut parents, &doc, depth, id);
        }

        Ok(doc)
    }
}

fn starts_document(kind: NodeKind) -> bool {
    match kind {
        NodeKind::DocumentType | NodeKind::XmlDeclaration => true,
        _ => false,
    }
}

fn append_node<S: Source>(doc: &mut Document, reader: &Reader<S>) -> Result<NodeId, Error> {
    let id = doc.create_node(reader.node_kind(), reader.name(), reader.value_opt())?;
    *doc.attributes_mut(id) = reader.attributes().clone();
    Ok(id)
}

fn record_parent(parents: &mut Vec<NodeId>, doc: &Document, depth: usize, id: NodeId) {
    if doc.node(id).can_parent() {
        parents.truncate(depth);
        parents.push(id);
    }
}
