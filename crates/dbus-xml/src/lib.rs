//! Read and rewrite D-Bus introspection XML using quick-xml.
//!
//! The tree keeps whitespace, comments, the XML declaration and the DOCTYPE
//! so a document can be modified and written back without disturbing the
//! parts nobody touched.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use tracing::trace;

mod tree;

pub use tree::{Attribute, Document, Element, Node};

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Parse a complete XML document into an owned tree.
pub fn parse(xml: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        let event = reader.read_event().map_err(|err| {
            XmlError::Xml(format!("{err} (at byte {})", reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => builder.stack.push(start_element(&e)?),
            Event::Empty(e) => builder.attach(Node::Element(start_element(&e)?))?,
            Event::End(_) => {
                let element = builder
                    .stack
                    .pop()
                    .ok_or_else(|| XmlError::Invalid("unbalanced end tag".into()))?;
                builder.attach(Node::Element(element))?;
            }
            Event::Text(e) => builder.attach(Node::Text(utf8(e.into_inner())?))?,
            Event::CData(e) => builder.attach(Node::CData(utf8(e.into_inner())?))?,
            Event::Comment(e) => builder.attach(Node::Comment(utf8(e.into_inner())?))?,
            Event::PI(e) => builder.attach(Node::ProcessingInstruction(utf8(e.into_inner())?))?,
            Event::DocType(e) => {
                let raw = utf8(e.into_inner())?;
                builder.attach(Node::DocType(raw.trim_start().to_string()))?;
            }
            Event::Decl(e) => builder.attach(declaration(&e)?)?,
            Event::Eof => break,
        }
    }

    builder.finish()
}

/// Serialize a document back to text.
///
/// Attribute values are escaped; text, comments and other raw nodes are
/// emitted exactly as they were read.
pub fn to_string(document: &Document) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    for node in &document.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;
    for node in &document.epilog {
        write_node(&mut writer, node)?;
    }
    let bytes = writer.into_inner();
    trace!(bytes = bytes.len(), root = %document.root.name, "serialized document");
    String::from_utf8(bytes).map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    epilog: Vec<Node>,
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> Result<(), XmlError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(XmlError::Invalid(format!(
                        "second root element <{}>",
                        element.name
                    )));
                }
                self.root = Some(element);
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self) -> Result<Document, XmlError> {
        if let Some(open) = self.stack.last() {
            return Err(XmlError::Invalid(format!("unclosed element <{}>", open.name)));
        }
        let root = self
            .root
            .ok_or_else(|| XmlError::Invalid("document has no root element".into()))?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn start_element(event: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = event.name();
    let mut element = Element::new(utf8(Cow::Borrowed(name.as_ref()))?);
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = utf8(Cow::Borrowed(attr.key.as_ref()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        element.attributes.push(Attribute {
            key,
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn declaration(event: &BytesDecl<'_>) -> Result<Node, XmlError> {
    let version = event
        .version()
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    let encoding = event
        .encoding()
        .transpose()
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    let standalone = event
        .standalone()
        .transpose()
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    Ok(Node::Declaration {
        version: utf8(version)?,
        encoding: encoding.map(utf8).transpose()?,
        standalone: standalone.map(utf8).transpose()?,
    })
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(raw) => emit(writer, Event::Text(BytesText::from_escaped(raw.as_str()))),
        Node::CData(raw) => emit(writer, Event::CData(BytesCData::new(raw.as_str()))),
        Node::Comment(raw) => emit(writer, Event::Comment(BytesText::from_escaped(raw.as_str()))),
        Node::ProcessingInstruction(raw) => {
            emit(writer, Event::PI(BytesText::from_escaped(raw.as_str())))
        }
        Node::Declaration {
            version,
            encoding,
            standalone,
        } => emit(
            writer,
            Event::Decl(BytesDecl::new(
                version,
                encoding.as_deref(),
                standalone.as_deref(),
            )),
        ),
        Node::DocType(raw) => {
            let out = writer.get_mut();
            out.extend_from_slice(b"<!DOCTYPE ");
            out.extend_from_slice(raw.as_bytes());
            out.push(b'>');
            Ok(())
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.key.as_str(), attr.value.as_str()));
    }
    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|err| XmlError::Xml(err.to_string()))
}

fn utf8(bytes: Cow<'_, [u8]>) -> Result<String, XmlError> {
    String::from_utf8(bytes.into_owned())
        .map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))
}
