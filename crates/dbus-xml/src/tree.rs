//! In-memory XML tree used for read-modify-write of interface files.

/// A single `key="value"` pair. The value is stored unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Any item that can appear in the document or inside an element.
///
/// Character data, comments and processing instructions keep their raw
/// (still escaped) source text so untouched regions serialize back as they
/// were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    DocType(String),
}

/// Whitespace-only character data, i.e. indentation between tags.
fn is_blank(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_whitespace)
}

/// Element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style variant of [`Element::set_attribute`].
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Look up an attribute value by its exact (prefixed) name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// Replace the value of an existing attribute or append a new one.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { key, value }),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Direct child elements with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |element| element.name == name)
    }

    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    pub fn first_child_element_mut(&mut self) -> Option<&mut Element> {
        self.child_elements_mut().next()
    }

    /// Append `element` as the last child element.
    ///
    /// When the existing children are laid out on separate lines, the new
    /// element is placed before the whitespace that precedes the closing tag
    /// and gets the same indentation as its preceding sibling.
    pub fn append_element(&mut self, element: Element) {
        let trailing = match self.children.last() {
            Some(Node::Text(text)) if is_blank(text) => Some(text.clone()),
            _ => None,
        };
        let Some(trailing) = trailing else {
            self.children.push(Node::Element(element));
            return;
        };
        let indent = self
            .sibling_indent()
            .unwrap_or_else(|| format!("{trailing}  "));
        let at = self.children.len() - 1;
        self.children.insert(at, Node::Element(element));
        self.children.insert(at, Node::Text(indent));
    }

    fn sibling_indent(&self) -> Option<String> {
        let last = self
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Element(_)))?;
        match self.children.get(last.checked_sub(1)?)? {
            Node::Text(text) if is_blank(text) => Some(text.clone()),
            _ => None,
        }
    }
}

/// Parsed document: everything before the root element, the root itself,
/// and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}
