//! In-memory annotation of interface members.

use dbus_xml::{Document, Element};
use tracing::{info, warn};

use crate::mapping::{TypeMapping, QT_TYPE_NAME};
use crate::MissingInterface;

const ANNOTATION: &str = "annotation";

/// Direction of a method or signal argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Interpret a `direction` attribute. Missing means `out`; the value is
    /// compared case-insensitively.
    ///
    /// Unrecognized values are returned lowercased as the error.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        let Some(raw) = raw else {
            return Ok(Direction::Out);
        };
        match raw.to_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(other.to_string()),
        }
    }

    /// Capitalized form used in annotation names.
    pub const fn label(self) -> &'static str {
        match self {
            Direction::In => "In",
            Direction::Out => "Out",
        }
    }
}

/// Name of the annotation describing the `index`-th mapped argument in
/// `direction`, e.g. `org.qtproject.QtDBus.QtTypeName.Out0`.
pub fn arg_annotation_name(direction: Direction, index: usize) -> String {
    format!("{QT_TYPE_NAME}.{}{index}", direction.label())
}

/// Whether `node` already carries an `annotation` child called `name`.
pub fn has_annotation(node: &Element, name: &str) -> bool {
    node.children_named(ANNOTATION)
        .any(|annotation| annotation.attribute("name") == Some(name))
}

fn annotation(name: &str, value: &str) -> Element {
    Element::new(ANNOTATION)
        .with_attribute("name", name)
        .with_attribute("value", value)
}

/// Add a `QtTypeName` annotation to a property whose type is mapped.
///
/// Returns `true` if the element was modified.
pub fn annotate_property(node: &mut Element, mapping: &TypeMapping) -> bool {
    let Some(wire) = node.attribute("type").map(str::to_owned) else {
        return false;
    };
    let Some(qt_type) = mapping.qt_type(&wire) else {
        return false;
    };
    if has_annotation(node, QT_TYPE_NAME) {
        return false;
    }

    node.append_element(annotation(QT_TYPE_NAME, qt_type));
    info!("Annotated {wire} as {qt_type}");
    true
}

/// Add positional `QtTypeName.In<N>` / `QtTypeName.Out<N>` annotations to a
/// method or signal for every argument whose type is mapped.
///
/// Indices count mapped arguments per direction in document order. An
/// argument with an unrecognized direction is reported and takes no index.
/// Returns `true` if any annotation was added.
pub fn annotate_arg_container(node: &mut Element, mapping: &TypeMapping) -> bool {
    let mut in_count = 0usize;
    let mut out_count = 0usize;
    let mut pending = Vec::new();

    for arg in node.children_named("arg") {
        let Some(wire) = arg.attribute("type") else {
            continue;
        };
        let Some(qt_type) = mapping.qt_type(wire) else {
            continue;
        };
        let direction = match Direction::parse(arg.attribute("direction")) {
            Ok(direction) => direction,
            Err(unknown) => {
                warn!(
                    member = node.attribute("name").unwrap_or_default(),
                    "Unknown direction {unknown}"
                );
                continue;
            }
        };

        let counter = match direction {
            Direction::In => &mut in_count,
            Direction::Out => &mut out_count,
        };
        let index = *counter;
        *counter += 1;

        let name = arg_annotation_name(direction, index);
        if has_annotation(node, &name) {
            continue;
        }
        info!(
            "Annotated arg {}{index} {wire} as {qt_type}",
            direction.label()
        );
        pending.push(annotation(&name, qt_type));
    }

    let modified = !pending.is_empty();
    for element in pending {
        node.append_element(element);
    }
    modified
}

/// Annotate every `property`, `method` and `signal` directly below an
/// `interface` element. Other children are left alone.
pub fn annotate_interface(interface: &mut Element, mapping: &TypeMapping) -> bool {
    let mut modified = false;
    for member in interface.child_elements_mut() {
        let is_property = member.name == "property";
        let is_arg_container = member.name == "method" || member.name == "signal";

        if is_property {
            modified |= annotate_property(member, mapping);
        } else if is_arg_container {
            modified |= annotate_arg_container(member, mapping);
        }
    }
    modified
}

/// The `interface` element that must be the first child element of the root.
pub fn interface_mut(document: &mut Document) -> Result<&mut Element, MissingInterface> {
    document
        .root
        .first_child_element_mut()
        .filter(|element| element.name == "interface")
        .ok_or(MissingInterface)
}

/// Check the document layout without modifying it.
pub fn check_structure(document: &Document) -> Result<(), MissingInterface> {
    match document.root.first_child_element() {
        Some(element) if element.name == "interface" => Ok(()),
        _ => Err(MissingInterface),
    }
}

/// Annotate the document's interface. Fails if the document has no
/// interface in the expected position.
pub fn annotate_document(
    document: &mut Document,
    mapping: &TypeMapping,
) -> Result<bool, MissingInterface> {
    let interface = interface_mut(document)?;
    Ok(annotate_interface(interface, mapping))
}
