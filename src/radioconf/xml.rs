use super::ConfError;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Re-serializes `xml` with every element name lower-cased, the form the
/// configurator engine expects. Attributes and text are kept, comments and
/// processing instructions are dropped.
pub fn lowercase_tags(xml: &str) -> Result<String, ConfError> {
    let mut root = Element::parse(xml.as_bytes())?;
    lowercase(&mut root);
    let mut out = vec![];
    root.write_with_config(
        &mut out,
        EmitterConfig::new()
            .perform_indent(false)
            .write_document_declaration(true),
    )?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn lowercase(element: &mut Element) {
    element.name = element.name.to_lowercase();
    element.children.retain(|c| {
        matches!(c, XMLNode::Element(_) | XMLNode::Text(_) | XMLNode::CData(_))
    });
    for child in element.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            lowercase(e);
        }
    }
}
