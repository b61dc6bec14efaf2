//! Debug dump of the intermediate type tree.
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Error;
use crate::ir::TypeNode;

/// Deepest tree `write_json` accepts. Serialization recurses once per level.
pub const JSON_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DumpFormat {
    /// tab-indented XML
    #[default]
    Xml,
    /// pretty printed JSON
    Json,
}

pub fn write_dump<W: Write>(root: &TypeNode, format: DumpFormat, writer: W) -> Result<(), Error> {
    match format {
        DumpFormat::Xml => write_xml(root, writer),
        DumpFormat::Json => write_json(root, writer),
    }
}

/// `<Tree>` with `Name`, `List`, `Attr` and `Type` fields and one nested
/// `<Children>` element per child. Empty names and false list flags are
/// omitted.
pub fn write_xml<W: Write>(root: &TypeNode, writer: W) -> Result<(), Error> {
    let mut xml = Writer::new_with_indent(writer, b'\t', 1);

    // `None` closes the element opened for the node below it
    let mut stack = vec![Some(("Tree", root))];
    let mut open = Vec::new();
    while let Some(visit) = stack.pop() {
        let Some((tag, node)) = visit else {
            if let Some(tag) = open.pop() {
                xml.write_event(Event::End(BytesEnd::new(tag)))?;
            }
            continue;
        };
        xml.write_event(Event::Start(BytesStart::new(tag)))?;
        if !node.raw_name.is_empty() {
            write_field(&mut xml, "Name", &node.raw_name)?;
        }
        if node.is_list {
            write_field(&mut xml, "List", "true")?;
        }
        write_field(&mut xml, "Attr", if node.is_attribute { "true" } else { "false" })?;
        write_field(&mut xml, "Type", node.kind.as_str())?;
        open.push(tag);
        stack.push(None);
        stack.extend(node.children.iter().rev().map(|c| Some(("Children", c))));
    }

    let mut inner = xml.into_inner();
    inner.write_all(b"\n")?;
    Ok(())
}

/// # Errors
/// `Error::TooDeep` for trees deeper than [`JSON_MAX_DEPTH`]; use the XML
/// dump for those.
pub fn write_json<W: Write>(root: &TypeNode, mut writer: W) -> Result<(), Error> {
    let depth = root.depth();
    if depth > JSON_MAX_DEPTH {
        return Err(Error::TooDeep { depth, limit: JSON_MAX_DEPTH });
    }
    serde_json::to_writer_pretty(&mut writer, root)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn write_field<W: Write>(xml: &mut Writer<W>, tag: &str, value: &str) -> Result<(), Error> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
