use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use crate::error::{DeckError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(|e| DeckError::XmlWrite(e.to_string()))
}

pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_error)?;

    if let Some(root_id) = doc.root() {
        write_node(doc, root_id, &mut writer, &NamespaceMap::new())?;
    }

    Ok(writer.into_inner().into_inner())
}

/// Namespace URI to prefix; the empty prefix marks the default namespace.
type NamespaceMap = HashMap<String, String>;

fn write_error(e: impl std::fmt::Display) -> DeckError {
    DeckError::XmlWrite(e.to_string())
}

fn is_xmlns_attr(attr: &XAttribute) -> bool {
    (attr.name.namespace.is_none() && attr.name.local_name == "xmlns")
        || attr.name.namespace.as_deref() == Some(XMLNS_NS)
}

fn extend_namespace_map(namespace_map: &mut NamespaceMap, attributes: &[XAttribute]) {
    for attr in attributes.iter().filter(|a| is_xmlns_attr(a)) {
        let prefix = if attr.name.namespace.is_none() {
            String::new()
        } else {
            attr.name.local_name.clone()
        };
        namespace_map.insert(attr.value.clone(), prefix);
    }
}

/// Elements created in code carry no declarations of their own; declare
/// whatever they use that is not already in scope.
fn declare_missing(
    name: &XName,
    attributes: &[XAttribute],
    scoped_map: &mut NamespaceMap,
) -> Vec<XAttribute> {
    let mut extra = Vec::new();
    let used = name
        .namespace
        .iter()
        .chain(attributes.iter().filter_map(|a| a.name.namespace.as_ref()));

    for ns in used {
        if ns == XMLNS_NS || ns == XML_NS {
            continue;
        }
        let is_attribute_ns = name.namespace.as_ref() != Some(ns);
        let usable = match scoped_map.get(ns) {
            Some(prefix) => !(is_attribute_ns && prefix.is_empty()),
            None => false,
        };
        if usable {
            continue;
        }
        let prefix = get_prefix(ns);
        scoped_map.insert(ns.clone(), prefix.to_string());
        extra.push(XAttribute::new(XName::new(XMLNS_NS, prefix), ns));
    }

    extra
}

fn qualified(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{}:{}", prefix, local_name)
    }
}

fn write_node<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element(doc, node_id, name, attributes, writer, namespace_map)?;
        }
        XmlNodeData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let pi_content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(&pi_content)))
                .map_err(write_error)?;
        }
    }

    Ok(())
}

fn write_element<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let mut scoped_map = namespace_map.clone();
    extend_namespace_map(&mut scoped_map, attributes);
    let declarations = declare_missing(name, attributes, &mut scoped_map);

    let tag_name = match &name.namespace {
        Some(ns) => qualified(
            scoped_map.get(ns).map(String::as_str).unwrap_or(""),
            &name.local_name,
        ),
        None => name.local_name.clone(),
    };

    let mut elem = BytesStart::new(tag_name.as_str());

    for attr in attributes.iter().chain(declarations.iter()) {
        let attr_name = match attr.name.namespace.as_deref() {
            Some(XMLNS_NS) => qualified("xmlns", &attr.name.local_name),
            Some(XML_NS) => qualified("xml", &attr.name.local_name),
            Some(ns) => qualified(
                scoped_map.get(ns).map(String::as_str).unwrap_or(""),
                &attr.name.local_name,
            ),
            None => attr.name.local_name.clone(),
        };
        elem.push_attribute((attr_name.as_str(), attr.value.as_str()));
    }

    let children: Vec<_> = doc.children(node_id).collect();

    if children.is_empty() {
        writer.write_event(Event::Empty(elem)).map_err(write_error)?;
    } else {
        writer.write_event(Event::Start(elem)).map_err(write_error)?;

        for child_id in children {
            write_node(doc, child_id, writer, &scoped_map)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(tag_name.as_str())))
            .map_err(write_error)?;
    }

    Ok(())
}

fn get_prefix(namespace: &str) -> &'static str {
    match namespace {
        // PresentationML
        "http://schemas.openxmlformats.org/presentationml/2006/main" => "p",
        "http://schemas.microsoft.com/office/powerpoint/2010/main" => "p14",
        // DrawingML
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.openxmlformats.org/drawingml/2006/picture" => "pic",
        "http://schemas.openxmlformats.org/drawingml/2006/chart" => "c",
        // Relationships
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
        // Markup Compatibility
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        // Core properties
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties" => "cp",
        "http://purl.org/dc/elements/1.1/" => "dc",
        "http://purl.org/dc/terms/" => "dcterms",
        "http://purl.org/dc/dcmitype/" => "dcmitype",
        "http://www.w3.org/2001/XMLSchema-instance" => "xsi",
        _ => "ns",
    }
}
