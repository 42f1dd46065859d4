use super::xname::{XAttribute, XName};

/// Payload of one arena node. Only elements carry a name and attributes;
/// attribute edits on any other kind are ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum XmlNodeData {
    Element {
        name: XName,
        attributes: Vec<XAttribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl XmlNodeData {
    pub fn element(name: XName) -> Self {
        Self::Element {
            name,
            attributes: Vec::new(),
        }
    }

    pub fn element_with_attrs(name: XName, attributes: Vec<XAttribute>) -> Self {
        Self::Element { name, attributes }
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub fn name(&self) -> Option<&XName> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_named(&self, wanted: &XName) -> bool {
        self.name() == Some(wanted)
    }

    pub fn attributes(&self) -> Option<&[XAttribute]> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &XName) -> Option<&str> {
        self.attributes()?
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets `name`, keeping its position when already present so rewritten
    /// parts diff cleanly against the template.
    pub fn set_attribute(&mut self, name: &XName, value: &str) {
        let Self::Element { attributes, .. } = self else {
            return;
        };
        match attributes.iter_mut().find(|a| &a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attributes.push(XAttribute::new(name.clone(), value)),
        }
    }

    /// Removes `name` and returns its old value.
    pub fn remove_attribute(&mut self, name: &XName) -> Option<String> {
        let Self::Element { attributes, .. } = self else {
            return None;
        };
        let index = attributes.iter().position(|a| &a.name == name)?;
        Some(attributes.remove(index).value)
    }

    /// Character data of text and CDATA nodes.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CData(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_cell() -> XmlNodeData {
        XmlNodeData::element_with_attrs(
            XName::local("tc"),
            vec![
                XAttribute::new(XName::local("rowSpan"), "3"),
                XAttribute::new(XName::local("gridSpan"), "2"),
            ],
        )
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut cell = span_cell();
        cell.set_attribute(&XName::local("rowSpan"), "5");
        cell.set_attribute(&XName::local("vMerge"), "1");

        let names: Vec<&str> = cell
            .attributes()
            .unwrap()
            .iter()
            .map(|a| a.name.local_name.as_str())
            .collect();
        assert_eq!(names, vec!["rowSpan", "gridSpan", "vMerge"]);
        assert_eq!(cell.attribute(&XName::local("rowSpan")), Some("5"));
    }

    #[test]
    fn remove_attribute_returns_old_value() {
        let mut cell = span_cell();

        assert_eq!(cell.remove_attribute(&XName::local("gridSpan")).as_deref(), Some("2"));
        assert_eq!(cell.remove_attribute(&XName::local("gridSpan")), None);
        assert_eq!(cell.attributes().unwrap().len(), 1);
    }

    #[test]
    fn non_elements_ignore_attribute_edits() {
        let mut text = XmlNodeData::text("Sub Total");
        text.set_attribute(&XName::local("rowSpan"), "2");

        assert_eq!(text, XmlNodeData::text("Sub Total"));
        assert!(!text.is_named(&XName::local("tc")));
        assert_eq!(text.text_value(), Some("Sub Total"));
        assert_eq!(XmlNodeData::CData("a<b".into()).text_value(), Some("a<b"));
    }
}
