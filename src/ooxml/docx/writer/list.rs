//! List rendering: numbered and bulleted paragraphs.
//!
//! Lists are flattened into one paragraph per item. Every item of a
//! top-level list (and of the lists nested in it) shares the numbering id of
//! that top-level list, and carries its own indentation level.
use crate::ooxml::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::node::Node;
use super::render::RenderSession;

/// The kind of list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    Ordered,
    Unordered,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        }
    }
}

/// A list of items at one nesting level.
#[derive(Debug, Clone)]
pub struct List {
    pub list_type: ListType,
    /// Nesting level, 0 for a top-level list
    pub level: u8,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(list_type: ListType) -> Self {
        Self {
            list_type,
            level: 0,
            items: Vec::new(),
        }
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn item(mut self, item: ListItem) -> Self {
        self.items.push(item);
        self
    }

    /// Items in document order with nested lists expanded after their parent.
    pub fn recursive_items(&self) -> Vec<&ListItem> {
        let mut items = Vec::with_capacity(self.items.len());
        for item in &self.items {
            items.push(item);
            if let Some(ref nested) = item.nested {
                items.extend(nested.recursive_items());
            }
        }
        items
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        let num_id = match (self.level, session.current_list()) {
            (0, _) | (_, None) => session.register_list(),
            (_, Some(current)) => current,
        };

        for item in self.recursive_items() {
            item.to_xml(xml, num_id, session)?;
        }
        Ok(())
    }
}

/// One list item: inline content plus an optional nested list.
#[derive(Debug, Clone)]
pub struct ListItem {
    pub list_type: ListType,
    pub level: u8,
    pub children: Vec<Node>,
    pub nested: Option<List>,
}

impl ListItem {
    pub fn new(list_type: ListType, level: u8) -> Self {
        Self {
            list_type,
            level,
            children: Vec::new(),
            nested: None,
        }
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn nested(mut self, list: List) -> Self {
        self.nested = Some(list);
        self
    }

    fn to_xml(
        &self,
        xml: &mut String,
        num_id: usize,
        session: &mut RenderSession<'_>,
    ) -> Result<()> {
        let style = session.ctx().find_list_style(self.list_type, self.level)?;

        xml.push_str("<w:p><w:pPr><w:numPr>");
        write!(
            xml,
            r#"<w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
            self.level, num_id
        )?;
        write!(
            xml,
            r#"<w:ind w:left="{}" w:hanging="{}"/>"#,
            style.left,
            style.hanging()
        )?;
        xml.push_str(r#"<w:contextualSpacing w:val="1"/><w:rPr><w:u w:val="none"/></w:rPr></w:pPr>"#);
        session.render_nodes(xml, &self.children)?;
        xml.push_str("</w:p>");
        Ok(())
    }
}
