/// Table types and the layout engine that places cells on the column grid.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

pub use super::super::format::{BorderStyle, ParagraphAlignment, VerticalAlignment};
use super::node::Node;
use super::render::RenderSession;

/// One border line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub color: String,
    pub line: BorderStyle,
    /// Width in eighths of a point (e.g., 8 = 1pt); 0 disables the side
    pub size: u32,
    /// Distance from the content in points
    pub spacing: u32,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            color: "auto".to_string(),
            line: BorderStyle::Single,
            size: 0,
            spacing: 0,
        }
    }
}

impl Border {
    pub fn new(line: BorderStyle, size: u32, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            line,
            size,
            spacing: 0,
        }
    }
}

/// Borders of a table or cell, per side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Borders {
    pub top: Border,
    pub left: Border,
    pub bottom: Border,
    pub right: Border,
    /// Between rows
    pub horizontal: Border,
    /// Between columns
    pub vertical: Border,
}

impl Borders {
    /// The same border on every side, inner lines included.
    pub fn all(border: Border) -> Self {
        Self {
            top: border.clone(),
            left: border.clone(),
            bottom: border.clone(),
            right: border.clone(),
            horizontal: border.clone(),
            vertical: border,
        }
    }

    fn sides(&self) -> [(&'static str, &Border); 6] {
        [
            ("top", &self.top),
            ("left", &self.left),
            ("bottom", &self.bottom),
            ("right", &self.right),
            ("insideH", &self.horizontal),
            ("insideV", &self.vertical),
        ]
    }

    /// Write the sides with a nonzero size inside `<w:{element}>`.
    fn to_xml(&self, xml: &mut String, element: &str) -> Result<()> {
        let mut sides = self.sides().into_iter().filter(|(_, b)| b.size > 0).peekable();
        if sides.peek().is_none() {
            return Ok(());
        }

        write!(xml, "<w:{}>", element)?;
        for (name, border) in sides {
            write!(
                xml,
                r#"<w:{} w:val="{}" w:sz="{}" w:space="{}" w:color="{}"/>"#,
                name,
                border.line.as_str(),
                border.size,
                border.spacing,
                escape_xml(&border.color)
            )?;
        }
        write!(xml, "</w:{}>", element)?;
        Ok(())
    }
}

/// Cell margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Default for CellMargins {
    fn default() -> Self {
        Self {
            top: 100,
            bottom: 100,
            left: 100,
            right: 100,
        }
    }
}

/// A table cell.
#[derive(Debug, Clone)]
pub struct TableCell {
    /// Grid columns covered by the cell (at least 1)
    pub colspan: u32,
    /// Rows covered by the cell, 0 for no vertical merge
    pub rowspan: u32,
    pub borders: Borders,
    pub margins: CellMargins,
    /// Background fill in hex RGB
    pub background: Option<String>,
    pub vertical_align: VerticalAlignment,
    /// Width in twips
    pub width: Option<u32>,
    pub contents: Vec<Node>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            colspan: 1,
            rowspan: 0,
            borders: Borders::default(),
            margins: CellMargins::default(),
            background: None,
            vertical_align: VerticalAlignment::Top,
            width: None,
            contents: Vec::new(),
        }
    }
}

impl TableCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }

    pub fn rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn background(mut self, fill: impl Into<String>) -> Self {
        self.background = Some(fill.into());
        self
    }

    pub fn vertical_align(mut self, align: VerticalAlignment) -> Self {
        self.vertical_align = align;
        self
    }

    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    pub fn margins(mut self, margins: CellMargins) -> Self {
        self.margins = margins;
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.contents.push(node.into());
        self
    }

    #[inline]
    fn span(&self) -> u32 {
        self.colspan.max(1)
    }

    fn to_xml(
        &self,
        xml: &mut String,
        placement: CellPlacement,
        session: &mut RenderSession<'_>,
    ) -> Result<()> {
        xml.push_str("<w:tc><w:tcPr>");
        if let Some(width) = self.width {
            write!(xml, r#"<w:tcW w:w="{}" w:type="dxa"/>"#, width)?;
        }
        if placement.span > 1 {
            write!(xml, r#"<w:gridSpan w:val="{}"/>"#, placement.span)?;
        }
        match placement.merge {
            Some(VerticalMerge::Restart) => xml.push_str(r#"<w:vMerge w:val="restart"/>"#),
            Some(VerticalMerge::Continue) => xml.push_str(r#"<w:vMerge w:val="continue"/>"#),
            None => {},
        }
        self.borders.to_xml(xml, "tcBorders")?;
        if let Some(ref background) = self.background {
            write!(
                xml,
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                escape_xml(background)
            )?;
        }
        write!(
            xml,
            concat!(
                r#"<w:tcMar><w:top w:w="{}" w:type="dxa"/><w:left w:w="{}" w:type="dxa"/>"#,
                r#"<w:bottom w:w="{}" w:type="dxa"/><w:right w:w="{}" w:type="dxa"/></w:tcMar>"#
            ),
            self.margins.top, self.margins.left, self.margins.bottom, self.margins.right
        )?;
        write!(xml, r#"<w:vAlign w:val="{}"/>"#, self.vertical_align.as_str())?;
        xml.push_str("</w:tcPr>");

        if placement.merge == Some(VerticalMerge::Continue) {
            if !self.contents.is_empty() {
                log::debug!(
                    "dropping {} nodes of a merged cell at grid column {}",
                    self.contents.len(),
                    placement.column
                );
            }
            xml.push_str("<w:p/>");
        } else if self.contents.is_empty() {
            xml.push_str("<w:p/>");
        } else {
            session.render_nodes(xml, &self.contents)?;
        }

        xml.push_str("</w:tc>");
        Ok(())
    }
}

/// A table row.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    pub fn cell(mut self, cell: TableCell) -> Self {
        self.cells.push(cell);
        self
    }
}

/// A table.
#[derive(Debug, Clone)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Explicit grid column widths in twips
    pub column_widths: Option<Vec<u32>>,
    /// Total width in twips, 0 for the page's content width
    pub width: u32,
    pub align: ParagraphAlignment,
    /// Leading rows repeated at the top of every page
    pub repeat_header: usize,
    pub borders: Borders,
    pub style_id: String,
}

impl Table {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self {
            rows,
            column_widths: None,
            width: 0,
            align: ParagraphAlignment::Center,
            repeat_header: 0,
            borders: Borders::default(),
            style_id: "DefaultTable".to_string(),
        }
    }

    pub fn column_widths(mut self, widths: Vec<u32>) -> Self {
        self.column_widths = Some(widths);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn align(mut self, align: ParagraphAlignment) -> Self {
        self.align = align;
        self
    }

    pub fn repeat_header(mut self, rows: usize) -> Self {
        self.repeat_header = rows;
        self
    }

    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// Grid column widths: the explicit list, or one entry per column spanned
    /// by the first row.
    fn grid(&self, width: u32) -> Vec<u32> {
        if let Some(ref widths) = self.column_widths {
            return widths.clone();
        }

        let Some(first_row) = self.rows.first() else {
            return Vec::new();
        };
        let span: u32 = first_row.cells.iter().map(TableCell::span).sum();
        let fallback = if span > 0 { width / span } else { 0 };
        first_row
            .cells
            .iter()
            .flat_map(|cell| {
                std::iter::repeat_n(cell.width.unwrap_or(fallback), cell.span() as usize)
            })
            .collect()
    }

    /// Compute the grid and the placement of every cell.
    pub fn layout(&self, default_width: u32) -> TableLayout {
        let width = if self.width > 0 {
            self.width
        } else {
            default_width
        };
        let grid = self.grid(width);

        // grid column of a merge origin -> continuations still owed
        let mut pending: HashMap<usize, u32> = HashMap::new();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut column = 0usize;
                row.cells
                    .iter()
                    .map(|cell| {
                        let merge = if cell.rowspan > 0 {
                            pending.insert(column, cell.rowspan - 1);
                            Some(VerticalMerge::Restart)
                        } else {
                            match pending.get_mut(&column) {
                                Some(remaining) if *remaining > 0 => {
                                    *remaining -= 1;
                                    Some(VerticalMerge::Continue)
                                },
                                _ => None,
                            }
                        };
                        let placement = CellPlacement {
                            column,
                            span: cell.span(),
                            merge,
                        };
                        column += cell.span() as usize;
                        placement
                    })
                    .collect()
            })
            .collect();

        TableLayout { grid, rows }
    }

    fn jc(&self) -> &'static str {
        match self.align {
            ParagraphAlignment::Center => "center",
            ParagraphAlignment::Right => "right",
            ParagraphAlignment::Left | ParagraphAlignment::Justify => "left",
        }
    }

    pub(crate) fn to_xml(&self, xml: &mut String, session: &mut RenderSession<'_>) -> Result<()> {
        let layout = self.layout(session.ctx().page.content_width());
        let table_width = if self.width > 0 {
            self.width
        } else {
            layout.grid.iter().sum()
        };

        xml.push_str("<w:tbl><w:tblPr>");
        write!(xml, r#"<w:tblStyle w:val="{}"/>"#, escape_xml(&self.style_id))?;
        write!(xml, r#"<w:tblW w:w="{}" w:type="dxa"/>"#, table_width)?;
        write!(xml, r#"<w:jc w:val="{}"/>"#, self.jc())?;
        xml.push_str(r#"<w:tblInd w:w="0" w:type="dxa"/>"#);
        self.borders.to_xml(xml, "tblBorders")?;
        xml.push_str(r#"<w:tblLayout w:type="fixed"/><w:tblLook w:val="0600"/></w:tblPr>"#);

        xml.push_str("<w:tblGrid>");
        for width in &layout.grid {
            write!(xml, r#"<w:gridCol w:w="{}"/>"#, width)?;
        }
        xml.push_str("</w:tblGrid>");

        for (index, (row, placements)) in self.rows.iter().zip(&layout.rows).enumerate() {
            let consumed = layout.consumed(index);
            if consumed != layout.grid.len() {
                log::warn!(
                    "table row {} spans {} grid columns, grid has {}",
                    index,
                    consumed,
                    layout.grid.len()
                );
            }

            xml.push_str("<w:tr>");
            if index < self.repeat_header {
                xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for (cell, placement) in row.cells.iter().zip(placements) {
                cell.to_xml(xml, *placement, session)?;
            }
            xml.push_str("</w:tr>");
        }

        xml.push_str("</w:tbl>");
        Ok(())
    }
}

/// Vertical merge directive of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMerge {
    /// First cell of a vertical merge
    Restart,
    /// Covered by the merge started above
    Continue,
}

/// Where a cell sits on the grid and how it merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    /// First grid column covered
    pub column: usize,
    /// Grid columns covered
    pub span: u32,
    pub merge: Option<VerticalMerge>,
}

/// Result of laying a table out on its grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Grid column widths in twips
    pub grid: Vec<u32>,
    /// Placements per row, parallel to the table's cells
    pub rows: Vec<Vec<CellPlacement>>,
}

impl TableLayout {
    /// Grid columns consumed by a row.
    pub fn consumed(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(|c| c.span as usize).sum())
            .unwrap_or(0)
    }
}
