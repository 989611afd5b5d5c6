use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Rectangular grid of normalized cell strings taken from one table.
///
/// Rows whose cells are all empty are dropped; ragged rows are right-padded
/// with empty cells to the widest row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMatrix {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl TableMatrix {
    /// Builds a matrix from raw cell texts, normalizing each cell.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| normalize_cell(cell.as_ref()))
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();
        let width = kept.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut kept {
            row.resize(width, String::new());
        }
        Self { rows: kept, width }
    }

    pub fn from_table(table: ElementRef<'_>) -> Self {
        let (Some(row_sel), Some(cell_sel)) = (selector("tr"), selector("th, td")) else {
            return Self::default();
        };
        Self::from_rows(
            table
                .select(&row_sel)
                .map(|tr| tr.select(&cell_sel).map(rendered_text).collect::<Vec<_>>()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First row becomes the header, even for tables without a real header row.
    pub fn to_markdown(&self) -> String {
        let Some((header, body)) = self.rows.split_first() else {
            return String::new();
        };
        let separator = vec!["---".to_string(); self.width];
        std::iter::once(header)
            .chain(std::iter::once(&separator))
            .chain(body)
            .map(|row| format!("| {} |", row.join(" | ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of converting every table on a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableExtraction {
    pub markdown: String,
    pub tables_found: usize,
    pub tables_with_data: usize,
}

pub fn table_to_markdown(table: ElementRef<'_>) -> String {
    TableMatrix::from_table(table).to_markdown()
}

/// Converts every table in document order, drops empty ones and joins the rest
/// with a blank line.
pub fn extract_all_tables(document: &Html) -> String {
    extract_from_document(document).markdown
}

/// Parses a serialized DOM snapshot and extracts all of its tables.
pub fn extract_tables(html: &str) -> TableExtraction {
    extract_from_document(&Html::parse_document(html))
}

fn extract_from_document(document: &Html) -> TableExtraction {
    let Some(table_sel) = selector("table") else {
        return TableExtraction::default();
    };
    let mut tables_found = 0;
    let parts: Vec<String> = document
        .select(&table_sel)
        .inspect(|_| tables_found += 1)
        .map(table_to_markdown)
        .filter(|md| !md.is_empty())
        .collect();
    TableExtraction {
        tables_with_data: parts.len(),
        markdown: parts.join("\n\n"),
        tables_found,
    }
}

/// Collapses whitespace runs, trims, and escapes pipes so cells cannot split columns.
pub fn normalize_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Approximates the browser's rendered text: block boundaries and `<br>` count
/// as whitespace, script and style content is skipped.
pub(crate) fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let tag = element.name();
                if matches!(tag, "script" | "style" | "template" | "noscript") {
                    continue;
                }
                if tag == "br" {
                    out.push(' ');
                    continue;
                }
                let block = is_block(tag);
                if block {
                    out.push(' ');
                }
                collect_text(child, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "section" | "article" | "header" | "footer" | "li" | "ul" | "ol" | "tr"
            | "td" | "th" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
    )
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}
