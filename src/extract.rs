// src/extract.rs

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

/// Separates sub-values (e.g. several players) inside one cell on the site.
pub const BULLET: char = '•';

/// Replaces the bullet in extracted fields.
pub const SUB_VALUE_SEPARATOR: &str = "|";

/// Rows of the results table; the first one is the header. The class
/// attribute must be exactly `datatable center`.
const TABLE_ROWS_CSS: &str = r#"table[class="datatable center"] tr"#;

/// Transaction rows are the ones flagged left-aligned.
const TRANSACTION_ROWS_CSS: &str = r#"table[class="datatable center"] tr[align="left"]"#;

const CELL_CSS: &str = "td";

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {:?}", css, e))
}

/// Parsed selectors for the transactions results table.
#[derive(Clone, Debug)]
pub struct TableSelectors {
    rows: Selector,
    transactions: Selector,
    cells: Selector,
}

impl TableSelectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rows: parse_selector(TABLE_ROWS_CSS)?,
            transactions: parse_selector(TRANSACTION_ROWS_CSS)?,
            cells: parse_selector(CELL_CSS)?,
        })
    }

    /// Column names from the first row of the results table.
    #[instrument(level = "debug", skip_all)]
    pub fn extract_header(&self, doc: &Html) -> Result<Vec<String>> {
        let header = doc
            .select(&self.rows)
            .next()
            .context("results table has no header row")?;

        let names: Vec<String> = header
            .select(&self.cells)
            .map(|cell| cell_text(cell).trim().to_string())
            .collect();
        debug!(columns = ?names, "header extracted");
        Ok(names)
    }

    /// Every transaction row, in document order. No match is an empty result.
    #[instrument(level = "debug", skip_all)]
    pub fn extract_rows(&self, doc: &Html) -> Vec<Vec<String>> {
        let rows: Vec<Vec<String>> = doc
            .select(&self.transactions)
            .map(|row| {
                row.select(&self.cells)
                    .map(|cell| normalize_cell(&cell_text(cell)))
                    .collect()
            })
            .collect();
        trace!(count = rows.len(), "transaction rows extracted");
        rows
    }
}

/// Parse a response body into a document tree.
pub fn parse_page(html: &str) -> Html {
    Html::parse_document(html)
}

/// Text content of a cell. Entities are already decoded by the parser.
fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>()
}

/// Trim a cell and flatten its bullet-separated sub-values: `"A • B • C"` → `"A|B|C"`.
///
/// Empty fragments are dropped before trimming, so a whitespace-only fragment
/// between two bullets still leaves an empty sub-value.
pub fn normalize_cell(text: &str) -> String {
    text.trim()
        .split(BULLET)
        .filter(|s| !s.is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(SUB_VALUE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="datatable center">
            <tr><td>Date</td><td>Team</td><td>Acquired</td><td>Relinquished</td><td>Notes</td></tr>
            <tr align="left">
                <td>2024-01-01</td>
                <td>Lakers</td>
                <td> &bull; J. Doe</td>
                <td></td>
                <td>signed free agent</td>
            </tr>
            <tr align="left">
                <td>2024-01-02</td>
                <td>Knicks &amp; Nets</td>
                <td>&bull; A. Smith &bull; B. Jones</td>
                <td>&bull; C. Brown</td>
                <td>trade with <a href="/x">Celtics</a></td>
            </tr>
            <tr><td colspan="5">page 1 of 3</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn normalizes_bullet_separated_values() {
        assert_eq!(normalize_cell("A • B • C"), "A|B|C");
        assert_eq!(normalize_cell("  • J. Doe "), "J. Doe");
        assert_eq!(normalize_cell("plain"), "plain");
        assert_eq!(normalize_cell(""), "");
        assert_eq!(normalize_cell("A •• B"), "A|B");
        assert_eq!(normalize_cell("A • \u{a0} • B"), "A||B");
    }

    #[test]
    fn extracts_header_cells() -> Result<()> {
        let sel = TableSelectors::new()?;
        let doc = parse_page(PAGE);
        assert_eq!(
            sel.extract_header(&doc)?,
            vec!["Date", "Team", "Acquired", "Relinquished", "Notes"]
        );
        Ok(())
    }

    #[test]
    fn missing_table_has_no_header() -> Result<()> {
        let sel = TableSelectors::new()?;
        let doc = parse_page("<html><body><p>maintenance</p></body></html>");
        assert!(sel.extract_header(&doc).is_err());
        Ok(())
    }

    #[test]
    fn extracts_only_left_aligned_rows_in_order() -> Result<()> {
        let sel = TableSelectors::new()?;
        let rows = sel.extract_rows(&parse_page(PAGE));

        assert_eq!(
            rows,
            vec![
                vec!["2024-01-01", "Lakers", "J. Doe", "", "signed free agent"],
                vec![
                    "2024-01-02",
                    "Knicks & Nets",
                    "A. Smith|B. Jones",
                    "C. Brown",
                    "trade with Celtics"
                ],
            ]
        );
        Ok(())
    }

    #[test]
    fn no_matching_rows_is_empty() -> Result<()> {
        let sel = TableSelectors::new()?;
        let doc = parse_page(r#"<table class="datatable center"><tr><td>Date</td></tr></table>"#);
        assert!(sel.extract_rows(&doc).is_empty());
        assert!(sel.extract_rows(&parse_page("")).is_empty());
        Ok(())
    }

    #[test]
    fn requires_exact_table_class() -> Result<()> {
        let sel = TableSelectors::new()?;
        let doc = parse_page(
            r#"<table class="datatable center wide"><tr><td>Other</td></tr>
               <tr align="left"><td>ignored</td></tr></table>
               <table class="datatable center"><tr><td>Date</td></tr>
               <tr align="left"><td>2024-03-01</td></tr></table>"#,
        );
        assert_eq!(sel.extract_header(&doc)?, vec!["Date"]);
        assert_eq!(sel.extract_rows(&doc), vec![vec!["2024-03-01"]]);
        Ok(())
    }

    #[test]
    fn ignores_rows_of_other_tables() -> Result<()> {
        let sel = TableSelectors::new()?;
        let doc = parse_page(
            r#"<table class="nav"><tr align="left"><td>Home</td></tr></table>
               <table class="datatable center"><tr><td>Date</td></tr>
               <tr align="left"><td>2024-02-01</td></tr></table>"#,
        );
        assert_eq!(sel.extract_rows(&doc), vec![vec!["2024-02-01"]]);
        Ok(())
    }
}
