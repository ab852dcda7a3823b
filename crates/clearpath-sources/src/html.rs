//! HTML table extraction.

use crate::definition::{ColumnLayout, TableStrategy};
use crate::error::{Result, SourceError};
use clearpath_core::EntityMatch;
use scraper::{ElementRef, Html, Selector};

/// Outcome of running one table strategy over a document.
#[derive(Debug, Default)]
pub struct TableScan {
    /// Whether any candidate container was present
    pub container_found: bool,
    /// Rows extracted from the first container that yielded any
    pub matches: Vec<EntityMatch>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    name: usize,
    file_number: Option<usize>,
    status: Option<usize>,
    entity_type: Option<usize>,
    registered: Option<usize>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SourceError::StructuralChange {
        reason: format!("invalid selector '{css}': {e}"),
    })
}

/// Whitespace-collapsed text of an element.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Visible text of a document, without script and style contents.
pub fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

/// Run `strategy` over `document`: candidate containers in order, stopping at
/// the first that yields rows.
pub fn scan_tables(document: &Html, strategy: &TableStrategy) -> Result<TableScan> {
    let rows = selector(&strategy.rows)?;
    let cells = selector(&strategy.cells)?;
    let header_cells = selector(&strategy.header_cells)?;

    let mut scan = TableScan::default();
    for css in &strategy.containers {
        let container_selector = selector(css)?;
        for container in document.select(&container_selector) {
            scan.container_found = true;
            let matches = scan_container(container, strategy, &rows, &cells, &header_cells);
            if !matches.is_empty() {
                scan.matches = matches;
                return Ok(scan);
            }
        }
    }
    Ok(scan)
}

fn scan_container(
    container: ElementRef<'_>,
    strategy: &TableStrategy,
    rows: &Selector,
    cells: &Selector,
    header_cells: &Selector,
) -> Vec<EntityMatch> {
    let mut row_iter = container.select(rows);

    let columns = match &strategy.layout {
        ColumnLayout::Fixed {
            name,
            file_number,
            status,
            entity_type,
            registered,
        } => Columns {
            name: *name,
            file_number: *file_number,
            status: *status,
            entity_type: *entity_type,
            registered: *registered,
        },
        ColumnLayout::Header => {
            let Some(header) = row_iter.next() else {
                return Vec::new();
            };
            let labels: Vec<String> = header
                .select(header_cells)
                .map(|cell| element_text(&cell).to_lowercase())
                .collect();
            infer_columns(&labels)
        }
    };

    let mut matches = Vec::new();
    for row in row_iter {
        let texts: Vec<String> = row.select(cells).map(|cell| element_text(&cell)).collect();
        if texts.is_empty() || texts.len() < strategy.min_cells {
            continue;
        }
        if is_header_row(&texts, &strategy.header_labels) {
            continue;
        }

        let cell = |index: Option<usize>| {
            index
                .and_then(|i| texts.get(i))
                .cloned()
                .unwrap_or_default()
        };
        let name = cell(Some(columns.name));
        if name.is_empty() {
            continue;
        }
        let status = cell(columns.status);

        matches.push(EntityMatch {
            name,
            entity_type: cell(columns.entity_type),
            status: if status.is_empty() {
                "unknown".to_string()
            } else {
                status
            },
            file_number: cell(columns.file_number),
            registered_date: cell(columns.registered),
        });
    }
    matches
}

fn is_header_row(texts: &[String], header_labels: &[String]) -> bool {
    texts
        .iter()
        .any(|text| header_labels.iter().any(|label| label.eq_ignore_ascii_case(text)))
}

/// Map lowercase header labels to match fields; the name column defaults to 0.
fn infer_columns(labels: &[String]) -> Columns {
    let mut name = None;
    let mut columns = Columns::default();

    for (i, label) in labels.iter().enumerate() {
        let has = |keys: &[&str]| keys.iter().any(|k| label.contains(k));
        if has(&["business name", "entity name", "name"]) {
            name.get_or_insert(i);
        } else if has(&["entity id", "entity number", "file", "id"]) {
            columns.file_number.get_or_insert(i);
        } else if has(&["type"]) {
            columns.entity_type.get_or_insert(i);
        } else if has(&["status"]) {
            columns.status.get_or_insert(i);
        } else if has(&["date", "incorporated", "formed", "registered"]) {
            columns.registered.get_or_insert(i);
        }
    }

    columns.name = name.unwrap_or(0);
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(layout: ColumnLayout) -> TableStrategy {
        TableStrategy {
            containers: vec!["#missing".to_string(), "table.results".to_string()],
            rows: "tr".to_string(),
            cells: "td".to_string(),
            header_cells: "th, td".to_string(),
            layout,
            min_cells: 1,
            header_labels: vec![],
        }
    }

    #[test]
    fn test_fixed_layout_skips_header_labels() {
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><td>FILE NUMBER</td><td>ENTITY NAME</td></tr>
                <tr><td>1234567</td><td>  ACME   VENTURES LLC </td></tr>
                <tr><td>7654321</td><td>ACME HOLDINGS INC</td></tr>
                <tr><td>only-one-cell</td></tr>
            </table>"#,
        );
        let mut strategy = strategy(ColumnLayout::Fixed {
            name: 1,
            file_number: Some(0),
            status: None,
            entity_type: None,
            registered: None,
        });
        strategy.min_cells = 2;
        strategy.header_labels = vec!["entity name".to_string()];

        let scan = scan_tables(&html, &strategy).expect("scan");
        assert!(scan.container_found);
        assert_eq!(scan.matches.len(), 2);
        assert_eq!(scan.matches[0].name, "ACME VENTURES LLC");
        assert_eq!(scan.matches[0].file_number, "1234567");
        assert_eq!(scan.matches[0].status, "unknown");
    }

    #[test]
    fn test_header_layout_infers_columns() {
        let html = Html::parse_document(
            r#"<table class="results">
                <tr><th>Business Name</th><th>Entity ID</th><th>Business Type</th><th>Status</th><th>Date Incorporated</th></tr>
                <tr><td>Acme Ventures LLC</td><td>0450001234</td><td>LLC</td><td>Active</td><td>01/02/2020</td></tr>
            </table>"#,
        );
        let scan = scan_tables(&html, &strategy(ColumnLayout::Header)).expect("scan");
        assert_eq!(scan.matches.len(), 1);
        let m = &scan.matches[0];
        assert_eq!(m.name, "Acme Ventures LLC");
        assert_eq!(m.file_number, "0450001234");
        assert_eq!(m.entity_type, "LLC");
        assert_eq!(m.status, "Active");
        assert_eq!(m.registered_date, "01/02/2020");
    }

    #[test]
    fn test_empty_container_is_reported() {
        let html = Html::parse_document(
            r#"<table class="results"><thead><tr><th>Name</th></tr></thead><tbody></tbody></table>"#,
        );
        let scan = scan_tables(&html, &strategy(ColumnLayout::Header)).expect("scan");
        assert!(scan.container_found);
        assert!(scan.matches.is_empty());
    }

    #[test]
    fn test_missing_container() {
        let html = Html::parse_document("<p>nothing here</p>");
        let scan = scan_tables(&html, &strategy(ColumnLayout::Header)).expect("scan");
        assert!(!scan.container_found);
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = Html::parse_document(
            "<html><head><script>var noResults = 'no records';</script></head>\
             <body><h1>Search</h1><p>Acme   found</p></body></html>",
        );
        assert_eq!(visible_text(&html), "Search Acme found");
    }

    #[test]
    fn test_infer_columns_defaults_name_to_first() {
        let columns = infer_columns(&["document".to_string(), "status".to_string()]);
        assert_eq!(columns.name, 0);
        assert_eq!(columns.status, Some(1));
    }
}
