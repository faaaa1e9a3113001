// Plain text from a Google Docs API `documents.get` response.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsDocument {
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    paragraph: Option<Paragraph>,
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRun {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    #[serde(default)]
    table_rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    #[serde(default)]
    table_cells: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableCell {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

impl DocsDocument {
    /// One line per non-blank paragraph, tables as `a | b | c` rows.
    /// `None` when the body has no text at all.
    pub fn plain_text(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        let mut lines = Vec::new();
        collect_lines(&body.content, &mut lines);

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

fn collect_lines(elements: &[StructuralElement], lines: &mut Vec<String>) {
    for element in elements {
        if let Some(paragraph) = &element.paragraph {
            let text = paragraph_text(paragraph);
            let text = text.trim_end();
            if !text.trim().is_empty() {
                lines.push(text.to_string());
            }
        }

        if let Some(table) = &element.table {
            for row in &table.table_rows {
                let cells: Vec<String> = row.table_cells.iter().map(cell_text).collect();
                if cells.iter().any(|c| !c.is_empty()) {
                    lines.push(cells.join(" | "));
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    paragraph
        .elements
        .iter()
        .filter_map(|e| e.text_run.as_ref()?.content.as_deref())
        .collect()
}

fn cell_text(cell: &TableCell) -> String {
    let mut lines = Vec::new();
    collect_lines(&cell.content, &mut lines);
    lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ")
}
