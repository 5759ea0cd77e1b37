//! Read-only renderings of one list for people and spreadsheets.

use crate::model::item::{Item, ItemStatus};
use crate::store::{self, StoreResult};
use log::info;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format `{other}`; expected md|csv")),
        }
    }
}

const CSV_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "status",
    "priority",
    "tags",
    "project",
    "due",
    "body",
    "notes",
    "created_at",
    "updated_at",
];

fn md_escape(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Markdown grouped by status (open, pinned, done, archived), oldest first
/// within each group.
pub fn render_markdown(title: &str, items: &[Item]) -> String {
    let mut out = format!("# {title}\n\n<!-- Generated MD view of JSONL -->\n\n");
    if items.is_empty() {
        out.push_str("No items.\n\n");
        return out;
    }
    for status in ItemStatus::ALL {
        let mut group: Vec<&Item> = items.iter().filter(|item| item.status == status).collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out.push_str(&format!("## {}\n\n", capitalize(status.as_str())));
        for item in group {
            out.push_str(&format!("### {}\n\n", md_escape(&item.title)));
            out.push_str(&format!("**ID:** {}\n\n", item.id));
            out.push_str(&format!("**Created:** {}\n\n", item.created_at));
            if item.updated_at != item.created_at {
                out.push_str(&format!("**Updated:** {}\n\n", item.updated_at));
            }
            if let Some(priority) = item.priority {
                out.push_str(&format!("**Priority:** {priority}\n\n"));
            }
            if !item.tags.is_empty() {
                out.push_str(&format!("**Tags:** {}\n\n", item.tags.join(", ")));
            }
            if let Some(project) = &item.project {
                out.push_str(&format!("**Project:** {project}\n\n"));
            }
            if let Some(due) = &item.due {
                out.push_str(&format!("**Due:** {due}\n\n"));
            }
            if let Some(body) = &item.body {
                out.push_str(&format!("**Body:**\n\n{body}\n\n"));
            }
            if let Some(notes) = &item.notes {
                out.push_str(&format!("**Notes:** {notes}\n\n"));
            }
            out.push_str("---\n\n");
        }
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV with a header row; rows end in CRLF. An empty list yields only the
/// header.
pub fn render_csv(items: &[Item]) -> String {
    let mut out = CSV_COLUMNS.join(",");
    out.push_str("\r\n");
    for item in items {
        let tags = item.tags.join(", ");
        let priority = item.priority.map(|p| p.as_str()).unwrap_or_default();
        let id = item.id.to_string();
        let row = [
            id.as_str(),
            item.title.as_str(),
            item.status.as_str(),
            priority,
            tags.as_str(),
            item.project.as_deref().unwrap_or_default(),
            item.due.as_deref().unwrap_or_default(),
            item.body.as_deref().unwrap_or_default(),
            item.notes.as_deref().unwrap_or_default(),
            item.created_at.as_str(),
            item.updated_at.as_str(),
        ];
        let encoded: Vec<String> = row.iter().map(|value| csv_field(value)).collect();
        out.push_str(&encoded.join(","));
        out.push_str("\r\n");
    }
    out
}

pub fn render(format: ExportFormat, title: &str, items: &[Item]) -> String {
    match format {
        ExportFormat::Markdown => render_markdown(title, items),
        ExportFormat::Csv => render_csv(items),
    }
}

/// Renders and atomically writes the export to `output`.
pub fn export_to(
    format: ExportFormat,
    title: &str,
    items: &[Item],
    output: &Path,
) -> StoreResult<()> {
    let rendered = render(format, title, items);
    store::atomic_write(output, rendered.as_bytes())?;
    info!(
        "event=list_export module=export status=ok format={:?} item_count={} path={}",
        format,
        items.len(),
        output.display()
    );
    Ok(())
}
