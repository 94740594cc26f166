use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::rank::{ClassRecord, TopK};
use crate::verify::ArtifactOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub archive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub entries: usize,
    pub total_classes: usize,
    pub total_methods: usize,
    /// Ascending by method count.
    pub top: Vec<ClassRecord>,
}

impl ScanSummary {
    pub fn new(
        archive: &Path,
        entries: usize,
        total_classes: usize,
        total_methods: usize,
        ranked: TopK,
    ) -> Self {
        Self {
            archive: archive.to_string_lossy().to_string(),
            sha256: None,
            entries,
            total_classes,
            total_methods,
            top: ranked.into_ascending(),
        }
    }

    pub fn top_line(&self) -> String {
        let items: Vec<String> = self.top.iter().map(ToString::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}

#[derive(Debug, Serialize)]
struct JsonError {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct JsonOutcome<'a> {
    archive: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a ScanSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

pub fn render_text(outcomes: &[ArtifactOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        match &outcome.result {
            Ok(summary) => {
                out.push_str(&format!(
                    "File {} contains {} entries\n",
                    summary.archive, summary.entries
                ));
                if let Some(sha256) = &summary.sha256 {
                    out.push_str(&format!("SHA-256 {sha256}\n"));
                }
                out.push_str(&format!(
                    "Total classes {} - Total methods {}\n",
                    summary.total_classes, summary.total_methods
                ));
                out.push_str(&format!("Top classes {}\n", summary.top_line()));
            }
            Err(err) => {
                out.push_str(&format!(
                    "File {} FAILED: {err}\n",
                    outcome.archive.display()
                ));
            }
        }
    }
    out
}

pub fn render_json(outcomes: &[ArtifactOutcome]) -> Result<String> {
    let items: Vec<JsonOutcome<'_>> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(summary) => JsonOutcome {
                archive: outcome.archive.to_string_lossy().to_string(),
                status: "ok",
                summary: Some(summary),
                error: None,
            },
            Err(err) => JsonOutcome {
                archive: outcome.archive.to_string_lossy().to_string(),
                status: "failed",
                summary: None,
                error: Some(JsonError {
                    kind: err.kind(),
                    message: err.to_string(),
                }),
            },
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

/// Writes `content` to `output`, or stdout when no file is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
