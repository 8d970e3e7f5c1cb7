//! Assessment report formatting
//!
//! Renders the assessment namespace of a session in three shapes: a console
//! summary with a row-per-pair table, CSV rows for spreadsheets, and the
//! full JSON record.

use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use lexiquest_domain::{AssessedItem, AssessmentState, EvaluatedAnswer};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// CSV header, one column per [`ReportRow`] field.
pub const CSV_HEADER: &str =
    "item,triplet,pair,justification,pair_valid,justification_valid,score,error_category,reasoning";

/// One evaluated pairing of one assessed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// 1-based position in the assessment history.
    pub item: usize,
    pub triplet: String,
    /// `word-word`, empty when no pairing was given for the slot.
    pub pair: String,
    pub justification: String,
    pub pair_valid: bool,
    pub justification_valid: bool,
    pub score: u32,
    pub error_category: String,
    pub reasoning: String,
}

impl ReportRow {
    fn new(index: usize, assessed: &AssessedItem, answer: &EvaluatedAnswer) -> Self {
        let (pair, justification) = match &answer.evaluated_pairing {
            Some(pairing) => (pairing.words.join("-"), pairing.justification.clone()),
            None => (String::new(), String::new()),
        };
        Self {
            item: index + 1,
            triplet: assessed.item.label(),
            pair,
            justification,
            pair_valid: answer.pair_is_valid,
            justification_valid: answer.justification_is_valid,
            score: answer.score.value(),
            error_category: answer.error_category.to_string(),
            reasoning: answer.reasoning.clone(),
        }
    }

    fn csv_fields(&self) -> [String; 9] {
        [
            self.item.to_string(),
            self.triplet.clone(),
            self.pair.clone(),
            self.justification.clone(),
            self.pair_valid.to_string(),
            self.justification_valid.to_string(),
            self.score.to_string(),
            self.error_category.clone(),
            self.reasoning.clone(),
        ]
    }
}

/// Export file format, picked from the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// JSON for a `.json` extension, CSV for anything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Report over one session's assessment state
pub struct AssessmentReport<'a> {
    assessment: &'a AssessmentState,
}

impl<'a> AssessmentReport<'a> {
    pub fn new(assessment: &'a AssessmentState) -> Self {
        Self { assessment }
    }

    /// Flatten the history into one row per evaluated pairing.
    ///
    /// An item without any verdict still gets a row so it is visible in
    /// the export.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows = Vec::new();
        for (index, assessed) in self.assessment.assessment_history.iter().enumerate() {
            if assessed.evaluation.evaluations.is_empty() {
                rows.push(ReportRow::new(index, assessed, &EvaluatedAnswer::missing()));
                continue;
            }
            rows.extend(
                assessed
                    .evaluation
                    .evaluations
                    .iter()
                    .map(|answer| ReportRow::new(index, assessed, answer)),
            );
        }
        rows
    }

    /// Console summary of the running totals and stopping flags.
    pub fn summary(&self) -> String {
        let summary = &self.assessment.score_summary;
        let flag = |on: bool| if on { "yes".yellow() } else { "no".normal() };

        let mut output = String::new();
        output.push_str(&format!("{}\n", "=== Assessment Summary ===".cyan().bold()));
        output.push_str(&format!("{} {}\n", "Items assessed:".bold(), summary.total_items));
        output.push_str(&format!("{} {}\n", "Total score:".bold(), summary.total_score));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Normalized average:".bold(),
            summary.normalized_average
        ));
        output.push_str(&format!("{} {}\n", "Basal:".bold(), flag(self.assessment.basal)));
        output.push_str(&format!("{} {}\n", "Ceiling:".bold(), flag(self.assessment.ceiling)));
        output
    }

    /// Row-per-pair table for the console.
    pub fn table(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("Triplet").fg(Color::Cyan),
            Cell::new("Pair").fg(Color::Cyan),
            Cell::new("Justification").fg(Color::Cyan),
            Cell::new("Score").fg(Color::Cyan),
            Cell::new("Error").fg(Color::Cyan),
        ]);

        for row in self.rows() {
            let score = if row.score > 0 {
                Cell::new(row.score).fg(Color::Green)
            } else {
                Cell::new(row.score).fg(Color::Red)
            };
            table.add_row(vec![
                Cell::new(row.item),
                Cell::new(&row.triplet),
                Cell::new(&row.pair),
                Cell::new(&row.justification),
                score,
                Cell::new(&row.error_category),
            ]);
        }

        table.to_string()
    }

    /// Summary followed by the table, or a note when nothing was assessed.
    pub fn render(&self) -> String {
        if self.assessment.assessment_history.is_empty() {
            return format!("{}\n", "No challenges have been assessed yet.".dimmed());
        }
        format!("{}\n{}\n", self.summary(), self.table())
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from(CSV_HEADER);
        output.push('\n');
        for row in self.rows() {
            let line = row
                .csv_fields()
                .iter()
                .map(|field| csv_escape(field))
                .collect::<Vec<_>>()
                .join(",");
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&json!({
            "score_summary": self.assessment.score_summary,
            "basal": self.assessment.basal,
            "ceiling": self.assessment.ceiling,
            "item_total_scores": self.assessment.item_total_scores,
            "assessment_history": self.assessment.assessment_history,
        }))
    }

    /// Write the report to `path` in the format its extension asks for.
    pub fn export(&self, path: &Path) -> std::io::Result<ExportFormat> {
        let format = ExportFormat::from_path(path);
        let content = match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Json => self.to_json().map_err(std::io::Error::other)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(format)
    }
}

/// Quote a field when it holds a delimiter, a quote or a line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
