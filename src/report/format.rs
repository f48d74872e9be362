//! Formatted terminal output for predictions and the parameter table.
//!
//! We keep formatting code in one place so the request pipeline stays free of
//! presentation concerns and output changes are localized.

use crate::domain::{ParameterField, ParameterSet, Prediction, SourceMode, Submission};
use crate::error::{AppError, EXIT_IO};
use crate::inference::PayloadSchema;

/// Format the text report for one submission.
pub fn format_submission(submission: &Submission, show_attempts: bool) -> String {
    let p = &submission.prediction;
    let mut out = String::new();

    out.push_str("=== exo - Transit Classification ===\n");
    if p.source_mode == SourceMode::Synthetic {
        out.push_str("!!! SYNTHETIC PLACEHOLDER - not a model prediction !!!\n");
        if let Some(note) = &p.note {
            out.push_str(&format!("Note: {note}\n"));
        }
    }
    out.push('\n');

    out.push_str(&format!("Prediction:  {}\n", p.predicted_label.display_name()));
    out.push_str(&format!("Probability: {}\n", fmt_pct(p.probability)));
    out.push_str(&format!("Confidence:  {}\n", fmt_pct(p.confidence)));
    out.push_str(&format!("Model:       {}\n", p.model_version));
    out.push_str(&format!("Source:      {}\n", fmt_source(p)));
    if let Some(label) = p.remote_label() {
        out.push_str(&format!("Service label: {label}\n"));
    }
    out.push_str(&format!("Completed:   {}\n", p.timestamp.to_rfc3339()));

    out.push_str("\nInput:\n");
    for (key, value) in p.input.entries() {
        out.push_str(&format!("  {key:<16} {value}\n"));
    }

    if show_attempts {
        out.push_str("\nAttempts:\n");
        if submission.attempts.is_empty() {
            out.push_str("  (none)\n");
        }
        for (idx, a) in submission.attempts.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {:<12} {:>6} ms  {}\n",
                idx + 1,
                a.strategy,
                a.elapsed_ms,
                a.outcome.summary()
            ));
        }
    }

    out
}

/// Pretty JSON for the whole submission (prediction + attempts).
pub fn format_submission_json(submission: &Submission) -> Result<String, AppError> {
    serde_json::to_string_pretty(submission)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to encode result JSON: {e}")))
}

/// Format the parameter table: label, range, unit, value, wire key.
pub fn format_parameters(params: &ParameterSet, schema: &PayloadSchema) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<22} {:>18} {:<8} {:>10} {:<16}\n",
            "parameter", "range", "unit", "default", "wire key"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<22} {:-<18} {:-<8} {:-<10} {:-<16}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for field in ParameterField::ALL {
        let (lo, hi) = field.range();
        out.push_str(
            format!(
                "{:<22} {:>18} {:<8} {:>10} {:<16}\n",
                field.label(),
                format!("{lo} - {hi}"),
                field.unit(),
                params.get(field),
                schema.key(field),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

fn fmt_source(p: &Prediction) -> &'static str {
    match p.source_mode {
        SourceMode::Remote => "remote service",
        SourceMode::Synthetic => "local fallback",
    }
}
