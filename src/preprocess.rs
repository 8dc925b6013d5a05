//! Raw collector table → token-list table.

use crate::config::PreprocessConfig;
use crate::dataset::{self, MessageRow, RowWriter};
use crate::error::DatasetError;
use crate::normalize::{Normalizer, tokenize};

/// Counts from one preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreprocessSummary {
    pub rows: usize,
    /// Rows left with at least one token.
    pub with_tokens: usize,
}

/// Normalize and tokenize one row's message. Rows that end up with no
/// tokens get an empty `Message` cell.
pub fn preprocess_row(row: &MessageRow, normalizer: Normalizer) -> MessageRow {
    let tokens = row
        .message
        .as_deref()
        .map(|text| tokenize(&normalizer.apply(text)))
        .unwrap_or_default();

    MessageRow {
        message: (!tokens.is_empty()).then(|| dataset::format_token_list(&tokens)),
        ..row.clone()
    }
}

/// Read the raw table, rewrite every message as a token list and write
/// the result.
pub fn run(config: &PreprocessConfig) -> Result<PreprocessSummary, DatasetError> {
    let rows = dataset::read_rows(&config.input_path)?;
    let mut writer = RowWriter::create(&config.output_path)?;
    let mut summary = PreprocessSummary::default();

    for row in &rows {
        let cleaned = preprocess_row(row, config.normalizer);
        summary.rows += 1;
        if cleaned.message.is_some() {
            summary.with_tokens += 1;
        }
        writer.write_row(&cleaned)?;
    }
    writer.finish()?;

    tracing::info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        normalizer = %config.normalizer,
        rows = summary.rows,
        with_tokens = summary.with_tokens,
        "Preprocessed messages"
    );
    Ok(summary)
}
