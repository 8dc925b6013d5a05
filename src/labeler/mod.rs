//! Interactive token labeling.
//!
//! The labeler walks the per-channel sample, asks a [`DecisionSource`] for
//! one label per token and checkpoints completed messages to a
//! tag-per-line file:
//!
//! ```text
//! Price   B-PRICE
//! 300     O
//! birr    I-PRICE
//!
//! ```
//!
//! Skipping a message drops it entirely. Quitting saves everything
//! completed so far and stops the whole run.

pub mod console;
pub mod decision;
pub mod machine;
pub mod session;

pub use console::ConsoleDecisions;
pub use decision::{Decision, DecisionParser, DecisionSource, ScriptedDecisions, TokenPrompt};
pub use machine::{LabelState, LabeledExample, MessageLabeling, MessageOutcome};
pub use session::LabelingSession;

use crate::config::LabelerConfig;
use crate::dataset::{self, MessageRow};
use crate::error::{LabelerError, Result};
use crate::sampler::Sampler;

/// Validate `config`, load its input table and run one labeling session.
pub fn label_file(
    config: &LabelerConfig,
    source: &mut dyn DecisionSource,
) -> Result<SessionSummary> {
    config.validate()?;
    let rows = dataset::read_rows(&config.input_path)?;
    tracing::info!(
        input = %config.input_path.display(),
        rows = rows.len(),
        per_channel = config.per_channel_limit,
        "Loaded messages for labeling"
    );
    Ok(Labeler::new(config).run(&rows, source)?)
}

/// Outcome of a labeling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub completed: usize,
    pub skipped: usize,
    /// Sampled rows whose token list could not be parsed.
    pub unparsable: usize,
    /// The operator quit before the sample was exhausted.
    pub terminated_early: bool,
}

/// Drives a labeling run over a message table.
pub struct Labeler {
    sampler: Sampler,
    session: LabelingSession,
}

impl Labeler {
    pub fn new(config: &LabelerConfig) -> Self {
        Self {
            sampler: Sampler::new(config.per_channel_limit, config.seed),
            session: LabelingSession::new(&config.output_path, config.checkpoint_every),
        }
    }

    pub fn session(&self) -> &LabelingSession {
        &self.session
    }

    /// Label the sample drawn from `rows`, asking `source` for decisions.
    ///
    /// The output file is rewritten every `checkpoint_every` completions,
    /// on quit, and once more when the sample is exhausted. Write failures
    /// are returned immediately.
    pub fn run(
        &mut self,
        rows: &[MessageRow],
        source: &mut dyn DecisionSource,
    ) -> std::result::Result<SessionSummary, LabelerError> {
        let mut summary = SessionSummary::default();

        for (channel, row) in self.sampler.sample(rows) {
            let tokens = match row.tokens() {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::warn!(channel, id = row.message_id, "Skipping row: {e}");
                    summary.unparsable += 1;
                    continue;
                }
            };

            if !tokens.is_empty() {
                source.show_message(channel, &tokens);
            }

            let total = tokens.len();
            let outcome = MessageLabeling::new(tokens).drive(|index, token| {
                source.next_decision(&TokenPrompt {
                    channel,
                    token,
                    index,
                    total,
                })
            });
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Keep what is already done before giving up.
                    self.session.flush()?;
                    return Err(e);
                }
            };

            match outcome {
                MessageOutcome::Complete(example) => {
                    if self.session.record(example)? {
                        source.notify(&format!(
                            "Auto-saved progress after {} messages.",
                            self.session.completed()
                        ));
                    }
                }
                MessageOutcome::Skipped => {
                    self.session.record_skip();
                    source.notify("Skipping message...");
                }
                MessageOutcome::Terminated => {
                    source.notify("Exiting and saving progress...");
                    self.session.flush()?;
                    source.notify(&format!(
                        "Labeled data saved to {}",
                        self.session.output().display()
                    ));
                    summary.terminated_early = true;
                    return Ok(self.finish(summary));
                }
            }
        }

        self.session.flush()?;
        source.notify(&format!(
            "Saved labeled data to {}",
            self.session.output().display()
        ));
        Ok(self.finish(summary))
    }

    fn finish(&self, mut summary: SessionSummary) -> SessionSummary {
        summary.completed = self.session.completed();
        summary.skipped = self.session.skipped();
        tracing::info!(
            completed = summary.completed,
            skipped = summary.skipped,
            unparsable = summary.unparsable,
            terminated_early = summary.terminated_early,
            "Labeling session finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn row(channel: &str, id: i64, tokens: &[&str]) -> MessageRow {
        MessageRow {
            channel_title: channel.to_uppercase(),
            channel_username: channel.to_string(),
            message_id: id,
            message: Some(crate::dataset::format_token_list(tokens)),
            date: "2024-05-01T10:00:00+00:00".into(),
            media_path: None,
        }
    }

    fn config(output: &Path, limit: usize, every: usize) -> LabelerConfig {
        LabelerConfig {
            output_path: output.to_path_buf(),
            per_channel_limit: limit,
            checkpoint_every: every,
            ..Default::default()
        }
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn worked_example_price_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("labels.txt");
        let rows = vec![row("@shop", 1, &["Price", "300", "birr"])];

        let mut labeler = Labeler::new(&config(&out, 1, 5));
        let mut source = ScriptedDecisions::new(["5", "0", "6"]);
        let summary = labeler.run(&rows, &mut source).unwrap();

        assert_eq!(summary.completed, 1);
        assert!(!summary.terminated_early);
        assert_eq!(read(&out), "Price\tB-PRICE\n300\tO\nbirr\tI-PRICE\n\n");
    }

    #[test]
    fn skipped_message_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("labels.txt");
        let rows = vec![row("@shop", 1, &["a", "b"]), row("@shop", 2, &["c"])];

        let mut labeler = Labeler::new(&config(&out, 2, 1));
        // Skip whichever message comes first, label the other.
        let first_len = Sampler::new(2, 42)
            .sample(&rows)
            .next()
            .map(|(_, r)| r.tokens().unwrap().len())
            .unwrap();
        let mut inputs = vec!["1"; first_len - 1];
        inputs.push("n");
        inputs.extend(vec!["0"; 3 - first_len]);

        let summary = labeler
            .run(&rows, &mut ScriptedDecisions::new(inputs))
            .unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.skipped, 1);

        let text = read(&out);
        assert_eq!(text.matches("\n\n").count(), 1);
        assert!(!text.contains("B-Product"));
    }

    #[test]
    fn unparsable_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("labels.txt");
        let mut bad = row("@shop", 2, &[]);
        bad.message = Some("not a list".into());
        let rows = vec![row("@shop", 1, &["ok"]), bad];

        let mut labeler = Labeler::new(&config(&out, 2, 5));
        let summary = labeler
            .run(&rows, &mut ScriptedDecisions::new(["0"]))
            .unwrap();
        assert_eq!(summary.unparsable, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(read(&out), "ok\tO\n\n");
    }

    #[test]
    fn empty_token_list_counts_as_skip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("labels.txt");
        let rows = vec![row("@shop", 1, &[])];

        let mut labeler = Labeler::new(&config(&out, 1, 5));
        let mut source = ScriptedDecisions::new(Vec::<String>::new());
        let summary = labeler.run(&rows, &mut source).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(source.prompted(), 0);
        assert_eq!(read(&out), "");
    }

    #[test]
    fn quit_flushes_and_stops_everything() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("labels.txt");
        let rows = vec![
            row("@a", 1, &["x", "y"]),
            row("@b", 2, &["z"]),
        ];

        let mut labeler = Labeler::new(&config(&out, 1, 5));
        let mut source = ScriptedDecisions::new(["0", "0", "q", "0"]);
        let summary = labeler.run(&rows, &mut source).unwrap();

        assert!(summary.terminated_early);
        assert_eq!(summary.completed, 1);
        assert_eq!(source.remaining(), 1);
        assert_eq!(read(&out), "x\tO\ny\tO\n\n");
    }

    #[test]
    fn no_eligible_channels_still_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/labels.txt");
        let rows = vec![row("@a", 1, &["x"])];

        let mut labeler = Labeler::new(&config(&out, 10, 5));
        let summary = labeler
            .run(&rows, &mut ScriptedDecisions::new(["0"]))
            .unwrap();
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(read(&out), "");
    }
}
