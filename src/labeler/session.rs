//! In-memory accumulator of labeled examples with periodic checkpoints.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LabelerError;
use crate::labeler::machine::LabeledExample;

/// Completed examples for one labeling run, checkpointed every
/// `checkpoint_every` completions.
///
/// Every flush rewrites the whole output file from the accumulator, so
/// the file always holds exactly the examples completed so far.
#[derive(Debug)]
pub struct LabelingSession {
    output: PathBuf,
    checkpoint_every: usize,
    examples: Vec<LabeledExample>,
    skipped: usize,
    flushes: usize,
}

impl LabelingSession {
    pub fn new(output: impl Into<PathBuf>, checkpoint_every: usize) -> Self {
        Self {
            output: output.into(),
            checkpoint_every: checkpoint_every.max(1),
            examples: Vec::new(),
            skipped: 0,
            flushes: 0,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Messages completed so far.
    pub fn completed(&self) -> usize {
        self.examples.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of times the output file has been written.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Add a completed example. Returns `true` when this completion hit a
    /// checkpoint and the file was rewritten.
    pub fn record(&mut self, example: LabeledExample) -> Result<bool, LabelerError> {
        self.examples.push(example);
        if self.completed() % self.checkpoint_every == 0 {
            self.flush()?;
            tracing::info!(completed = self.completed(), "Auto-saved progress");
            return Ok(true);
        }
        Ok(false)
    }

    /// Count a skipped message. Nothing is added to the accumulator.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Render the whole accumulator in tag-per-line form.
    pub fn render(&self) -> String {
        self.examples.iter().map(LabeledExample::to_conll).collect()
    }

    /// Overwrite the output file with the full accumulator.
    ///
    /// The content goes to a sibling temp file first and is renamed over
    /// the output, so an interrupted write leaves the previous checkpoint
    /// intact.
    pub fn flush(&mut self) -> Result<(), LabelerError> {
        let write_err = |source| LabelerError::Write {
            path: self.output.display().to_string(),
            source,
        };

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = temp_path(&self.output);
        fs::write(&tmp, self.render()).map_err(write_err)?;
        fs::rename(&tmp, &self.output).map_err(write_err)?;

        self.flushes += 1;
        tracing::debug!(
            path = %self.output.display(),
            examples = self.examples.len(),
            "Label file written"
        );
        Ok(())
    }
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "labels".into());
    name.push(".tmp");
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    fn example(words: &[&str]) -> LabeledExample {
        LabeledExample {
            pairs: words.iter().map(|w| (w.to_string(), Label::Outside)).collect(),
        }
    }

    #[test]
    fn checkpoint_every_k_completions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conll/labels.txt");
        let mut session = LabelingSession::new(&path, 2);

        assert!(!session.record(example(&["a"])).unwrap());
        assert!(!path.exists());
        assert!(session.record(example(&["b"])).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\tO\n\nb\tO\n\n");

        assert!(!session.record(example(&["c"])).unwrap());
        // Not yet flushed: file still holds the last checkpoint.
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\tO\n\nb\tO\n\n");
        assert_eq!(session.flushes(), 1);
    }

    #[test]
    fn flush_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        let mut session = LabelingSession::new(&path, 100);

        session.record(example(&["x", "y"])).unwrap();
        session.flush().unwrap();
        let first = fs::read_to_string(&path).unwrap();

        session.record(example(&["z"])).unwrap();
        session.flush().unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert!(second.starts_with(&first));
        assert_eq!(second, format!("{first}z\tO\n\n"));

        session.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), second);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn skips_do_not_count_as_completions() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelingSession::new(dir.path().join("labels.txt"), 1);
        session.record_skip();
        session.record_skip();
        assert_eq!(session.completed(), 0);
        assert_eq!(session.skipped(), 2);
        assert_eq!(session.flushes(), 0);
    }

    #[test]
    fn empty_session_flushes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        let mut session = LabelingSession::new(&path, 5);
        session.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn flush_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let mut session = LabelingSession::new(blocker.join("labels.txt"), 5);
        assert!(matches!(session.flush(), Err(LabelerError::Write { .. })));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = LabelingSession::new(dir.path().join("labels.txt"), 0);
        assert!(session.record(example(&["a"])).unwrap());
    }
}
