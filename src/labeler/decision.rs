//! Operator decisions and where they come from.

use std::collections::VecDeque;

use crate::error::LabelerError;
use crate::labels::Label;

/// One operator response to a token prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Assign this label to the current token.
    Label(Label),
    /// Drop the whole message.
    Skip,
    /// Stop the session after saving.
    Quit,
    /// Unrecognised input; labeled as outside with a warning.
    Invalid(String),
}

/// Parses raw operator input into a [`Decision`].
pub struct DecisionParser;

impl DecisionParser {
    pub const SKIP: &'static str = "n";
    pub const QUIT: &'static str = "q";

    pub fn parse(input: &str) -> Decision {
        let trimmed = input.trim();
        match trimmed {
            Self::QUIT => Decision::Quit,
            Self::SKIP => Decision::Skip,
            _ => Label::from_key(trimmed)
                .map(Decision::Label)
                .unwrap_or_else(|| Decision::Invalid(trimmed.to_string())),
        }
    }
}

/// What the operator is being asked about.
#[derive(Debug, Clone, Copy)]
pub struct TokenPrompt<'a> {
    pub channel: &'a str,
    pub token: &'a str,
    /// Zero-based position of `token`.
    pub index: usize,
    pub total: usize,
}

/// A source of operator decisions for the labeling loop.
pub trait DecisionSource {
    /// Show a message before its tokens are prompted.
    fn show_message(&mut self, _channel: &str, _tokens: &[String]) {}

    /// Report something the operator should see (skips, saves, warnings).
    fn notify(&mut self, _text: &str) {}

    /// Ask for the label of one token.
    fn next_decision(&mut self, prompt: &TokenPrompt<'_>) -> Result<Decision, LabelerError>;
}

/// Replays a fixed list of inputs. Once exhausted every prompt answers
/// with quit.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    inputs: VecDeque<String>,
    prompted: usize,
}

impl ScriptedDecisions {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompted: 0,
        }
    }

    /// Number of prompts answered so far.
    pub fn prompted(&self) -> usize {
        self.prompted
    }

    /// Inputs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl DecisionSource for ScriptedDecisions {
    fn next_decision(&mut self, _prompt: &TokenPrompt<'_>) -> Result<Decision, LabelerError> {
        self.prompted += 1;
        Ok(self
            .inputs
            .pop_front()
            .map(|raw| DecisionParser::parse(&raw))
            .unwrap_or(Decision::Quit))
    }
}
