//! Per-message token labeling state machine.

use crate::labeler::decision::Decision;
use crate::labels::Label;

/// Where a message is in its labeling lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelState {
    /// Waiting for the label of the token at this index.
    AwaitingToken(usize),
    /// Operator dropped the message.
    MessageSkipped,
    /// Every token has a label.
    MessageComplete,
    /// Operator quit the whole session.
    SessionTerminated,
}

impl LabelState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::AwaitingToken(_))
    }
}

impl std::fmt::Display for LabelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingToken(i) => write!(f, "awaiting_token({i})"),
            Self::MessageSkipped => write!(f, "message_skipped"),
            Self::MessageComplete => write!(f, "message_complete"),
            Self::SessionTerminated => write!(f, "session_terminated"),
        }
    }
}

/// An ordered sequence of (token, label) pairs for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub pairs: Vec<(String, Label)>,
}

impl LabeledExample {
    /// Render as `token<TAB>label` lines followed by one blank line.
    pub fn to_conll(&self) -> String {
        let mut out = String::new();
        for (token, label) in &self.pairs {
            out.push_str(token);
            out.push('\t');
            out.push_str(label.as_str());
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// How a message left the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Complete(LabeledExample),
    Skipped,
    Terminated,
}

/// Labeling progress for one message.
#[derive(Debug, Clone)]
pub struct MessageLabeling {
    tokens: Vec<String>,
    labels: Vec<Label>,
    state: LabelState,
}

impl MessageLabeling {
    /// Start at the first token. A message with no tokens cannot be
    /// labeled and starts out skipped.
    pub fn new(tokens: Vec<String>) -> Self {
        let state = if tokens.is_empty() {
            LabelState::MessageSkipped
        } else {
            LabelState::AwaitingToken(0)
        };
        Self {
            labels: Vec::with_capacity(tokens.len()),
            tokens,
            state,
        }
    }

    pub fn state(&self) -> LabelState {
        self.state
    }

    /// Labels collected so far.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The token currently awaiting a label, with its index.
    pub fn current(&self) -> Option<(usize, &str)> {
        match self.state {
            LabelState::AwaitingToken(i) => self.tokens.get(i).map(|t| (i, t.as_str())),
            _ => None,
        }
    }

    /// Feed one operator decision. Terminal states ignore further input.
    pub fn apply(&mut self, decision: Decision) -> LabelState {
        let LabelState::AwaitingToken(index) = self.state else {
            return self.state;
        };

        self.state = match decision {
            Decision::Label(label) => self.push(index, label),
            Decision::Invalid(raw) => {
                tracing::warn!(input = %raw, token = index, "Invalid input, defaulting to 'O'");
                self.push(index, Label::default())
            }
            Decision::Skip => {
                self.labels.clear();
                LabelState::MessageSkipped
            }
            Decision::Quit => {
                self.labels.clear();
                LabelState::SessionTerminated
            }
        };
        self.state
    }

    fn push(&mut self, index: usize, label: Label) -> LabelState {
        self.labels.push(label);
        if index + 1 >= self.tokens.len() {
            LabelState::MessageComplete
        } else {
            LabelState::AwaitingToken(index + 1)
        }
    }

    /// Ask `decide` for each pending token until the message reaches a
    /// terminal state. `decide` receives the token index and text; its
    /// error aborts the message.
    pub fn drive<E, F>(mut self, mut decide: F) -> Result<MessageOutcome, E>
    where
        F: FnMut(usize, &str) -> Result<Decision, E>,
    {
        loop {
            let index = match self.state {
                LabelState::AwaitingToken(index) => index,
                LabelState::MessageComplete => {
                    return Ok(MessageOutcome::Complete(LabeledExample {
                        pairs: self.tokens.into_iter().zip(self.labels).collect(),
                    }));
                }
                LabelState::MessageSkipped => return Ok(MessageOutcome::Skipped),
                LabelState::SessionTerminated => return Ok(MessageOutcome::Terminated),
            };
            // `new` and `push` only enter AwaitingToken(i) with i < tokens.len().
            let decision = decide(index, &self.tokens[index])?;
            self.apply(decision);
        }
    }
}
