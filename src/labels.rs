//! Span label vocabulary.

use serde::{Deserialize, Serialize};

/// A BIO span label for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    /// Outside any span.
    #[default]
    #[serde(rename = "O")]
    Outside,
    #[serde(rename = "B-Product")]
    BeginProduct,
    #[serde(rename = "I-Product")]
    InsideProduct,
    #[serde(rename = "B-LOC")]
    BeginLocation,
    #[serde(rename = "I-LOC")]
    InsideLocation,
    #[serde(rename = "B-PRICE")]
    BeginPrice,
    #[serde(rename = "I-PRICE")]
    InsidePrice,
}

impl Label {
    /// Every label, in operator-key order (`0`..`6`).
    pub const ALL: [Label; 7] = [
        Self::Outside,
        Self::BeginProduct,
        Self::InsideProduct,
        Self::BeginLocation,
        Self::InsideLocation,
        Self::BeginPrice,
        Self::InsidePrice,
    ];

    /// Look up the label bound to an operator key.
    pub fn from_key(key: &str) -> Option<Label> {
        match key.as_bytes() {
            [digit @ b'0'..=b'9'] => Self::ALL.get(usize::from(digit - b'0')).copied(),
            _ => None,
        }
    }

    /// The operator key for this label.
    pub fn key(&self) -> usize {
        Self::ALL
            .iter()
            .position(|l| l == self)
            .unwrap_or_default()
    }

    /// Tag text as written to the output file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outside => "O",
            Self::BeginProduct => "B-Product",
            Self::InsideProduct => "I-Product",
            Self::BeginLocation => "B-LOC",
            Self::InsideLocation => "I-LOC",
            Self::BeginPrice => "B-PRICE",
            Self::InsidePrice => "I-PRICE",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
