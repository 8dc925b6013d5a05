//! Telegram NER corpus toolkit: collect, clean and hand-label messages.

pub mod collector;
pub mod config;
pub mod dataset;
pub mod error;
pub mod labeler;
pub mod labels;
pub mod normalize;
pub mod preprocess;
pub mod sampler;
