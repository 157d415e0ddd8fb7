// Form-fill engine: identifier extraction, fuzzy matching, value normalization
// and safety gating, driven by a single-pass orchestrator.
// Everything below `handlers` is synchronous; handlers run a pass inside
// tokio::task::spawn_blocking.

pub mod extract;
pub mod filler;
pub mod gate;
pub mod handlers;
pub mod matcher;
pub mod normalize;

pub use filler::{form_stats, FillOptions, FillReport, FormFiller, FormStats};
pub use matcher::FieldMatcher;
