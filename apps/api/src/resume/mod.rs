// Résumé storage and import: markdown codec, plain-text and remote parsing,
// persisted state and the HTTP handlers around them.

pub mod ai_adapter;
pub mod handlers;
pub mod markdown;
pub mod prompts;
pub mod remote;
pub mod state_file;
pub mod txt_parser;

pub use remote::{LlmResumeParser, ResumeTextParser};
pub use state_file::{StateFile, StateFileError, StateStore};
