use std::sync::Arc;

use crate::config::Config;
use crate::fill::FormFiller;
use crate::resume::{ResumeTextParser, StateStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Persisted résumé and settings.
    pub store: Arc<StateStore>,
    pub filler: Arc<FormFiller>,
    /// Pluggable remote parser. Default: LlmResumeParser.
    pub resume_parser: Arc<dyn ResumeTextParser>,
}
