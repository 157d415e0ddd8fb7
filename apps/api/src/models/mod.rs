pub mod resume;
pub mod settings;

pub use resume::{FieldValue, ResumeRecord, ResumeStore, Section};
pub use settings::{PersistedState, Settings, SettingsUpdate};
