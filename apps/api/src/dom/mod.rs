// Snapshot DOM: an arena document built from the JSON tree the extension posts,
// plus the write operations a fill pass applies to it.

pub mod document;
pub mod write;

pub use document::SnapshotNode;
