//! Duplicate detection: finder invocation, report ingestion and the intra-target gate.

pub mod engine;
pub mod guard;
pub mod report;

pub use engine::{DEFAULT_ENGINE, DuplicateFinder, EngineCommand, HashType, detect};
pub use guard::ensure_no_internal_duplicates;
pub use report::{DuplicateGroup, DuplicateReport, FileRecord, SizeBucket, ingest};
