//! Selecting target-side duplicates and relocating them.

pub mod duplicate;
pub mod engine;
pub mod facility;
pub mod helpers;
pub mod select;

pub use duplicate::unique_destination;
pub use engine::{
    EngineSettings, EngineState, ItemOutcome, ItemResult, RelocationEngine, RelocationRun,
};
pub use facility::{Destination, Facility, Relocated, Relocator, RelocatorKind, probe_trash};
pub use select::{TargetFileSet, select_target_files};
