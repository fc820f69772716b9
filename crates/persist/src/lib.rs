//! Persistence: the versioned level document, header-text import and the
//! export text consumed by the game build.
//!
//! # Invariants
//! - Loading never partially applies: a document either becomes a complete
//!   [`raylevel_kernel::Level`] or fails with a [`FormatError`].
//! - Saving then loading reproduces the same grid, entities, switch links and
//!   door orientations.
//! - Over-capacity entity lists are trimmed on load and reported as warnings.

pub mod document;
pub mod error;
pub mod export;
pub mod header;
pub mod store;

pub use document::{
    EnemyRecord, LEVEL_FORMAT_VERSION, LevelDocument, LoadOutcome, PickupRecord, SpawnRecord,
};
pub use error::FormatError;
pub use export::{
    DEFAULT_LEVEL_ID, export_file_name, export_header_file, export_source, normalize_level_id,
};
pub use header::{HeaderImport, parse_header};
pub use store::{load_header, load_level, save_header, save_level};
