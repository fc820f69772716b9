//! Level authoring: the editing session that turns grid clicks into level
//! mutations, and the controller that walks the preview camera.
//!
//! # Invariants
//! - Every mutation goes through [`raylevel_kernel::Level`], so the switch
//!   link table stays in step with the grid.
//! - A refused placement leaves the session in placement mode.
//! - The preview camera never enters a blocking or out-of-grid cell.

pub mod config;
pub mod editor;
pub mod preview;

pub use config::{ConfigError, MotionConfig, PreviewConfig};
pub use editor::{ClickOutcome, EditError, EditorSession, Placement};
pub use preview::{PreviewController, PreviewState};
