/// Errors from reading or validating a level document.
///
/// Any of these means nothing was loaded.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("level was saved with a newer editor (format v{found}, this build reads up to v{supported})")]
    VersionTooNew { found: u32, supported: u32 },
    #[error("map dimensions must be at least 1x1, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("map array has {actual} cells, expected {expected} for {width}x{height}")]
    MapLengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("invalid tile id {id} at cell {index}")]
    InvalidTile { index: usize, id: i64 },
    #[error("invalid enemy type {id} in entry {index}")]
    InvalidEnemyKind { index: usize, id: i64 },
    #[error("invalid pickup type {id} in entry {index}")]
    InvalidPickupKind { index: usize, id: i64 },
    #[error("invalid door orientation {key:?} -> {value:?}")]
    InvalidOrientation { key: String, value: String },
    #[error("invalid switch link {value} for switch {index}")]
    InvalidSwitchLink { index: usize, value: i64 },
    #[error("no map array found (expected `const u8 <name>_map[N] = {{ ... }};`)")]
    NoMapArray,
    #[error("could not determine map dimensions for {count} values")]
    UnresolvedDimensions { count: usize },
}
