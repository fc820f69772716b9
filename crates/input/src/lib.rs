//! Preview input: held keys mapped to movement actions.
//!
//! # Invariants
//! - The preview consumes [`Intents`], never raw keys.
//! - Arrow keys and WASD drive the same actions.

pub mod action;

pub use action::{Action, InputState, Intents, PreviewKey, UnknownKey, parse_key_script};
