use std::collections::BTreeSet;
use std::fmt;

/// A movement action the preview understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Forward,
    Back,
    TurnLeft,
    TurnRight,
}

/// Keys that drive the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreviewKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
}

impl PreviewKey {
    pub const ALL: [PreviewKey; 8] = [
        PreviewKey::ArrowUp,
        PreviewKey::ArrowDown,
        PreviewKey::ArrowLeft,
        PreviewKey::ArrowRight,
        PreviewKey::W,
        PreviewKey::A,
        PreviewKey::S,
        PreviewKey::D,
    ];

    pub fn action(self) -> Action {
        match self {
            PreviewKey::ArrowUp | PreviewKey::W => Action::Forward,
            PreviewKey::ArrowDown | PreviewKey::S => Action::Back,
            PreviewKey::ArrowLeft | PreviewKey::A => Action::TurnLeft,
            PreviewKey::ArrowRight | PreviewKey::D => Action::TurnRight,
        }
    }

    /// Parse a key name: `w a s d` (any case) or `up down left right`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => PreviewKey::W,
            "a" => PreviewKey::A,
            "s" => PreviewKey::S,
            "d" => PreviewKey::D,
            "up" | "arrowup" => PreviewKey::ArrowUp,
            "down" | "arrowdown" => PreviewKey::ArrowDown,
            "left" | "arrowleft" => PreviewKey::ArrowLeft,
            "right" | "arrowright" => PreviewKey::ArrowRight,
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for PreviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreviewKey::ArrowUp => "up",
            PreviewKey::ArrowDown => "down",
            PreviewKey::ArrowLeft => "left",
            PreviewKey::ArrowRight => "right",
            PreviewKey::W => "w",
            PreviewKey::A => "a",
            PreviewKey::S => "s",
            PreviewKey::D => "d",
        };
        f.write_str(name)
    }
}

/// The four booleans the preview reads each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub forward: bool,
    pub back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl Intents {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.back || self.turn_left || self.turn_right)
    }

    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        actions.into_iter().fold(Self::default(), |mut i, a| {
            match a {
                Action::Forward => i.forward = true,
                Action::Back => i.back = true,
                Action::TurnLeft => i.turn_left = true,
                Action::TurnRight => i.turn_right = true,
            }
            i
        })
    }
}

/// Currently held preview keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: BTreeSet<PreviewKey>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: PreviewKey) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: PreviewKey) {
        self.held.remove(&key);
    }

    /// Drop every held key, e.g. when the preview loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Replace the held set.
    pub fn hold_only(&mut self, keys: impl IntoIterator<Item = PreviewKey>) {
        self.held = keys.into_iter().collect();
    }

    pub fn is_held(&self, key: PreviewKey) -> bool {
        self.held.contains(&key)
    }

    pub fn intents(&self) -> Intents {
        Intents::from_actions(self.held.iter().map(|k| k.action()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preview key {0:?} (expected w, a, s, d, up, down, left or right)")]
pub struct UnknownKey(pub String);

/// Parse a tick script: whitespace or comma separated steps, each step a
/// `+`-joined set of keys held for one tick. `.` or `-` is a tick with no
/// keys held.
///
/// `"w w w+d . s"` is five ticks.
pub fn parse_key_script(script: &str) -> Result<Vec<BTreeSet<PreviewKey>>, UnknownKey> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|step| !step.is_empty())
        .map(|step| {
            if step == "." || step == "-" {
                return Ok(BTreeSet::new());
            }
            step.split('+')
                .map(|name| PreviewKey::from_name(name).ok_or_else(|| UnknownKey(name.to_string())))
                .collect()
        })
        .collect()
}
