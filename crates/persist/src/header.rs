//! Best-effort reverse parse of an exported level header.
//!
//! Only the tile array and the spawn macros survive a round trip through a
//! header; enemies, pickups, links and orientations come back empty.

use crate::document::{LEVEL_FORMAT_VERSION, LevelDocument, LoadOutcome, SpawnRecord};
use crate::error::FormatError;
use raylevel_kernel::Spawn;
use std::collections::BTreeMap;

/// Widths tried, in order, when nothing else pins down the map shape.
const FALLBACK_WIDTHS: [usize; 3] = [64, 48, 32];

/// What was recovered from a header file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderImport {
    /// The `<id>` of the `<id>_map` array.
    pub level_id: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<i64>,
    pub spawn1: Option<(u32, u32)>,
    pub spawn2: Option<(u32, u32)>,
}

impl HeaderImport {
    /// The equivalent level document, with no entities or links.
    pub fn to_document(&self) -> LevelDocument {
        let spawn = |s: Option<(u32, u32)>| {
            s.map(|(x, y)| SpawnRecord {
                x,
                y,
                angle: Some(i64::from(Spawn::DEFAULT_ANGLE.units())),
            })
        };
        LevelDocument {
            version: Some(LEVEL_FORMAT_VERSION),
            map_w: self.width,
            map_h: self.height,
            map: self.tiles.clone(),
            spawn1: spawn(self.spawn1),
            spawn2: spawn(self.spawn2),
            enemies: Vec::new(),
            pickups: Vec::new(),
            switch_links: Vec::new(),
            door_orientations: BTreeMap::new(),
        }
    }

    /// Run the import through the regular document loader.
    pub fn into_level(self) -> Result<LoadOutcome, FormatError> {
        self.to_document().into_level()
    }
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte cursor with just enough matching to read the export format.
#[derive(Clone, Copy)]
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(text: &'a str, pos: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos,
        }
    }

    fn skip_ws(&mut self) -> usize {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// At least one whitespace character.
    fn ws1(&mut self) -> Option<()> {
        (self.skip_ws() > 0).then_some(())
    }

    fn eat(&mut self, lit: &str) -> Option<()> {
        let end = self.pos + lit.len();
        (self.bytes.get(self.pos..end)? == lit.as_bytes()).then(|| self.pos = end)
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|&b| pred(b)) {
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    fn digits(&mut self) -> Option<u64> {
        let run = self.take_while(|b| b.is_ascii_digit());
        std::str::from_utf8(run).ok()?.parse().ok()
    }

    fn word(&mut self) -> Option<&'a str> {
        let run = self.take_while(is_word);
        if run.is_empty() {
            return None;
        }
        std::str::from_utf8(run).ok()
    }
}

/// Every byte offset where `needle` starts.
fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack.match_indices(needle).map(|(i, _)| i)
}

/// `const u8 <id>_map[<n>] = {` → (id, declared count, offset of `{`).
fn find_map_array(text: &str) -> Option<(String, u64, usize)> {
    occurrences(text, "const").find_map(|start| {
        let mut c = Cursor::at(text, start + "const".len());
        c.ws1()?;
        c.eat("u8")?;
        c.ws1()?;
        let ident = c.word()?;
        let id = ident.strip_suffix("_map").filter(|id| !id.is_empty())?;
        c.skip_ws();
        c.eat("[")?;
        c.skip_ws();
        let declared = c.digits()?;
        c.skip_ws();
        c.eat("]")?;
        c.skip_ws();
        c.eat("=")?;
        c.skip_ws();
        let brace = c.pos;
        c.eat("{")?;
        Some((id.to_string(), declared, brace))
    })
}

/// Remove `/* ... */` comments. An unterminated comment is left in place.
fn strip_block_comments(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find("/*") {
        match rest[open + 2..].find("*/") {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + 2 + close + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Whole words made only of digits, in order.
fn numeric_words(text: &str) -> Vec<i64> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()))
        .map(|w| w.parse().unwrap_or(i64::MAX))
        .collect()
}

/// `map: <w> x <h>` anywhere in the text, case-insensitive.
fn dimension_comment(text: &str) -> Option<(u64, u64)> {
    let lower = text.to_ascii_lowercase();
    occurrences(&lower, "map:").find_map(|start| {
        let mut c = Cursor::at(&lower, start + "map:".len());
        c.skip_ws();
        let w = c.digits()?;
        c.skip_ws();
        c.eat("x")?;
        c.skip_ws();
        let h = c.digits()?;
        Some((w, h))
    })
}

/// Number of `/* Row <n>` markers.
fn row_markers(body: &str) -> usize {
    occurrences(body, "/*")
        .filter(|&start| {
            let mut c = Cursor::at(body, start + 2);
            c.skip_ws();
            c.eat("Row").is_some()
                && c.ws1().is_some()
                && c.bytes.get(c.pos).is_some_and(u8::is_ascii_digit)
        })
        .count()
}

/// `#define <NAME> (<n> * 256 + 128)` → `n`.
fn spawn_coord(text: &str, name: &str) -> Option<u32> {
    occurrences(text, "#define").find_map(|start| {
        let mut c = Cursor::at(text, start + "#define".len());
        c.ws1()?;
        c.eat(name)?;
        c.ws1()?;
        c.eat("(")?;
        c.skip_ws();
        let tile = c.digits()?;
        c.skip_ws();
        c.eat("*")?;
        c.skip_ws();
        c.eat("256")?;
        c.skip_ws();
        c.eat("+")?;
        c.skip_ws();
        c.eat("128")?;
        c.skip_ws();
        c.eat(")")?;
        u32::try_from(tile).ok()
    })
}

fn resolve_dimensions(text: &str, body: &str, count: usize) -> Option<(usize, usize)> {
    let fits = |(w, h): (usize, usize)| w > 0 && h > 0 && w * h == count;

    let mut dims = dimension_comment(text)
        .map(|(w, h)| (w as usize, h as usize))
        .filter(|&(w, h)| w > 0 && h > 0);
    if dims.is_none() {
        let rows = row_markers(body);
        if rows > 0 {
            dims = Some(((count as f64 / rows as f64).round() as usize, rows));
        }
    }
    if let Some(d) = dims.filter(|&d| fits(d)) {
        return Some(d);
    }

    let side = count.isqrt();
    if side * side == count {
        return Some((side, side)).filter(|&d| fits(d));
    }
    FALLBACK_WIDTHS
        .iter()
        .find(|&&w| count % w == 0)
        .map(|&w| (w, count / w))
        .filter(|&d| fits(d))
}

/// Parse an exported header back into tiles and spawns.
pub fn parse_header(text: &str) -> Result<HeaderImport, FormatError> {
    let (level_id, declared, brace) = find_map_array(text).ok_or(FormatError::NoMapArray)?;
    let body_len = text[brace..].find("};").ok_or(FormatError::NoMapArray)?;
    let body = &text[brace + 1..brace + body_len];

    let tiles = numeric_words(&strip_block_comments(body));
    if tiles.is_empty() {
        return Err(FormatError::NoMapArray);
    }
    if tiles.len() as u64 != declared {
        tracing::warn!(
            declared,
            found = tiles.len(),
            "header declared {declared} cells but found {}",
            tiles.len()
        );
    }

    let (width, height) = resolve_dimensions(text, body, tiles.len())
        .ok_or(FormatError::UnresolvedDimensions { count: tiles.len() })?;
    let (width, height) = u32::try_from(width)
        .ok()
        .zip(u32::try_from(height).ok())
        .ok_or(FormatError::UnresolvedDimensions { count: tiles.len() })?;

    let prefix = level_id.to_uppercase();
    let pair = |x: &str, y: &str| {
        spawn_coord(text, &format!("{prefix}_{x}")).zip(spawn_coord(text, &format!("{prefix}_{y}")))
    };
    let spawn1 = pair("SPAWN_X", "SPAWN_Y");
    let spawn2 = pair("SPAWN2_X", "SPAWN2_Y");

    tracing::info!(level_id = %level_id, width, height, "parsed level header");
    Ok(HeaderImport {
        level_id,
        width,
        height,
        tiles,
        spawn1,
        spawn2,
    })
}
