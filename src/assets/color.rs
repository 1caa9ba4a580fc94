use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;

/// Stock background swatches offered by the color picker.
pub const PRESET_BACKGROUNDS: [&str; 13] = [
    "#ffffff", "#f8fafc", "#f1f5f9", "#e2e8f0", "#000000", "#1e293b", "#475569", "#ef4444",
    "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Parse `#RGB` or `#RRGGBB` (case-insensitive) into an opaque color.
pub fn parse_hex_rgb(s: &str) -> Option<Rgba8> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }

    let b = hex.as_bytes();
    match b.len() {
        3 => {
            let r = nibble(b[0])?;
            let g = nibble(b[1])?;
            let bl = nibble(b[2])?;
            Some(Rgba8::opaque(r * 17, g * 17, bl * 17))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgba8::opaque(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

/// Background color as supplied by the picker, kept verbatim.
///
/// Malformed strings are accepted and paint opaque black, the same fallback a 2-D canvas uses
/// for an unusable fill style.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BackgroundColor {
    raw: String,
    parsed: Option<Rgba8>,
}

impl BackgroundColor {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_hex_rgb(&raw);
        Self { raw, parsed }
    }

    pub fn white() -> Self {
        Self::parse("#ffffff")
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Color to paint with.
    pub fn resolved(&self) -> Rgba8 {
        self.parsed.unwrap_or(Rgba8::OPAQUE_BLACK)
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Debug for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackgroundColor({:?})", self.raw)
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for BackgroundColor {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for BackgroundColor {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<BackgroundColor> for String {
    fn from(c: BackgroundColor) -> Self {
        c.raw
    }
}
