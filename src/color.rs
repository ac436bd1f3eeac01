//! Packed RGB colors with canonical parsing and rendering.

use crate::error::{Result, StoreError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Mask selecting the 24 RGB bits of a packed color.
const RGB_MASK: u32 = 0x00FF_FFFF;

/// Recognized color names and their packed RGB values.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("darkgray", 0x444444),
    ("darkgrey", 0x444444),
    ("gray", 0x888888),
    ("grey", 0x888888),
    ("lightgray", 0xCCCCCC),
    ("lightgrey", 0xCCCCCC),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x00FF00),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("aqua", 0x00FFFF),
    ("fuchsia", 0xFF00FF),
    ("lime", 0x00FF00),
    ("maroon", 0x800000),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("purple", 0x800080),
    ("silver", 0xC0C0C0),
    ("teal", 0x008080),
];

/// An immutable 24-bit RGB color.
///
/// Equality and hashing use the packed integer only, so `"red"`,
/// `"#ff0000"` and `"#80FF0000"` all denote the same color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    /// Build a color from its components.
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Color((u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue))
    }

    /// Build a color from a packed integer. Bits above the low 24 are ignored.
    pub fn from_packed(packed: u32) -> Self {
        Color(packed & RGB_MASK)
    }

    /// Parse a textual color spec.
    ///
    /// Accepts `#RRGGBB`, `#AARRGGBB` (alpha is discarded) and the names in
    /// the recognized table, case-insensitively.
    pub fn parse(spec: &str) -> Result<Self> {
        let color = match spec.strip_prefix('#') {
            Some(digits) => Self::parse_hex(digits),
            None => Self::parse_name(spec),
        };
        color.ok_or_else(|| StoreError::InvalidColorSpec(spec.to_string()))
    }

    fn parse_hex(digits: &str) -> Option<Self> {
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        // For #AARRGGBB the alpha byte comes first.
        let rgb = &bytes[bytes.len() - 3..];
        Some(Color::from_rgb(rgb[0], rgb[1], rgb[2]))
    }

    fn parse_name(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, packed)| Color(packed))
    }

    /// The packed `0xRRGGBB` value.
    pub fn packed(&self) -> u32 {
        self.0
    }

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }
}

impl FromStr for Color {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        Color::parse(&spec).map_err(de::Error::custom)
    }
}
