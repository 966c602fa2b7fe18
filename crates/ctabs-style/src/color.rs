#![forbid(unsafe_code)]

//! Packed ARGB colors.

use std::fmt;
use std::str::FromStr;

/// A color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Opaque color from RGB components.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | (alpha as u32) << 24)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// A string was not `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            6 => Ok(Self(0xFF00_0000 | value)),
            8 => Ok(Self(value)),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_round_trip() {
        let c = Color::from_argb(0x80, 0x11, 0x22, 0x33);
        assert_eq!(c.0, 0x8011_2233);
        assert_eq!(
            (c.alpha(), c.red(), c.green(), c.blue()),
            (0x80, 0x11, 0x22, 0x33)
        );
    }

    #[test]
    fn rgb_is_opaque() {
        assert_eq!(Color::from_rgb(0, 0, 0), Color::BLACK);
        assert_eq!(Color::from_rgb(255, 255, 255).alpha(), 0xFF);
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color::from_rgb(1, 2, 3).with_alpha(0x40);
        assert_eq!(c, Color::from_argb(0x40, 1, 2, 3));
    }

    #[test]
    fn parse_short_and_long_forms() {
        assert_eq!("#336699".parse::<Color>(), Ok(Color(0xFF33_6699)));
        assert_eq!("#00336699".parse::<Color>(), Ok(Color(0x0033_6699)));
        assert!("336699".parse::<Color>().is_err());
        assert!("#3369".parse::<Color>().is_err());
        assert!("#GG3366".parse::<Color>().is_err());
    }

    #[test]
    fn display_is_upper_hex() {
        assert_eq!(Color(0xFF33_66AA).to_string(), "#FF3366AA");
    }
}
