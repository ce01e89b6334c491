use serde::{Deserialize, Serialize};

/// A packed 16-bit color: 5 bits red, 6 bits green, 5 bits blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color565(pub u16);

impl Color565 {
    pub const BLACK: Color565 = Color565(0x0000);
    pub const WHITE: Color565 = Color565(0xFFFF);
    pub const RED: Color565 = Color565(0xF800);
    pub const GREEN: Color565 = Color565(0x07E0);
    pub const BLUE: Color565 = Color565(0x001F);

    /// Pack 8-bit channels, dropping the low bits of each.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3))
    }

    /// Parse `#RRGGBB`. Anything else (missing `#`, wrong length, non-hex
    /// digits) falls back to white.
    pub fn parse_hex(hex: &str) -> Self {
        match parse_channels(hex) {
            Some((r, g, b)) => Self::from_rgb(r, g, b),
            None => {
                tracing::warn!(color = hex, "malformed color string, using white");
                Self::WHITE
            }
        }
    }

    /// Raw 5/6/5 channel values.
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 11) & 0x1F) as u8,
            ((self.0 >> 5) & 0x3F) as u8,
            (self.0 & 0x1F) as u8,
        )
    }

    /// Expand to 8-bit channels (`r5 * 255 / 31`, `g6 * 255 / 63`, `b5 * 255 / 31`).
    pub const fn to_rgb(self) -> (u8, u8, u8) {
        let (r5, g6, b5) = self.channels();
        (
            ((r5 as u16 * 255) / 31) as u8,
            ((g6 as u16 * 255) / 63) as u8,
            ((b5 as u16 * 255) / 31) as u8,
        )
    }

    /// Scale brightness by `factor`, clamped to `[0, 1]`. NaN scales to black.
    pub fn scale(self, factor: f32) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        let (r, g, b) = self.to_rgb();
        let mul = |c: u8| (c as f32 * factor) as u8;
        Self::from_rgb(mul(r), mul(g), mul(b))
    }
}

impl From<u16> for Color565 {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

fn parse_channels(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primary_colors() {
        assert_eq!(Color565::parse_hex("#ff0000"), Color565::RED);
        assert_eq!(Color565::parse_hex("#00FF00"), Color565::GREEN);
        assert_eq!(Color565::parse_hex("#0000ff"), Color565::BLUE);
        assert_eq!(Color565::parse_hex("#000000"), Color565::BLACK);
        assert_eq!(Color565::parse_hex("#ffffff"), Color565::WHITE);
    }

    #[test]
    fn parse_packs_high_bits() {
        // 0x12 & 0xF8 = 0x10, 0x34 & 0xFC = 0x34, 0x56 >> 3 = 0x0A
        let c = Color565::parse_hex("#123456");
        assert_eq!(c.0, (0x10 << 8) | (0x34 << 3) | 0x0A);
    }

    #[test]
    fn malformed_strings_fall_back_to_white() {
        for bad in ["123456", "#fff", "#1234567", "#gg0000", "", "#", "red"] {
            assert_eq!(Color565::parse_hex(bad), Color565::WHITE, "{bad}");
        }
    }

    #[test]
    fn scale_by_one_is_identity() {
        for raw in [0x0000u16, 0xFFFF, 0xF800, 0x07E0, 0x001F, 0x1234, 0xABCD, 0x8410] {
            let c = Color565(raw);
            assert_eq!(c.scale(1.0), c, "{raw:#06x}");
        }
    }

    #[test]
    fn scale_by_zero_is_black() {
        assert_eq!(Color565::WHITE.scale(0.0), Color565::BLACK);
        assert_eq!(Color565::RED.scale(0.0), Color565::BLACK);
    }

    #[test]
    fn scale_clamps_out_of_range_factors() {
        let c = Color565::parse_hex("#80c040");
        assert_eq!(c.scale(3.5), c);
        assert_eq!(c.scale(-2.0), Color565::BLACK);
        assert_eq!(c.scale(f32::NAN), Color565::BLACK);
    }

    #[test]
    fn scale_never_brightens_a_channel() {
        let c = Color565::parse_hex("#a0b0c0");
        let (r0, g0, b0) = c.channels();
        for step in 0..=20 {
            let (r, g, b) = c.scale(step as f32 / 20.0).channels();
            assert!(r <= r0 && g <= g0 && b <= b0);
        }
    }

    #[test]
    fn half_brightness_white() {
        let (r, g, b) = Color565::WHITE.scale(0.5).to_rgb();
        // 127 & 0xF8 = 120 -> r5 15 -> 123 after expansion
        assert_eq!((r, g, b), (123, 125, 123));
    }
}
