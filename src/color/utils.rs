pub use smart_leds::hsv::hsv2rgb;

use crate::color::{Hsv, Rgb};

/// Classic 0-255 color wheel
///
/// Walks red -> blue -> green -> red as `position` goes from 0 to 255.
/// Cheaper than a full HSV conversion and what the rainbow patterns use.
#[allow(clippy::cast_possible_truncation)]
pub const fn wheel(position: u8) -> Rgb {
    let position = 255 - position;
    if position < 85 {
        return Rgb {
            r: 255 - position * 3,
            g: 0,
            b: position * 3,
        };
    }
    if position < 170 {
        let position = position - 85;
        return Rgb {
            r: 0,
            g: position * 3,
            b: 255 - position * 3,
        };
    }
    let position = position - 170;
    Rgb {
        r: position * 3,
        g: 255 - position * 3,
        b: 0,
    }
}

/// Build an HSV color from unit-range components
///
/// Hue wraps around, saturation and value are clamped to `0.0..=1.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_from_unit(hue: f32, sat: f32, val: f32) -> Hsv {
    let hue = if hue.is_finite() {
        hue - libm::floorf(hue)
    } else {
        0.0
    };
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    Hsv {
        hue: (hue * 255.0) as u8,
        sat: to_u8(sat),
        val: to_u8(val),
    }
}

/// Pack a color into the persisted integer form (`0xBBGGRR`)
pub const fn rgb_to_packed(color: Rgb) -> u32 {
    ((color.b as u32) << 16) | ((color.g as u32) << 8) | color.r as u32
}

/// Unpack a color from the persisted integer form (`0xBBGGRR`)
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_packed(value: u32) -> Rgb {
    Rgb {
        r: (value & 0xFF) as u8,
        g: ((value >> 8) & 0xFF) as u8,
        b: ((value >> 16) & 0xFF) as u8,
    }
}

/// Serde adapter storing an [`Rgb`] as its packed integer
pub(crate) mod packed {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{rgb_from_packed, rgb_to_packed};
    use crate::color::Rgb;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(crate) fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(rgb_to_packed(*color))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
        u32::deserialize(deserializer).map(rgb_from_packed)
    }
}
