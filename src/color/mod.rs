mod utils;

use smart_leds::{RGB8, hsv::Hsv as HSV};
pub use utils::{hsv_from_unit, hsv2rgb, rgb_from_packed, rgb_to_packed, wheel};

pub(crate) use utils::packed;

pub type Rgb = RGB8;
pub type Hsv = HSV;

/// All channels off
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
