//! Type definitions of Float and Spectrum, otherwise constants and
//! functions which can be used almost everywhere else in the code.

// std
use std::f32::consts::PI;
// rs_scene
use crate::core::spectrum::RGBSpectrum;

pub type Spectrum = RGBSpectrum;

pub type Float = f32;

pub const INV_PI: Float = 0.318_309_886_183_790_671_54;
pub const INV_4_PI: Float = 0.079_577_471_545_947_667_88;
pub const SHADOW_EPSILON: Float = 0.0001;
pub const RAY_EPSILON: Float = 1.0e-4;

/// Is used to write sRGB-compatible 8-bit image files.
pub fn gamma_correct(value: Float) -> Float {
    if value <= 0.003_130_8 {
        12.92 * value
    } else {
        1.055 as Float * value.powf((1.0 / 2.4) as Float) - 0.055
    }
}

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Interpolate linearly between two provided values.
pub fn lerp(t: Float, a: Float, b: Float) -> Float {
    (1.0 as Float - t) * a + t * b
}

/// Convert from angles expressed in degrees to radians.
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert from angles expressed in radians to degrees.
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gamma_is_continuous_at_the_knee() {
        let below = gamma_correct(0.003_130_7);
        let above = gamma_correct(0.003_130_9);
        assert!((below - above).abs() < 1.0e-4);
    }

    #[test]
    fn degrees_and_radians_invert() {
        assert!((degrees(radians(37.5)) - 37.5).abs() < 1.0e-4);
        assert_eq!(clamp_t(3, 0, 2), 2);
        assert_eq!(lerp(0.25, 0.0, 4.0), 1.0);
    }
}
