// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colour schemes.  A scheme takes an IterationRecord and the step
//! budget that produced it, and returns an RGBA colour.  Channels are
//! kept as floating point until they are written into a pixel buffer,
//! where they get rounded and clamped; supersampling averages the
//! unrounded values.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Div};
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::iterate::IterationRecord;

/// `1 / ln 2`, for turning natural logarithms into base two.
pub const LOG_BASE: f64 = 1.0 / std::f64::consts::LN_2;

/// `ln(0.5) / ln 2`, which is -1 give or take a rounding.
pub const LOG_HALF_BASE: f64 = -std::f64::consts::LN_2 * LOG_BASE;

/// Spreads Newton branch indices across the colour cube.
pub const NEWTON_COLOR_FACTOR: i64 = 1_000_003;

/// An RGBA colour with unrounded channels on a 0-255 scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba(pub [f64; 4]);

impl Rgba {
    /// What points that never escape (or never converge) look like.
    pub const INTERIOR: Rgba = Rgba([0.0, 0.0, 0.0, 255.0]);

    /// The colour painted just below the line being rendered.
    pub const HIGHLIGHT: Rgba = Rgba([255.0, 59.0, 3.0, 255.0]);

    /// An opaque colour.
    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Rgba([r, g, b, 255.0])
    }

    /// An opaque grey.
    pub fn gray(v: f64) -> Self {
        Rgba::opaque(v, v, v)
    }

    /// Rounds and clamps each channel into a byte.  NaN becomes zero.
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        for (byte, channel) in out.iter_mut().zip(self.0.iter()) {
            *byte = channel.round().max(0.0).min(255.0) as u8;
        }
        out
    }

    /// Same colour with alpha forced to opaque.
    pub fn with_opaque_alpha(self) -> Self {
        let [r, g, b, _] = self.0;
        Rgba::opaque(r, g, b)
    }
}

impl Add for Rgba {
    type Output = Rgba;

    fn add(self, other: Rgba) -> Rgba {
        let (a, b) = (self.0, other.0);
        Rgba([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
    }
}

impl Div<f64> for Rgba {
    type Output = Rgba;

    fn div(self, d: f64) -> Rgba {
        let a = self.0;
        Rgba([a[0] / d, a[1] / d, a[2] / d, a[3] / d])
    }
}

/// Continuous iteration count, `1 + n - log2(log|Z|)` rewritten for the
/// squared terms the Mandelbrot iteration keeps.  The four correction
/// steps are why this starts at five.
pub fn smooth(n: usize, tr: f64, ti: f64) -> f64 {
    5.0 + (n as f64) - LOG_HALF_BASE - (tr + ti).ln().ln() * LOG_BASE
}

/// Sector-based HSV to RGB.  `hue` is in degrees, `saturation` and
/// `value` in [0,1]; a value outside that is clamped into it, and a NaN
/// value is zero.  Hues outside [0,360) have no chroma.  Channels come
/// back on a 0-255 scale, unrounded.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [f64; 3] {
    let value = value.max(0.0).min(1.0);
    let hp = hue / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());

    let (r, g, b) = if (0.0..1.0).contains(&hp) {
        (c, x, 0.0)
    } else if (1.0..2.0).contains(&hp) {
        (x, c, 0.0)
    } else if (2.0..3.0).contains(&hp) {
        (0.0, c, x)
    } else if (3.0..4.0).contains(&hp) {
        (0.0, x, c)
    } else if (4.0..5.0).contains(&hp) {
        (x, 0.0, c)
    } else if (5.0..6.0).contains(&hp) {
        (c, 0.0, x)
    } else {
        (0.0, 0.0, 0.0)
    };

    let m = value - c;
    [(r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0]
}

/// The available colour schemes.  The first five are meant for
/// escape-time records, the last two for Newton records.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    /// Full saturation and value, hue follows the smooth count.
    Hsv1,
    /// Like Hsv1, but dark near the set and brightening outwards.
    Hsv2,
    /// Hsv2 with red and blue exchanged.
    Hsv3,
    /// Grey level follows the smooth count.
    Grayscale,
    /// Grayscale, with the interior shaded by final magnitude.
    Grayscale2,
    /// Grey level follows how quickly a root was found.
    NewtonGrayscale,
    /// Colour picked by which root was found, dimmed by how long it took.
    NewtonColorful,
}

impl ColorScheme {
    /// Every scheme, in menu order.
    pub const ALL: [ColorScheme; 7] = [
        ColorScheme::Hsv1,
        ColorScheme::Hsv2,
        ColorScheme::Hsv3,
        ColorScheme::Grayscale,
        ColorScheme::Grayscale2,
        ColorScheme::NewtonGrayscale,
        ColorScheme::NewtonColorful,
    ];

    /// The name this scheme goes by in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Hsv1 => "hsv1",
            ColorScheme::Hsv2 => "hsv2",
            ColorScheme::Hsv3 => "hsv3",
            ColorScheme::Grayscale => "grayscale",
            ColorScheme::Grayscale2 => "grayscale2",
            ColorScheme::NewtonGrayscale => "newton-grayscale",
            ColorScheme::NewtonColorful => "newton-colorful",
        }
    }

    /// Colour for one record out of a budget of `max_steps`.
    pub fn color_of(&self, record: &IterationRecord, max_steps: usize) -> Rgba {
        let steps = max_steps as f64;
        match self {
            ColorScheme::Grayscale2 => grayscale2(record, max_steps),
            _ if record.is_interior(max_steps) => Rgba::INTERIOR,
            ColorScheme::Hsv1 => {
                let v = smooth(record.n, record.aux1, record.aux2);
                let [r, g, b] = hsv_to_rgb(360.0 * v / steps, 1.0, 1.0);
                Rgba::opaque(r, g, b)
            }
            ColorScheme::Hsv2 => {
                let v = smooth(record.n, record.aux1, record.aux2);
                let [r, g, b] = hsv_to_rgb(360.0 * v / steps, 1.0, 10.0 * v / steps);
                Rgba::opaque(r, g, b)
            }
            ColorScheme::Hsv3 => {
                let [r, g, b, a] = ColorScheme::Hsv2.color_of(record, max_steps).0;
                Rgba([b, g, r, a])
            }
            ColorScheme::Grayscale => grayscale(record, max_steps),
            ColorScheme::NewtonGrayscale => {
                Rgba::gray(255.0 * (steps - record.n as f64) / steps)
            }
            ColorScheme::NewtonColorful => newton_colorful(record, max_steps),
        }
    }
}

// The non-interior branch of the grey schemes.
fn grayscale(record: &IterationRecord, max_steps: usize) -> Rgba {
    let v = smooth(record.n, record.aux1, record.aux2);
    let v = (512.0 * v / max_steps as f64).floor();
    Rgba::gray(v.max(0.0).min(255.0))
}

fn grayscale2(record: &IterationRecord, max_steps: usize) -> Rgba {
    if !record.is_interior(max_steps) {
        return grayscale(record, max_steps);
    }
    let magnitude = (record.aux1 + record.aux2).sqrt();
    let c = 255.0 - (255.0 * magnitude).floor() % 255.0;
    Rgba::gray(c.max(0.0).min(255.0))
}

// Which root a Newton point landed on is read off the imaginary part,
// since the roots of e^z - 1 sit at 2πk i.
fn newton_colorful(record: &IterationRecord, max_steps: usize) -> Rgba {
    let rounded = (record.aux2 / (2.0 * PI)).round() as i64;
    let mut product = rounded.wrapping_mul(NEWTON_COLOR_FACTOR);

    let mut channels = [0.0; 3];
    for channel in channels.iter_mut() {
        let mut c = product % 255;
        if c < 0 {
            c += 255;
        }
        *channel = c as f64;
        product /= 255;
    }

    let shade = (max_steps - record.n) as f64 / max_steps as f64;
    Rgba::opaque(
        channels[0] * shade,
        channels[1] * shade,
        channels[2] * shade,
    )
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .iter()
            .find(|scheme| scheme.name() == s)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownScheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterate::Algorithm;
    use num::Complex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn record(n: usize, aux1: f64, aux2: f64) -> IterationRecord {
        IterationRecord { n, aux1, aux2 }
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0.0, 255.0, 0.0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0.0, 0.0, 255.0]);
    }

    #[test]
    fn hsv_value_is_capped_at_one() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 7.5), hsv_to_rgb(0.0, 1.0, 1.0));
    }

    #[test]
    fn hsv_out_of_range_hue_is_black() {
        assert_eq!(hsv_to_rgb(400.0, 1.0, 1.0), [0.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(-10.0, 1.0, 1.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn smoothing_matches_the_textbook_form() {
        for &(n, tr, ti) in &[(3, 40.0_f64, 90.0_f64), (10, 1.0e6, 3.0e6), (0, 5.0, 0.5)] {
            let modulus = (tr + ti).sqrt();
            let textbook = 5.0 + n as f64 - modulus.ln().log2();
            assert!((smooth(n, tr, ti) - textbook).abs() < 1e-9);
        }
    }

    #[test]
    fn interior_points_are_black() {
        let interior = record(50, 0.25, 0.5);
        for scheme in &[
            ColorScheme::Hsv1,
            ColorScheme::Hsv2,
            ColorScheme::Hsv3,
            ColorScheme::Grayscale,
            ColorScheme::NewtonGrayscale,
            ColorScheme::NewtonColorful,
        ] {
            assert_eq!(scheme.color_of(&interior, 50), Rgba::INTERIOR, "{}", scheme);
        }
    }

    #[test]
    fn grayscale2_shades_the_interior_by_magnitude() {
        let a = ColorScheme::Grayscale2.color_of(&record(50, 0.0, 0.0), 50);
        assert_eq!(a, Rgba::gray(255.0));
        // 255 - floor(255 * sqrt(0.25))
        let b = ColorScheme::Grayscale2.color_of(&record(50, 0.25, 0.0), 50);
        assert_eq!(b, Rgba::gray(128.0));
        let c = ColorScheme::Grayscale2.color_of(&record(50, 0.0, 0.25), 50);
        assert_eq!(b, c);
    }

    #[test]
    fn grayscale2_matches_grayscale_outside() {
        let r = Algorithm::Mandelbrot { escape_radius: 4.0 }.iterate(Complex::new(0.5, 0.5), 50);
        assert!(!r.is_interior(50));
        assert_eq!(
            ColorScheme::Grayscale2.color_of(&r, 50),
            ColorScheme::Grayscale.color_of(&r, 50)
        );
    }

    #[test]
    fn hsv3_swaps_red_and_blue() {
        let r = record(7, 300.0, 400.0);
        let [r2, g2, b2, _] = ColorScheme::Hsv2.color_of(&r, 50).0;
        let [r3, g3, b3, _] = ColorScheme::Hsv3.color_of(&r, 50).0;
        assert_eq!((r3, g3, b3), (b2, g2, r2));
    }

    #[test]
    fn newton_grayscale_fades_with_steps() {
        assert_eq!(
            ColorScheme::NewtonGrayscale.color_of(&record(0, 0.0, 0.0), 10),
            Rgba::gray(255.0)
        );
        assert_eq!(
            ColorScheme::NewtonGrayscale.color_of(&record(5, 0.0, 0.0), 10),
            Rgba::gray(127.5)
        );
    }

    #[test]
    fn newton_colorful_decomposes_the_branch() {
        // 1_000_003 = 15 * 255² + 96 * 255 + 148
        let c = ColorScheme::NewtonColorful.color_of(&record(0, 0.0, 2.0 * PI), 10);
        assert_eq!(c, Rgba::opaque(148.0, 96.0, 15.0));
        let c = ColorScheme::NewtonColorful.color_of(&record(0, 0.0, -2.0 * PI), 10);
        assert_eq!(c, Rgba::opaque(107.0, 159.0, 240.0));
        let c = ColorScheme::NewtonColorful.color_of(&record(5, 0.0, 2.0 * PI), 10);
        assert_eq!(c, Rgba::opaque(74.0, 48.0, 7.5));
    }

    #[test]
    fn every_scheme_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mandel = Algorithm::Mandelbrot { escape_radius: 10.0 };
        let newton = Algorithm::newton_from_radius(4.0);
        for _ in 0..500 {
            let c = Complex::new(rng.gen_range(-3.0..3.0), rng.gen_range(-8.0..8.0));
            for &steps in &[1, 5, 64] {
                for record in &[mandel.iterate(c, steps), newton.iterate(c, steps)] {
                    for scheme in ColorScheme::ALL.iter() {
                        let Rgba(channels) = scheme.color_of(record, steps);
                        assert!(
                            channels.iter().all(|ch| ch.is_finite() && *ch >= 0.0 && *ch <= 255.0),
                            "{} {:?} gave {:?}",
                            scheme,
                            record,
                            channels
                        );
                        assert_eq!(channels[3], 255.0);
                    }
                }
            }
        }
    }

    #[test]
    fn hsv_values_are_clamped() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 2.0), [255.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(0.0, 1.0, -0.5), [0.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(0.0, 1.0, std::f64::NAN), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn degenerate_records_stay_in_bounds() {
        let inf = std::f64::INFINITY;
        let records = [
            record(0, inf, inf),
            record(0, -inf, inf),
            record(3, 1.0, 1.0),
            record(10, inf, std::f64::NAN),
            record(2, -3.0, 0.5),
        ];
        for r in records.iter() {
            for scheme in ColorScheme::ALL.iter() {
                let Rgba(channels) = scheme.color_of(r, 10);
                assert!(
                    channels.iter().all(|ch| ch.is_finite() && *ch >= 0.0 && *ch <= 255.0),
                    "{} {:?} gave {:?}",
                    scheme,
                    r,
                    channels
                );
            }
        }
    }

    #[test]
    fn bytes_are_rounded_and_clamped() {
        let c = Rgba([-4.0, 127.5, 300.0, std::f64::NAN]);
        assert_eq!(c.to_bytes(), [0, 128, 255, 0]);
    }

    #[test]
    fn names_round_trip() {
        for scheme in ColorScheme::ALL.iter() {
            assert_eq!(scheme.name().parse::<ColorScheme>(), Ok(*scheme));
        }
        assert_eq!(
            "plaid".parse::<ColorScheme>(),
            Err(ConfigError::UnknownScheme("plaid".to_string()))
        );
    }
}
