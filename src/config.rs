// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render settings, and the small text format used to share them.
//!
//! A RenderConfig is fixed for the lifetime of one session.  The
//! RenderState is the part of the configuration plus viewport that
//! defines what an image looks like; it can be written out as a
//! `key=value&key=value` string and read back without loss.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use num::Complex;

use crate::colors::{ColorScheme, Rgba};
use crate::errors::ConfigError;
use crate::iterate::Algorithm;
use crate::planes::{PlaneMapper, Viewport};

/// Default step budget.
pub const DEFAULT_STEPS: usize = 50;

/// Default Mandelbrot escape threshold (on the squared magnitude).
pub const DEFAULT_ESCAPE_RADIUS: f64 = 10.0;

/// Default time between progress reports.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// A step budget that grows as the view shrinks, so that deep zooms
/// get the extra iterations they need without the user asking.
pub fn auto_steps(mapper: &PlaneMapper) -> usize {
    let span = (mapper.x_range.1 - mapper.x_range.0)
        .abs()
        .min((mapper.y_range.1 - mapper.y_range.0).abs());
    let f = (0.001 + 2.0 * span).sqrt();
    ((223.0 / f).floor() as usize).max(1)
}

/// Everything a session needs to know besides where to look.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Iteration budget per sample.
    pub max_steps: usize,
    /// Which map to iterate, with its threshold.
    pub algorithm: Algorithm,
    /// How records become colours.
    pub scheme: ColorScheme,
    /// Samples per pixel.  One means no jitter at all.
    pub super_samples: usize,
    /// How long the renderer may work before handing control back.
    pub update_interval: Duration,
    /// Replace `max_steps` with `auto_steps` at the start of each session.
    pub auto_steps: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            max_steps: DEFAULT_STEPS,
            algorithm: Algorithm::Mandelbrot {
                escape_radius: DEFAULT_ESCAPE_RADIUS,
            },
            scheme: ColorScheme::Hsv1,
            super_samples: 1,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            auto_steps: false,
        }
    }
}

impl RenderConfig {
    /// Checks the ranges the renderer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps < 1 {
            return Err(ConfigError::OutOfRange {
                field: "iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.super_samples < 1 {
            return Err(ConfigError::OutOfRange {
                field: "superSamples",
                reason: "must be at least 1".to_string(),
            });
        }
        match self.algorithm {
            Algorithm::Mandelbrot { escape_radius } if !(escape_radius > 0.0) => {
                Err(ConfigError::OutOfRange {
                    field: "escapeRadius",
                    reason: format!("must be positive, got {}", escape_radius),
                })
            }
            Algorithm::Newton { tolerance } if !(tolerance > 0.0) => Err(ConfigError::OutOfRange {
                field: "tolerance",
                reason: format!("must be positive, got {}", tolerance),
            }),
            _ => Ok(()),
        }
    }

    /// Iterate and colour one point.
    pub fn shade(&self, c: Complex<f64>) -> Rgba {
        let record = self.algorithm.iterate(c, self.max_steps);
        self.scheme.color_of(&record, self.max_steps)
    }
}

/// The values that define a picture, in a form that can be handed to
/// someone else.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderState {
    /// Width and height of the view.
    pub zoom: (f64, f64),
    /// Centre of the view.
    pub look_at: Complex<f64>,
    /// Iteration budget.
    pub iterations: usize,
    /// Samples per pixel.
    pub super_samples: usize,
    /// The map, with its escape radius or convergence tolerance.
    pub algorithm: Algorithm,
    /// Colour scheme.
    pub scheme: ColorScheme,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState::from_parts(&Viewport::default(), &RenderConfig::default())
    }
}

impl RenderState {
    /// Captures the shareable part of a viewport and configuration.
    pub fn from_parts(viewport: &Viewport, config: &RenderConfig) -> Self {
        RenderState {
            zoom: viewport.zoom,
            look_at: viewport.look_at,
            iterations: config.max_steps,
            super_samples: config.super_samples,
            algorithm: config.algorithm,
            scheme: config.scheme,
        }
    }

    /// Writes this state into a viewport and configuration, leaving the
    /// settings it does not cover alone.
    pub fn apply(&self, viewport: &mut Viewport, config: &mut RenderConfig) {
        viewport.zoom = self.zoom;
        viewport.look_at = self.look_at;
        config.max_steps = self.iterations;
        config.super_samples = self.super_samples;
        config.algorithm = self.algorithm;
        config.scheme = self.scheme;
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "zoom={},{}&lookAt={},{}&iterations={}&superSamples={}",
            self.zoom.0,
            self.zoom.1,
            self.look_at.re,
            self.look_at.im,
            self.iterations,
            self.super_samples
        )?;
        match self.algorithm {
            Algorithm::Mandelbrot { escape_radius } => write!(f, "&escapeRadius={}", escape_radius)?,
            Algorithm::Newton { tolerance } => write!(f, "&tolerance={}", tolerance)?,
        }
        write!(f, "&colorScheme={}", self.scheme)
    }
}

fn bad_field(field: &str, value: &str) -> ConfigError {
    ConfigError::BadField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| bad_field(field, value))
}

impl FromStr for RenderState {
    type Err = ConfigError;

    /// Reads the format written by `Display`.  Missing fields keep
    /// their defaults; unknown fields are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = RenderState::default();
        let s = s.trim_start_matches('#');

        for part in s.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match part.find('=') {
                Some(index) => (&part[..index], &part[index + 1..]),
                None => return Err(bad_field(part, "")),
            };
            match key {
                "zoom" => {
                    state.zoom = parse_pair(value, ',').ok_or_else(|| bad_field(key, value))?;
                }
                "lookAt" => {
                    state.look_at = parse_complex(value).ok_or_else(|| bad_field(key, value))?;
                }
                "iterations" => state.iterations = parse_field(key, value)?,
                "superSamples" => state.super_samples = parse_field(key, value)?,
                "escapeRadius" => {
                    state.algorithm = Algorithm::Mandelbrot {
                        escape_radius: parse_field(key, value)?,
                    };
                }
                "tolerance" => {
                    state.algorithm = Algorithm::Newton {
                        tolerance: parse_field(key, value)?,
                    };
                }
                "colorScheme" => state.scheme = value.parse()?,
                _ => debug!("ignoring unknown state field {:?}", key),
            }
        }
        Ok(state)
    }
}
