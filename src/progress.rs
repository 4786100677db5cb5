// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! How far along a render is, and how fast it is going.

use std::fmt;
use std::time::Duration;

const PREFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];

/// Formats a positive number with two decimals and a metric prefix:
/// `1500` is `"1.50k"`.  Returns None for zero, negative or non-finite
/// input, where a prefix makes no sense.
pub fn metric_units(value: f64) -> Option<String> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let magnitude = ((1.0 + value.log10()) / 3.0).ceil();
    let magnitude = magnitude.max(1.0).min(PREFIXES.len() as f64) as usize;
    let scaled = value / 10f64.powi(3 * (magnitude as i32 - 1));
    Some(format!("{:.2}{}", scaled, PREFIXES[magnitude - 1]))
}

/// The time unit a throughput figure is given in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RateUnit {
    /// Pixels per second.
    Second,
    /// Pixels per minute, for renders too slow to show per second.
    Minute,
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RateUnit::Second => f.write_str("second"),
            RateUnit::Minute => f.write_str("minute"),
        }
    }
}

/// Whole pixels per unit of time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Throughput {
    /// The rate, floored to whole pixels.
    pub value: f64,
    /// What the rate is per.
    pub unit: RateUnit,
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match metric_units(self.value) {
            Some(value) => write!(f, "{} pixels/{}", value, self.unit),
            None => write!(f, "- pixels/{}", self.unit),
        }
    }
}

/// A snapshot of a running (or finished) render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    /// Session the snapshot belongs to.
    pub session: usize,
    /// Scanlines committed so far.
    pub rows_done: usize,
    /// Scanlines in the whole image.
    pub rows_total: usize,
    /// Pixels committed so far.
    pub pixels: usize,
    /// Time since the session started rendering.
    pub elapsed: Duration,
}

impl Progress {
    /// Elapsed seconds with one decimal.
    pub fn elapsed_display(&self) -> String {
        format!("{:.1}", duration_secs(self.elapsed))
    }

    /// Pixels per second, or per minute when the per-second figure
    /// rounds down to nothing or cannot be computed.
    pub fn throughput(&self) -> Throughput {
        let secs = duration_secs(self.elapsed);
        let per_second = (self.pixels as f64 / secs).floor();
        if metric_units(per_second).is_some() {
            return Throughput {
                value: per_second,
                unit: RateUnit::Second,
            };
        }
        Throughput {
            value: (60.0 * self.pixels as f64 / secs).floor(),
            unit: RateUnit::Minute,
        }
    }

    /// True once every scanline is in.
    pub fn is_complete(&self) -> bool {
        self.rows_done == self.rows_total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "session {}: {}/{} rows in {}s, {}",
            self.session,
            self.rows_done,
            self.rows_total,
            self.elapsed_display(),
            self.throughput()
        )
    }
}

fn duration_secs(d: Duration) -> f64 {
    d.as_secs() as f64 + f64::from(d.subsec_nanos()) * 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(pixels: usize, elapsed: Duration) -> Progress {
        Progress {
            session: 1,
            rows_done: 1,
            rows_total: 2,
            pixels,
            elapsed,
        }
    }

    #[test]
    fn metric_prefixes() {
        assert_eq!(metric_units(1500.0), Some("1.50k".to_string()));
        assert_eq!(metric_units(2_500_000.0), Some("2.50M".to_string()));
        assert_eq!(metric_units(42.0), Some("42.00".to_string()));
        assert_eq!(metric_units(7.0e9), Some("7.00G".to_string()));
    }

    #[test]
    fn degenerate_values_have_no_units() {
        assert_eq!(metric_units(0.0), None);
        assert_eq!(metric_units(-3.0), None);
        assert_eq!(metric_units(std::f64::INFINITY), None);
        assert_eq!(metric_units(std::f64::NAN), None);
    }

    #[test]
    fn fast_renders_report_per_second() {
        let t = progress(3000, Duration::from_secs(2)).throughput();
        assert_eq!(t.unit, RateUnit::Second);
        assert_eq!(t.value, 1500.0);
        assert_eq!(t.to_string(), "1.50k pixels/second");
    }

    #[test]
    fn slow_renders_fall_back_to_per_minute() {
        let t = progress(10, Duration::from_secs(20)).throughput();
        assert_eq!(t.unit, RateUnit::Minute);
        assert_eq!(t.value, 30.0);
    }

    #[test]
    fn instant_renders_do_not_divide_by_zero() {
        let t = progress(10, Duration::from_secs(0)).throughput();
        assert_eq!(t.unit, RateUnit::Minute);
        assert_eq!(t.to_string(), "- pixels/minute");
    }

    #[test]
    fn elapsed_has_one_decimal() {
        let p = progress(1, Duration::from_millis(1340));
        assert_eq!(p.elapsed_display(), "1.3");
        assert!(!p.is_complete());
    }
}
