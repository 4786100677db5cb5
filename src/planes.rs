// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport and PlaneMapper structs.  A Viewport is the
//! user's idea of where they are looking: a point on the complex plane
//! and how much of the plane they want to see around it.  A
//! PlaneMapper is what the renderer needs: the closed ranges of the
//! complex plane covered by an integral pixel plane of a given size,
//! and the distance between neighbouring pixels on each axis.
use num::Complex;

use crate::errors::ConfigError;

/// Where the explorer looks when nobody has told it otherwise.
pub const DEFAULT_LOOK_AT: Complex<f64> = Complex { re: -0.6, im: 0.0 };

/// The default span of the plane, on both axes.
pub const DEFAULT_ZOOM: f64 = 3.4;

// Two ratios closer than this are considered the same aspect.
const ASPECT_EPSILON: f64 = 1e-12;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a pixel in an integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A look-at point plus the width and height of the complex plane
/// visible around it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// The centre of the view.
    pub look_at: Complex<f64>,
    /// Width and height of the visible region, in plane units.
    pub zoom: (f64, f64),
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            look_at: DEFAULT_LOOK_AT,
            zoom: (DEFAULT_ZOOM, DEFAULT_ZOOM),
        }
    }
}

impl Viewport {
    /// Constructor.
    pub fn new(look_at: Complex<f64>, zoom: (f64, f64)) -> Self {
        Viewport { look_at, zoom }
    }

    /// Checks that the view can be mapped at all: a finite look-at
    /// point and finite, positive spans.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.look_at.re.is_finite() && self.look_at.im.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "lookAt",
                reason: format!("must be finite, got {}", self.look_at),
            });
        }
        let (w, h) = self.zoom;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "zoom",
                reason: format!("spans must be finite and positive, got {},{}", w, h),
            });
        }
        Ok(())
    }

    /// Corrects the stored zoom so that one pixel covers the same
    /// distance on both axes, then returns the mapper for an integral
    /// plane of `width` x `height`.  The wider of the two aspects wins:
    /// the span on the other axis grows to match, around the look-at
    /// point.  Calling this again with the same dimensions changes
    /// nothing.
    ///
    /// Panics on an empty pixel plane or a view that fails `validate`;
    /// both are bugs in whoever handed them to us.
    pub fn compute_ranges(&mut self, width: usize, height: usize) -> PlaneMapper {
        assert!(
            width > 0 && height > 0,
            "cannot map a {}x{} pixel plane",
            width,
            height
        );
        if let Err(e) = self.validate() {
            panic!("cannot map this view: {}", e);
        }

        let plane_ratio = self.zoom.0 / self.zoom.1;
        let screen_ratio = (width as f64) / (height as f64);
        if (screen_ratio / plane_ratio - 1.0).abs() > ASPECT_EPSILON {
            if screen_ratio > plane_ratio {
                self.zoom.0 *= screen_ratio / plane_ratio;
            } else {
                self.zoom.1 *= plane_ratio / screen_ratio;
            }
        }

        PlaneMapper::new(width, height, self.look_at, self.zoom)
    }

    /// Recentres on the point under `pixel` and multiplies both spans
    /// by `factor`.  Factors below one zoom in.
    pub fn zoom_at_pixel(&mut self, mapper: &PlaneMapper, pixel: &Pixel, factor: f64) {
        self.look_at = mapper.pixel_to_point(pixel);
        self.zoom = (self.zoom.0 * factor, self.zoom.1 * factor);
    }

    /// Makes the rectangle spanned by two opposite corner pixels the
    /// whole view.  The next `compute_ranges` restores the aspect.
    pub fn zoom_to_box(&mut self, mapper: &PlaneMapper, from: &Pixel, to: &Pixel) {
        let a = mapper.pixel_to_point(from);
        let b = mapper.pixel_to_point(to);
        self.look_at = (a + b) / 2.0;
        self.zoom = ((b.re - a.re).abs(), (b.im - a.im).abs());
    }
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and the closed region of the complex plane it covers.  Maps points
/// from one to the other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// Lowest and highest real value covered.
    pub x_range: (f64, f64),
    /// Lowest and highest imaginary value covered.
    pub y_range: (f64, f64),
    /// Real distance between horizontally adjacent pixels.
    pub dx: f64,
    /// Imaginary distance between vertically adjacent pixels.
    pub dy: f64,
}

impl PlaneMapper {
    /// Builds the mapper for a region centred on `look_at`.  The step
    /// divides by `size - 0.5` rather than `size - 1` so samples sit
    /// inside their pixel cells.
    pub fn new(width: usize, height: usize, look_at: Complex<f64>, zoom: (f64, f64)) -> Self {
        let x_range = (look_at.re - zoom.0 / 2.0, look_at.re + zoom.0 / 2.0);
        let y_range = (look_at.im - zoom.1 / 2.0, look_at.im + zoom.1 / 2.0);
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            x_range,
            y_range,
            dx: (x_range.1 - x_range.0) / (0.5 + (width as f64) - 1.0),
            dy: (y_range.1 - y_range.0) / (0.5 + (height as f64) - 1.0),
        }
    }

    /// Width of the integral plane.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the integral plane.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// Given a pixel on the integral cartesian plane, map it to the
    /// point on the complex plane it samples.  Row zero is the bottom
    /// of the imaginary range.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.x_range.0 + (pixel.0 as f64) * self.dx,
            self.y_range.0 + (pixel.1 as f64) * self.dy,
        )
    }
}
