// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The iteration functions.  Each one takes a point on the complex
//! plane and runs it through a map until it either leaves (escape
//! time) or settles (root convergence), or until the step budget runs
//! out.  The result is an IterationRecord, which the colour schemes
//! turn into a pixel.

use num::Complex;

/// Extra iterations run after a Mandelbrot point escapes.  They shrink
/// the error of the smooth colouring term.
pub const CORRECTION_STEPS: usize = 4;

/// The outcome of iterating one point.
///
/// For Mandelbrot, `aux1` and `aux2` are the squared real and imaginary
/// parts of Z when iteration stopped.  For Newton they are the plain
/// real and imaginary parts.  `n == max_steps` means the point never
/// escaped (or never converged).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IterationRecord {
    /// Steps taken, at most `max_steps`.
    pub n: usize,
    /// First auxiliary term.
    pub aux1: f64,
    /// Second auxiliary term.
    pub aux2: f64,
}

impl IterationRecord {
    /// True when the point used up the whole step budget.
    pub fn is_interior(&self, max_steps: usize) -> bool {
        self.n == max_steps
    }
}

/// The two supported maps, each carrying its own threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Algorithm {
    /// Z <- Z² + c from Z = 0, stopping once |Z|² exceeds
    /// `escape_radius`.  The radius is compared against the squared
    /// magnitude as given; it is not squared again.
    Mandelbrot {
        /// Squared-magnitude escape threshold.
        escape_radius: f64,
    },
    /// Newton's method on e^z - 1 from Z = c, stopping once |f(Z)|²
    /// drops below `tolerance`.
    Newton {
        /// Squared-magnitude convergence tolerance.
        tolerance: f64,
    },
}

impl Algorithm {
    /// A Newton iteration whose tolerance is `10^-radius`; a larger
    /// radius asks for a tighter convergence.
    pub fn newton_from_radius(radius: f64) -> Self {
        Algorithm::Newton {
            tolerance: 10f64.powf(-radius),
        }
    }

    /// Iterate `c` for at most `max_steps` steps.
    pub fn iterate(&self, c: Complex<f64>, max_steps: usize) -> IterationRecord {
        match *self {
            Algorithm::Mandelbrot { escape_radius } => mandelbrot(c, escape_radius, max_steps),
            Algorithm::Newton { tolerance } => newton(c, tolerance, max_steps),
        }
    }

    /// Short name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Mandelbrot { .. } => "mandelbrot",
            Algorithm::Newton { .. } => "newton",
        }
    }
}

/// This is our classic escape-time function.  The squares of the two
/// components are kept around between steps since both the escape
/// test and the next step need them.
pub fn mandelbrot(c: Complex<f64>, escape_radius: f64, max_steps: usize) -> IterationRecord {
    let (mut zr, mut zi, mut tr, mut ti) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    let mut n = 0;

    while n < max_steps && tr + ti <= escape_radius {
        zi = 2.0 * zr * zi + c.im;
        zr = tr - ti + c.re;
        tr = zr * zr;
        ti = zi * zi;
        n += 1;
    }

    for _ in 0..CORRECTION_STEPS {
        zi = 2.0 * zr * zi + c.im;
        zr = tr - ti + c.re;
        tr = zr * zr;
        ti = zi * zi;
    }

    IterationRecord {
        n,
        aux1: tr,
        aux2: ti,
    }
}

/// Newton's method for f(z) = e^z - 1.  The update z - f(z)/f'(z)
/// simplifies to z - 1 + e^-z, so there is nothing to divide by.
pub fn newton(c: Complex<f64>, tolerance: f64, max_steps: usize) -> IterationRecord {
    let mut z = c;
    let mut n = 0;
    let mut converged = false;

    while n < max_steps && !converged {
        let (sin, cos) = z.im.sin_cos();
        let grow = z.re.exp();
        let fr = -1.0 + grow * cos;
        let fi = grow * sin;

        let shrink = (-z.re).exp();
        z = Complex::new(z.re - 1.0 + shrink * cos, z.im - shrink * sin);
        n += 1;
        converged = fr * fr + fi * fi < tolerance;
    }

    if !converged {
        n = max_steps;
    }

    IterationRecord {
        n,
        aux1: z.re,
        aux2: z.im,
    }
}
