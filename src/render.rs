// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The progressive renderer.
//!
//! A render is a run of scanlines, top row first.  The renderer works
//! through them until it has been busy for longer than the session's
//! update interval, then paints a marker on the next row, reports
//! progress and returns, so that whoever drives it can deal with
//! other business (a new viewport, a resize) before calling `resume`
//! again.  It only ever stops between scanlines.
//!
//! Before every scanline the renderer checks that its session is still
//! the live one and that the target is still the size it was opened
//! for.  If either has changed, the render is abandoned: no error, no
//! more writes.

use std::time::Instant;

use log::{debug, info, trace};
use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{RenderTarget, BYTES_PER_PIXEL};
use crate::colors::Rgba;
use crate::config::RenderConfig;
use crate::progress::Progress;
use crate::session::Session;

/// Where a renderer is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Created, nothing drawn.
    Idle,
    /// Some scanlines drawn, more to come.
    Rendering,
    /// Every scanline drawn.
    Completed,
    /// Abandoned for a newer session or a resized target.
    Superseded,
}

/// What happened during one call to `resume`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Time to let the host breathe; call `resume` again later.
    Yielded(Progress),
    /// The last scanline is in.
    Completed(Progress),
    /// The session is stale.  Nothing more will be written.
    Superseded,
}

/// Random offsets inside one pixel cell, for supersampling.  An axis
/// whose step has collapsed to nothing (deep zooms run out of f64
/// precision) is not jittered.
#[derive(Debug)]
struct Jitter {
    re: Option<Uniform<f64>>,
    im: Option<Uniform<f64>>,
}

impl Jitter {
    fn new(dx: f64, dy: f64) -> Self {
        Jitter {
            re: Jitter::cell(dx),
            im: Jitter::cell(dy),
        }
    }

    // No jitter at all; one-sample renders never draw from it.
    fn none() -> Self {
        Jitter { re: None, im: None }
    }

    fn cell(step: f64) -> Option<Uniform<f64>> {
        if step.is_finite() && step > 0.0 {
            Some(Uniform::new(0.0, step))
        } else {
            None
        }
    }

    // Half of a uniform draw over the cell, on each axis.
    fn offset<R: Rng>(&self, rng: &mut R) -> Complex<f64> {
        let re = Jitter::half(&self.re, rng);
        let im = Jitter::half(&self.im, rng);
        Complex::new(re, im)
    }

    fn half<R: Rng>(axis: &Option<Uniform<f64>>, rng: &mut R) -> f64 {
        axis.as_ref().map_or(0.0, |range| range.sample(rng) / 2.0)
    }
}

/// The colour of one pixel whose nominal point is `c`.
///
/// With one sample the point is used as is.  With more, each sample is
/// jittered within the cell and the colours are averaged, with alpha
/// forced opaque.
fn shade_pixel<R: Rng>(config: &RenderConfig, jitter: &Jitter, rng: &mut R, c: Complex<f64>) -> Rgba {
    if config.super_samples <= 1 {
        return config.shade(c);
    }
    let mut sum = Rgba([0.0; 4]);
    for _ in 0..config.super_samples {
        sum = sum + config.shade(c - jitter.offset(rng));
    }
    (sum / config.super_samples as f64).with_opaque_alpha()
}

/// Draws one session, a scanline at a time.
#[derive(Debug)]
pub struct ProgressiveRenderer {
    session: Session,
    phase: Phase,
    row: usize,
    pixels: usize,
    started: Instant,
    last_update: Instant,
    jitter: Jitter,
    rng: StdRng,
    line: Vec<u8>,
}

impl ProgressiveRenderer {
    /// A renderer seeded from system entropy.
    pub fn new(session: Session) -> Self {
        ProgressiveRenderer::with_rng(session, StdRng::from_entropy())
    }

    /// A renderer whose supersampling jitter is reproducible.
    pub fn seeded(session: Session, seed: u64) -> Self {
        ProgressiveRenderer::with_rng(session, StdRng::seed_from_u64(seed))
    }

    fn with_rng(session: Session, rng: StdRng) -> Self {
        let now = Instant::now();
        let jitter = if session.config.super_samples > 1 {
            Jitter::new(session.mapper.dx, session.mapper.dy)
        } else {
            Jitter::none()
        };
        let line = vec![0; session.mapper.width() * BYTES_PER_PIXEL];
        ProgressiveRenderer {
            session,
            phase: Phase::Idle,
            row: 0,
            pixels: 0,
            started: now,
            last_update: now,
            jitter,
            rng,
            line,
        }
    }

    /// The session being drawn.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Where the renderer is in its life.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How far along the render is right now.
    pub fn progress(&self) -> Progress {
        Progress {
            session: self.session.id(),
            rows_done: self.row,
            rows_total: self.session.mapper.height(),
            pixels: self.pixels,
            elapsed: self.started.elapsed(),
        }
    }

    /// Draws scanlines until the update interval runs out, the image is
    /// done, or the session turns out to be stale.
    pub fn resume<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> Step {
        match self.phase {
            Phase::Completed => return Step::Completed(self.progress()),
            Phase::Superseded => return Step::Superseded,
            Phase::Idle => {
                self.started = Instant::now();
                self.last_update = self.started;
                self.phase = Phase::Rendering;
            }
            Phase::Rendering => {}
        }

        loop {
            if !self.session.is_current() || target.dimensions() != self.session.dimensions() {
                debug!(
                    "session {} superseded after {} rows",
                    self.session.id(),
                    self.row
                );
                self.phase = Phase::Superseded;
                return Step::Superseded;
            }

            self.draw_scanline();
            target.commit(self.row, &self.line);
            self.row += 1;
            self.pixels += self.session.mapper.width();

            if self.row == self.session.mapper.height() {
                self.phase = Phase::Completed;
                let progress = self.progress();
                info!(
                    "session {} done in {}s, {}",
                    progress.session,
                    progress.elapsed_display(),
                    progress.throughput()
                );
                target.progress(&progress);
                return Step::Completed(progress);
            }

            let now = Instant::now();
            if now.duration_since(self.last_update) >= self.session.config.update_interval {
                self.last_update = now;
                self.draw_highlight(target);
                let progress = self.progress();
                trace!("{}", progress);
                target.progress(&progress);
                return Step::Yielded(progress);
            }
        }
    }

    /// Drives the render to its end without ever handing control back.
    pub fn run_to_completion<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> Step {
        loop {
            match self.resume(target) {
                Step::Yielded(_) => continue,
                done => return done,
            }
        }
    }

    fn draw_scanline(&mut self) {
        let mapper = &self.session.mapper;
        let config = &self.session.config;
        let ci = mapper.y_range.0 + (self.row as f64) * mapper.dy;
        let mut cr = mapper.x_range.0;

        for pixel in self.line.chunks_mut(BYTES_PER_PIXEL) {
            let color = shade_pixel(config, &self.jitter, &mut self.rng, Complex::new(cr, ci));
            pixel.copy_from_slice(&color.to_bytes());
            cr += mapper.dx;
        }
    }

    // Shows where the render has got to.  The marked row is the next
    // one to be drawn, so it gets overwritten on the next resume.
    fn draw_highlight<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        let marker = Rgba::HIGHLIGHT.to_bytes();
        let line: Vec<u8> = marker
            .iter()
            .cycle()
            .take(self.line.len())
            .cloned()
            .collect();
        target.commit(self.row, &line);
    }
}
