#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progressive fractal renderer
//!
//! Takes a view of the complex plane and draws it into a pixel buffer
//! one scanline at a time.  Each pixel is a point that gets run
//! through an iteration: the Mandelbrot map z² + c, which we watch to
//! see how quickly it flies off to infinity, or Newton's method on
//! e^z - 1, which we watch to see how quickly it settles onto a root.
//! How long that takes, plus a little smoothing, picks the colour.
//!
//! Rendering is cooperative.  The renderer draws for a while, then
//! hands control back so the caller can react to the user; if the
//! user has asked for a different picture in the meantime, the old
//! render notices the next time it resumes and simply stops.
//!
//! ```no_run
//! use scanbrot::{Canvas, SessionController, Step};
//!
//! let mut controller = SessionController::default();
//! let mut canvas = Canvas::new(640, 480);
//! let mut renderer = controller.begin(640, 480).renderer();
//! while let Step::Yielded(progress) = renderer.resume(&mut canvas) {
//!     println!("{}", progress);
//! }
//! ```

pub mod canvas;
pub mod colors;
pub mod config;
pub mod errors;
pub mod iterate;
pub mod planes;
pub mod progress;
pub mod render;
pub mod session;

pub use canvas::{Canvas, RenderTarget, SharedCanvas};
pub use colors::{ColorScheme, Rgba};
pub use config::{RenderConfig, RenderState};
pub use errors::ConfigError;
pub use iterate::{Algorithm, IterationRecord};
pub use planes::{Pixel, PlaneMapper, Viewport};
pub use progress::Progress;
pub use render::{Phase, ProgressiveRenderer, Step};
pub use session::{Session, SessionController, SessionToken, ViewportRequest};
