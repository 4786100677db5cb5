// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render sessions.
//!
//! Every time the picture has to be redrawn, the SessionController
//! hands out a new Session with a new id.  The id is the whole of the
//! cancellation story: nobody ever tells an old render to stop.  It
//! notices on its own, the next time it checks its token against the
//! live counter, and quietly walks away.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use num::Complex;

use crate::config::{auto_steps, RenderConfig, RenderState};
use crate::planes::{Pixel, PlaneMapper, Viewport};
use crate::render::ProgressiveRenderer;

/// Zoom factor for a plain click.
pub const CLICK_ZOOM: f64 = 0.5;

/// A session's claim on the live counter.
#[derive(Clone, Debug)]
pub struct SessionToken {
    id: usize,
    live: Arc<AtomicUsize>,
}

impl SessionToken {
    /// The id captured when the session began.
    pub fn id(&self) -> usize {
        self.id
    }

    /// False once any newer session has begun.
    pub fn is_current(&self) -> bool {
        self.live.load(Ordering::SeqCst) == self.id
    }
}

/// One render pass over a fixed viewport and configuration.
#[derive(Clone, Debug)]
pub struct Session {
    /// Used to find out whether this session is still wanted.
    pub token: SessionToken,
    /// The aspect-corrected viewport.
    pub viewport: Viewport,
    /// Settings for this pass.
    pub config: RenderConfig,
    /// Pixel-to-plane mapping for this pass.
    pub mapper: PlaneMapper,
}

impl Session {
    /// The session id.
    pub fn id(&self) -> usize {
        self.token.id()
    }

    /// Whether a newer session has started.
    pub fn is_current(&self) -> bool {
        self.token.is_current()
    }

    /// The pixel dimensions this session was opened for.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.mapper.width(), self.mapper.height())
    }

    /// A renderer for this session, jittering from system entropy.
    pub fn renderer(self) -> ProgressiveRenderer {
        ProgressiveRenderer::new(self)
    }
}

/// Changes to what the user is looking at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ViewportRequest {
    /// Recentre without zooming.
    LookAt(Complex<f64>),
    /// Set the visible span.
    Zoom(f64, f64),
    /// Recentre on a pixel of the last session and scale the span.
    ZoomAtPixel {
        /// The pixel clicked.
        pixel: Pixel,
        /// Span multiplier; below one zooms in.
        factor: f64,
    },
    /// Show exactly the box between two pixels of the last session.
    ZoomToBox {
        /// Where the drag started.
        from: Pixel,
        /// Where it ended.
        to: Pixel,
    },
    /// Back to the starting view.
    Reset,
}

/// Owns the live session counter, the current viewport and the current
/// configuration.  Viewport and configuration change only through this
/// object, and only between sessions.
#[derive(Debug)]
pub struct SessionController {
    live: Arc<AtomicUsize>,
    viewport: Viewport,
    config: RenderConfig,
    last_mapper: Option<PlaneMapper>,
}

impl Default for SessionController {
    fn default() -> Self {
        SessionController::new(Viewport::default(), RenderConfig::default())
    }
}

impl SessionController {
    /// Constructor.  No session is live until `begin` is called.
    pub fn new(viewport: Viewport, config: RenderConfig) -> Self {
        SessionController {
            live: Arc::new(AtomicUsize::new(0)),
            viewport,
            config,
            last_mapper: None,
        }
    }

    /// The viewport the next session will use.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The configuration the next session will use.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replaces the configuration for future sessions.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// The id of the newest session, zero before the first.
    pub fn current_id(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// The shareable description of the current view.
    pub fn state(&self) -> RenderState {
        RenderState::from_parts(&self.viewport, &self.config)
    }

    /// Adopts a shared view.
    pub fn restore(&mut self, state: &RenderState) {
        state.apply(&mut self.viewport, &mut self.config);
    }

    /// Opens a new session for a `width` x `height` buffer.  Whatever
    /// session was live before is superseded from this moment on.
    ///
    /// Panics if the configuration is invalid or the buffer is empty.
    pub fn begin(&mut self, width: usize, height: usize) -> Session {
        if let Err(e) = self.config.validate() {
            panic!("refusing to start a session: {}", e);
        }

        let id = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        let mapper = self.viewport.compute_ranges(width, height);
        let mut config = self.config;
        if config.auto_steps {
            config.max_steps = auto_steps(&mapper);
        }
        self.last_mapper = Some(mapper);

        debug!(
            "session {} begins: {}x{} at {} span {:?}, {} steps, {}",
            id,
            width,
            height,
            self.viewport.look_at,
            self.viewport.zoom,
            config.max_steps,
            config.scheme
        );

        Session {
            token: SessionToken {
                id,
                live: Arc::clone(&self.live),
            },
            viewport: self.viewport,
            config,
            mapper,
        }
    }

    /// Applies a viewport change.  Requests given in pixels need a
    /// session to have mapped the pixels first; without one they are
    /// dropped and this returns false.
    pub fn request(&mut self, request: ViewportRequest) -> bool {
        match request {
            ViewportRequest::LookAt(point) => self.viewport.look_at = point,
            ViewportRequest::Zoom(width, height) => self.viewport.zoom = (width, height),
            ViewportRequest::Reset => self.viewport = Viewport::default(),
            ViewportRequest::ZoomAtPixel { pixel, factor } => match self.last_mapper {
                Some(ref mapper) => self.viewport.zoom_at_pixel(mapper, &pixel, factor),
                None => return self.unmapped(request),
            },
            ViewportRequest::ZoomToBox { from, to } => match self.last_mapper {
                // A box without area is a click.
                Some(ref mapper) if from.0 == to.0 || from.1 == to.1 => {
                    self.viewport.zoom_at_pixel(mapper, &to, CLICK_ZOOM)
                }
                Some(ref mapper) => self.viewport.zoom_to_box(mapper, &from, &to),
                None => return self.unmapped(request),
            },
        }
        true
    }

    fn unmapped(&self, request: ViewportRequest) -> bool {
        warn!("no session has mapped pixels yet, dropping {:?}", request);
        false
    }
}
