// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pixel buffers the renderer can write into.
//!
//! The renderer only knows the RenderTarget trait: something with a
//! size that accepts whole scanlines and, optionally, progress
//! reports.  Canvas is the plain in-memory version.  SharedCanvas
//! wraps one in a mutex for hosts that render on one thread and start
//! new sessions from another.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::ColorType;

use crate::progress::Progress;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Where a render's scanlines and progress reports go.
pub trait RenderTarget {
    /// Current width and height in pixels.  A render whose session was
    /// opened for other dimensions stops at its next scanline.
    fn dimensions(&self) -> (usize, usize);

    /// Store one complete row of RGBA bytes.
    fn commit(&mut self, row: usize, scanline: &[u8]);

    /// Hear about progress.  Ignored unless overridden.
    fn progress(&mut self, _progress: &Progress) {}
}

/// A row-major RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// A transparent black canvas.
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![0; width * height * BYTES_PER_PIXEL],
        }
    }

    /// Changes the size and clears the contents.
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Canvas::new(width, height);
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// All of the bytes, row by row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// The bytes of one row.
    pub fn row(&self, row: usize) -> &[u8] {
        let stride = self.width * BYTES_PER_PIXEL;
        &self.pixels[row * stride..(row + 1) * stride]
    }

    /// One pixel.
    pub fn pixel(&self, column: usize, row: usize) -> [u8; 4] {
        let offset = (row * self.width + column) * BYTES_PER_PIXEL;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        out
    }

    /// Writes the canvas as an image; the format follows the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), failure::Error> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            ColorType::Rgba8,
        )?;
        Ok(())
    }
}

impl RenderTarget for Canvas {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn commit(&mut self, row: usize, scanline: &[u8]) {
        let stride = self.width * BYTES_PER_PIXEL;
        assert_eq!(scanline.len(), stride, "scanline does not fit row {}", row);
        self.pixels[row * stride..(row + 1) * stride].copy_from_slice(scanline);
    }
}

/// A Canvas behind a mutex.  Clones share the same pixels.
#[derive(Clone, Debug)]
pub struct SharedCanvas(Arc<Mutex<Canvas>>);

impl SharedCanvas {
    /// A new shared, transparent black canvas.
    pub fn new(width: usize, height: usize) -> Self {
        SharedCanvas(Arc::new(Mutex::new(Canvas::new(width, height))))
    }

    /// Locks the canvas.  A poisoned lock is taken over; the most it
    /// can be guarding is one torn row.
    pub fn lock(&self) -> MutexGuard<Canvas> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> Canvas {
        self.lock().clone()
    }

    /// Resizes and clears the shared canvas.
    pub fn resize(&self, width: usize, height: usize) {
        self.lock().resize(width, height)
    }
}

impl RenderTarget for SharedCanvas {
    fn dimensions(&self) -> (usize, usize) {
        self.lock().dimensions()
    }

    fn commit(&mut self, row: usize, scanline: &[u8]) {
        self.lock().commit(row, scanline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_blank() {
        let c = Canvas::new(3, 2);
        assert_eq!(c.as_bytes().len(), 24);
        assert!(c.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn commit_fills_one_row() {
        let mut c = Canvas::new(2, 3);
        c.commit(1, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(c.row(0), &[0; 8]);
        assert_eq!(c.row(1), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(c.pixel(1, 1), [5, 6, 7, 8]);
    }

    #[test]
    #[should_panic]
    fn short_scanlines_are_refused() {
        Canvas::new(2, 2).commit(0, &[0; 4]);
    }

    #[test]
    fn shared_clones_see_the_same_pixels() {
        let a = SharedCanvas::new(1, 1);
        let mut b = a.clone();
        b.commit(0, &[9, 9, 9, 255]);
        assert_eq!(a.snapshot().pixel(0, 0), [9, 9, 9, 255]);
        a.resize(4, 4);
        assert_eq!(b.dimensions(), (4, 4));
    }

    #[test]
    fn save_writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut c = Canvas::new(2, 2);
        c.commit(0, &[255, 0, 0, 255, 0, 255, 0, 255]);
        c.save(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
