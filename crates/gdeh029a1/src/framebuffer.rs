//! In-memory framebuffer for GDEH029A1.

use crate::protocol::{BUFFER_SIZE, HEIGHT, LINE_BYTES, WIDTH};

/// How logical coordinates map onto the native portrait panel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Rotation {
    /// Native 128x296.
    #[default]
    Rotate0,
    /// 296x128, logical x runs down the panel.
    Rotate90,
}

/// 1bpp framebuffer in controller RAM layout.
///
/// A set bit is a white pixel. Bit 7 is the first pixel in each byte.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
    rotation: Rotation,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a new white framebuffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; BUFFER_SIZE],
            rotation: Rotation::Rotate0,
        }
    }

    pub fn bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Logical `(width, height)` under the current rotation.
    pub fn logical_size(&self) -> (usize, usize) {
        match self.rotation {
            Rotation::Rotate0 => (WIDTH, HEIGHT),
            Rotation::Rotate90 => (HEIGHT, WIDTH),
        }
    }

    /// Fills with black (`black = true`) or white.
    pub fn clear(&mut self, black: bool) {
        self.bytes.fill(if black { 0x00 } else { 0xFF });
    }

    /// Sets a pixel in logical coordinates.
    ///
    /// Returns `true` when the pixel is in bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, black: bool) -> bool {
        let Some((byte_index, bit_mask)) = self.locate(x, y) else {
            return false;
        };

        if black {
            self.bytes[byte_index] &= !bit_mask;
        } else {
            self.bytes[byte_index] |= bit_mask;
        }
        true
    }

    /// Reads a pixel in logical coordinates. `Some(true)` is black.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        let (byte_index, bit_mask) = self.locate(x, y)?;
        Some(self.bytes[byte_index] & bit_mask == 0)
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        let (width, height) = self.logical_size();
        if x >= width || y >= height {
            return None;
        }

        let (nx, ny) = match self.rotation {
            Rotation::Rotate0 => (x, y),
            Rotation::Rotate90 => (WIDTH - 1 - y, x),
        };
        Some((ny * LINE_BYTES + nx / 8, 1u8 << (7 - (nx % 8))))
    }
}
