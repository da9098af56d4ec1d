// THEORY:
// An `Image` ties a `Matrix` to the two facts the codec needs to serialize it: its
// dimensions and its `PixelKind`. The dimensions are read from the matrix itself, so
// they cannot drift from the storage. The kind decides whether the codec emits one
// or three bytes per cell; color operations that change the representation of every
// cell (luma, gray conversion) also flip the kind.
//
// Every cell of an image has the representation its kind names. `set` refuses a cell
// of the other representation, `from_matrix` checks the whole matrix, and mutable
// matrix access stays inside the crate.

use crate::core_modules::matrix::{Coordinate, Matrix};
use crate::core_modules::pixel::pixel::{Channel, Pixel, PixelKind};
use crate::error::{PnmError, Result};

/// A decoded or constructed PNM image: dimensions, kind and owned pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    kind: PixelKind,
    pixels: Matrix,
}

impl Image {
    /// A zero-filled image of the given kind.
    pub fn new(width: u32, height: u32, kind: PixelKind) -> Result<Self> {
        let pixels = Matrix::allocate(width, height, kind.blank_pixel())?;
        Ok(Self { kind, pixels })
    }

    /// Wraps an existing matrix whose cells must all be of `kind`.
    pub fn from_matrix(kind: PixelKind, pixels: Matrix) -> Result<Self> {
        if let Some(cell) = pixels.pixels().find(|px| px.kind() != kind) {
            return Err(PnmError::KindMismatch {
                requested: kind,
                found: cell.kind(),
            });
        }
        Ok(Self { kind, pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: PixelKind) {
        self.kind = kind;
    }

    pub fn pixels(&self) -> &Matrix {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut Matrix {
        &mut self.pixels
    }

    pub fn into_matrix(self) -> Matrix {
        self.pixels
    }

    pub fn get(&self, row: Coordinate, col: Coordinate) -> Option<&Pixel> {
        self.pixels.get(row, col)
    }

    /// Stores `pixel` at `(row, col)`. Returns `None` when the coordinate is out of
    /// bounds or the cell is not of this image's kind; the image is left untouched.
    pub fn set(&mut self, row: Coordinate, col: Coordinate, pixel: Pixel) -> Option<&Pixel> {
        if pixel.kind() != self.kind {
            return None;
        }
        self.pixels.set(row, col, pixel)
    }

    /// Calls `op` with every cell in row-major order along with its `(row, col)`.
    /// Cells `op` turns into the other representation are converted back to the
    /// image's kind.
    pub fn for_each_pixel<F>(&mut self, mut op: F)
    where
        F: FnMut(usize, usize, &mut Pixel),
    {
        let kind = self.kind;
        for (r, row) in self.pixels.rows_mut().enumerate() {
            for (c, px) in row.iter_mut().enumerate() {
                op(r, c, px);
                px.coerce_to(kind);
            }
        }
    }

    /// Writes channel `which` into the gray slot of every cell, keeping each cell's
    /// representation. On an RGB image the other two channels are kept.
    pub fn extract_channel_in_place(&mut self, which: Channel) {
        self.pixels.extract_channel_in_place(which);
    }

    pub fn deep_copy(&self) -> Result<Self> {
        Ok(Self {
            kind: self.kind,
            pixels: self.pixels.deep_copy()?,
        })
    }

    /// Size in bytes of the binary payload this image serializes to.
    pub fn payload_len(&self) -> usize {
        self.pixels.len() * self.kind.bytes_per_pixel()
    }
}
