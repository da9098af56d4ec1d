// THEORY:
// The `Matrix` module owns the 2D pixel grid behind every `Image`. It is a
// "dumb" container in the same sense as `Pixel`: it knows its shape, how to hand
// out cells by coordinate, and how to copy itself, but nothing about files.
//
// Key architectural principles:
// 1.  **Rows as the unit of storage**: The grid is `height` boxed rows of exactly
//     `width` cells each, held in one owned `Vec`. Rows are addressable on their own;
//     the matrix is released as a whole when it is dropped.
// 2.  **Transactional allocation**: `allocate` reserves every row fallibly. If any
//     reservation fails, the rows built so far are dropped before the error is
//     returned, so a half-built matrix can never escape.
// 3.  **Checked coordinates**: Coordinates are signed so that callers walking a
//     neighborhood can pass `-1` and get `None` back, exactly like `row == height`
//     or `col == width`. Both halves of the bound are always checked.
// 4.  **Channel extraction through the shared slot**: `extract_channel` writes the
//     chosen source channel into the gray slot of the destination cell. When source
//     and destination are the same matrix (`extract_channel_in_place`) an RGB cell
//     keeps its other channels, which is what lets the Y, Cb and Cr planes be pulled
//     out one after another.

use crate::core_modules::pixel::pixel::{Channel, GrayPixel, Pixel, RgbPixel};
use crate::error::{PnmError, Result};
use log::debug;

pub type Row = Box<[Pixel]>;
pub type Coordinate = i64;

/// A `height` x `width` grid of pixel cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    width: u32,
    height: u32,
    rows: Vec<Row>,
}

impl Matrix {
    /// Allocates a `width` x `height` matrix with every cell set to `fill`.
    ///
    /// Returns `PnmError::Allocation` if any part of the storage cannot be
    /// reserved. No partially built matrix is ever returned.
    pub fn allocate(width: u32, height: u32, fill: Pixel) -> Result<Self> {
        let failed = || PnmError::Allocation { width, height };

        let mut rows: Vec<Row> = Vec::new();
        rows.try_reserve_exact(height as usize).map_err(|_| failed())?;

        for _ in 0..height {
            let mut row: Vec<Pixel> = Vec::new();
            // The unwind relies on `?`: returning drops `rows`, and with it every row
            // finished so far, before the error reaches the caller.
            row.try_reserve_exact(width as usize).map_err(|_| failed())?;
            row.resize(width as usize, fill);
            rows.push(row.into_boxed_slice());
        }

        debug!("allocated {width}x{height} pixel matrix");
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells in the matrix.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `(row, col)` addresses a cell of this matrix.
    pub fn in_bounds(&self, row: Coordinate, col: Coordinate) -> bool {
        (0..self.height as Coordinate).contains(&row)
            && (0..self.width as Coordinate).contains(&col)
    }

    fn index(&self, row: Coordinate, col: Coordinate) -> Option<(usize, usize)> {
        self.in_bounds(row, col).then_some((row as usize, col as usize))
    }

    /// The cell at `(row, col)`, `(0, 0)` being the top-left corner.
    pub fn get(&self, row: Coordinate, col: Coordinate) -> Option<&Pixel> {
        let (r, c) = self.index(row, col)?;
        Some(&self.rows[r][c])
    }

    pub fn get_mut(&mut self, row: Coordinate, col: Coordinate) -> Option<&mut Pixel> {
        let (r, c) = self.index(row, col)?;
        Some(&mut self.rows[r][c])
    }

    /// Stores `pixel` at `(row, col)` and returns the placed cell, or `None`
    /// (leaving the matrix untouched) when the coordinate is out of bounds.
    pub fn set(&mut self, row: Coordinate, col: Coordinate, pixel: Pixel) -> Option<&Pixel> {
        let cell = self.get_mut(row, col)?;
        *cell = pixel;
        Some(&*cell)
    }

    /// The cell at `(row, col)` viewed as RGB; gray cells are expanded.
    pub fn get_rgb(&self, row: Coordinate, col: Coordinate) -> Option<RgbPixel> {
        self.get(row, col).map(Pixel::to_rgb)
    }

    /// The cell at `(row, col)` viewed as gray, reading the shared first slot.
    pub fn get_gray(&self, row: Coordinate, col: Coordinate) -> Option<GrayPixel> {
        self.get(row, col).map(|px| GrayPixel::new(px.gray_value()))
    }

    pub fn row(&self, row: usize) -> Option<&[Pixel]> {
        self.rows.get(row).map(|r| &r[..])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.rows.iter().map(|r| &r[..])
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [Pixel]> {
        self.rows.iter_mut().map(|r| &mut r[..])
    }

    /// Every cell in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &Pixel> {
        self.rows.iter().flat_map(|r| r.iter())
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut Pixel> {
        self.rows.iter_mut().flat_map(|r| r.iter_mut())
    }

    /// Allocates a fresh matrix of the same shape and copies every row into it.
    /// The copy shares no storage with `self`.
    pub fn deep_copy(&self) -> Result<Self> {
        let mut copy = Self::allocate(self.width, self.height, Pixel::default())?;
        for (dest, src) in copy.rows.iter_mut().zip(&self.rows) {
            dest.copy_from_slice(src);
        }
        Ok(copy)
    }

    /// Writes channel `which` of every `src` cell into the gray slot of the cell at
    /// the same coordinate in `self`.
    ///
    /// Gray destination cells take the value; RGB destination cells take it in
    /// their red channel (the gray slot) and keep green and blue.
    pub fn extract_channel(&mut self, src: &Matrix, which: Channel) -> Result<()> {
        if self.width != src.width || self.height != src.height {
            return Err(PnmError::DimensionMismatch {
                dest_width: self.width,
                dest_height: self.height,
                src_width: src.width,
                src_height: src.height,
            });
        }

        for (dest_row, src_row) in self.rows.iter_mut().zip(&src.rows) {
            for (dest, src) in dest_row.iter_mut().zip(src_row.iter()) {
                dest.set_gray_value(src.channel(which));
            }
        }
        Ok(())
    }

    /// `extract_channel` with `self` as both source and destination.
    pub fn extract_channel_in_place(&mut self, which: Channel) {
        for px in self.pixels_mut() {
            let v = px.channel(which);
            px.set_gray_value(v);
        }
    }
}
