// THEORY:
// This file is the entry point of the `pnm_matrix` library crate. It exposes a binary
// PNM codec (`codec`) over an owned pixel matrix (`core_modules`), plus the channel
// operations the command-line converters built on top of it need: gray conversion,
// luma, YCbCr/YUV and single-plane extraction.
//
// The usual flow is read -> transform -> write:
//
//     let mut img = pnm_matrix::read("in.ppm", PixelKind::Rgb)?;
//     pnm_matrix::color_ops::luma(&mut img);
//     pnm_matrix::write("out.pgm", &img)?;
//
// Argument parsing, output naming and exit codes belong to those converters, not to
// this crate.

pub mod codec;
pub mod core_modules;
pub mod error;

pub use crate::codec::{
    CodecConfig, PnmCodec, PnmHeader, decode_bytes, encode, encode_as, encode_to_vec, read,
    read_any, read_header, write, write_as,
};
pub use crate::core_modules::color_ops::{self, Plane};
pub use crate::core_modules::image::Image;
pub use crate::core_modules::matrix::Matrix;
pub use crate::core_modules::pixel::pixel::{
    Channel, GrayPixel, Pixel, PixelKind, RgbPixel, grayscale_from_scalar, rgb_to_grayscale,
    set_gray, set_rgb,
};
pub use crate::core_modules::utils::image_helper::image_helper;
pub use crate::error::{FormatError, PnmError, Result};
