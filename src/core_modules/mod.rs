pub mod color_ops;
pub mod image;
pub mod matrix;
pub mod pixel;
pub mod utils;
