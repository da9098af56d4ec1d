use pnm_matrix::{Image, Pixel, PixelKind};
use std::path::PathBuf;

/// Deterministic xorshift stream so failures reproduce.
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_byte(&mut self) -> u8 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 32) as u8
    }
}

/// An image of `kind` filled with pseudo-random pixels.
pub fn noise_image(width: u32, height: u32, kind: PixelKind, seed: u64) -> Image {
    let mut noise = Noise::new(seed);
    let mut img = Image::new(width, height, kind).expect("Error creating image.");
    for row in 0..height as i64 {
        for col in 0..width as i64 {
            let px = match kind {
                PixelKind::Gray => Pixel::gray(noise.next_byte()),
                PixelKind::Rgb => {
                    Pixel::rgb(noise.next_byte(), noise.next_byte(), noise.next_byte())
                }
            };
            img.set(row, col, px).expect("Error placing pixel.");
        }
    }
    img
}

/// The 2x2 PPM used by the conversion tests.
pub fn sample_ppm_bytes() -> Vec<u8> {
    let mut bytes = b"P6\n2 2 255\n".to_vec();
    bytes.extend_from_slice(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]);
    bytes
}

/// A path under the system temp dir, unique to this process and `name`.
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pnm_matrix_{}_{name}", std::process::id()))
}
