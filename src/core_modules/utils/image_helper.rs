// Bridges between `Image` and the `image` crate, for callers that want to hand a
// decoded PNM to the wider ecosystem or dump a debugging PNG.

pub mod image_helper {
    use crate::core_modules::image::Image;
    use crate::core_modules::pixel::pixel::{Pixel, PixelKind};
    use crate::error::Result;
    use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, Luma, Rgb, RgbImage};
    use std::path::Path;

    /// Copies `img` into an `image::DynamicImage` of the matching color type.
    pub fn to_dynamic_image(img: &Image) -> DynamicImage {
        let matrix = img.pixels();
        let cell = |x: u32, y: u32| {
            matrix
                .get(i64::from(y), i64::from(x))
                .copied()
                .unwrap_or_default()
        };
        let (width, height) = (img.width(), img.height());

        match img.kind() {
            PixelKind::Gray => DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
                Luma([cell(x, y).gray_value()])
            })),
            PixelKind::Rgb => DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                let px = cell(x, y).to_rgb();
                Rgb([px.r, px.g, px.b])
            })),
        }
    }

    /// Builds an `Image` from any `image::DynamicImage`. Single-channel 8-bit images
    /// become gray; everything else is converted to 8-bit RGB, dropping alpha.
    pub fn from_dynamic_image(dynamic: &DynamicImage) -> Result<Image> {
        let (width, height) = (dynamic.width(), dynamic.height());

        if let Some(gray) = dynamic.as_luma8() {
            let mut img = Image::new(width, height, PixelKind::Gray)?;
            for (cell, luma) in img.pixels_mut().pixels_mut().zip(gray.pixels()) {
                *cell = Pixel::gray(luma.0[0]);
            }
            return Ok(img);
        }

        let rgb = dynamic.to_rgb8();
        let mut img = Image::new(width, height, PixelKind::Rgb)?;
        for (cell, px) in img.pixels_mut().pixels_mut().zip(rgb.pixels()) {
            let [r, g, b] = px.0;
            *cell = Pixel::rgb(r, g, b);
        }
        Ok(img)
    }

    /// Saves `img` as a PNG, for eyeballing intermediate results.
    pub fn save_png(
        path: impl AsRef<Path>,
        img: &Image,
    ) -> std::result::Result<(), image::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        let (width, height) = (img.width(), img.height());

        match to_dynamic_image(img) {
            DynamicImage::ImageLuma8(buffer) => {
                encoder.write_image(&buffer, width, height, ExtendedColorType::L8)?
            }
            other => {
                let buffer = other.to_rgb8();
                encoder.write_image(&buffer, width, height, ExtendedColorType::Rgb8)?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::image::Image;
    use crate::core_modules::pixel::pixel::{Pixel, PixelKind};

    fn gradient(kind: PixelKind) -> Image {
        let mut img = Image::new(4, 3, kind).expect("Error creating image.");
        let mut intensity = 0u8;
        for px in img.pixels_mut().pixels_mut() {
            *px = match kind {
                PixelKind::Gray => Pixel::gray(intensity),
                PixelKind::Rgb => Pixel::rgb(intensity, 255 - intensity, intensity / 2),
            };
            intensity = intensity.wrapping_add(20);
        }
        img
    }

    #[test]
    fn dynamic_image_round_trip() {
        for kind in [PixelKind::Gray, PixelKind::Rgb] {
            let img = gradient(kind);
            let dynamic = to_dynamic_image(&img);
            assert_eq!((dynamic.width(), dynamic.height()), (4, 3));
            let back = from_dynamic_image(&dynamic).expect("Error converting image.");
            assert_eq!(back, img);
        }
    }

    #[test]
    fn dynamic_image_is_row_major() {
        let mut img = Image::new(2, 1, PixelKind::Gray).expect("Error creating image.");
        img.set(0, 1, Pixel::gray(200));
        let dynamic = to_dynamic_image(&img);
        let gray = dynamic.as_luma8().expect("Expected a luma image.");
        assert_eq!(gray.get_pixel(1, 0).0, [200]);
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn save_gradient_png() {
        let path = std::env::temp_dir()
            .join(format!("pnm_matrix_gradient_{}.png", std::process::id()));
        save_png(&path, &gradient(PixelKind::Rgb)).expect("Error Saving File.");

        let reloaded = image::open(&path).expect("Error reopening PNG.");
        assert_eq!((reloaded.width(), reloaded.height()), (4, 3));
        let _ = std::fs::remove_file(&path);
    }
}
