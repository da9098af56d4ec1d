// THEORY:
// The `color_ops` module holds every whole-image channel transform. Each transform is
// written once as a per-pixel function (`rgb_to_luma`, `rgb_to_ycbcr`, ...) and lifted
// to a full image through `apply_to_pixels`.
//
// Key architectural principles:
// 1.  **In place**: `rgb_to_gray_image`, `luma`, `ycbcr` and `yuv` rewrite the image
//     they are given. Gray conversion and luma are irreversible and flip the image to
//     `PixelKind::Gray`.
// 2.  **Same layout, new meaning**: `ycbcr` stores Y, Cb and Cr in the slots that held
//     R, G and B. The image stays RGB-kind; `extract_plane` then pulls any of the three
//     planes out as its own grayscale image.
// 3.  **Truncation**: Every float result is converted with `as u8`, which truncates
//     toward zero and saturates at 0 and 255. Nothing is rounded.

use crate::core_modules::image::Image;
use crate::core_modules::pixel::pixel::{
    Channel, ChannelValue, GrayPixel, Pixel, PixelKind, RgbPixel, rgb_to_grayscale,
};
use crate::error::{PnmError, Result};

/// The three planes `ycbcr` leaves behind, by the slot each one occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Y,
    Cb,
    Cr,
}

impl Plane {
    pub fn channel(self) -> Channel {
        match self {
            Plane::Y => Channel::Red,
            Plane::Cb => Channel::Green,
            Plane::Cr => Channel::Blue,
        }
    }
}

#[inline]
fn to_channel(value: f64) -> ChannelValue {
    value as ChannelValue
}

/// `Y = 0.299R + 0.587G + 0.114B`, truncated.
pub fn rgb_to_luma(px: &RgbPixel) -> GrayPixel {
    GrayPixel::new(to_channel(px.luminance()))
}

/// Full-range YCbCr stored as `(Y, Cb, Cr)` in the `(r, g, b)` slots.
pub fn rgb_to_ycbcr(px: &RgbPixel) -> RgbPixel {
    let (r, g, b) = (px.r as f64, px.g as f64, px.b as f64);
    RgbPixel {
        r: to_channel(px.luminance()),
        g: to_channel(-0.1687 * r - 0.3313 * g + 0.5 * b + 128.0),
        b: to_channel(0.5 * r - 0.4187 * g - 0.0813 * b + 128.0),
    }
}

/// Analog YUV (BT.601 weights) with U and V offset by 128, stored as `(Y, U, V)`.
pub fn rgb_to_yuv(px: &RgbPixel) -> RgbPixel {
    let y = px.luminance();
    RgbPixel {
        r: to_channel(y),
        g: to_channel(0.492 * (px.b as f64 - y) + 128.0),
        b: to_channel(0.877 * (px.r as f64 - y) + 128.0),
    }
}

/// Runs `op` on every cell of `img`, row by row. A cell `op` leaves in the other
/// representation is converted back to the image's kind.
pub fn apply_to_pixels<F>(img: &mut Image, mut op: F)
where
    F: FnMut(&mut Pixel),
{
    img.for_each_pixel(|_, _, px| op(px));
}

// Caller flips the kind afterwards.
fn rewrite_cells<F>(img: &mut Image, op: F)
where
    F: FnMut(&mut Pixel),
{
    img.pixels_mut().pixels_mut().for_each(op);
}

/// Replaces every cell with its per-channel-truncated gray value and marks the
/// image gray. Gray images are left as they are.
pub fn rgb_to_gray_image(img: &mut Image) {
    if img.kind() == PixelKind::Gray {
        return;
    }
    rewrite_cells(img, |px| *px = Pixel::Gray(rgb_to_grayscale(&px.to_rgb())));
    img.set_kind(PixelKind::Gray);
}

/// Replaces every cell with its luma and marks the image gray. Gray images are
/// left as they are.
pub fn luma(img: &mut Image) {
    if img.kind() == PixelKind::Gray {
        return;
    }
    rewrite_cells(img, |px| *px = Pixel::Gray(rgb_to_luma(&px.to_rgb())));
    img.set_kind(PixelKind::Gray);
}

/// Expands a gray image into an RGB image with equal channels.
pub fn gray_to_rgb_image(img: &mut Image) {
    if img.kind() == PixelKind::Rgb {
        return;
    }
    rewrite_cells(img, |px| *px = Pixel::Rgb(px.to_rgb()));
    img.set_kind(PixelKind::Rgb);
}

fn require_rgb(img: &Image) -> Result<()> {
    match img.kind() {
        PixelKind::Rgb => Ok(()),
        found => Err(PnmError::KindMismatch {
            requested: PixelKind::Rgb,
            found,
        }),
    }
}

/// Rewrites every `(R, G, B)` cell as `(Y, Cb, Cr)` in place. The image stays
/// RGB-kind; use `extract_plane` to split out the planes.
pub fn ycbcr(img: &mut Image) -> Result<()> {
    require_rgb(img)?;
    apply_to_pixels(img, |px| *px = Pixel::Rgb(rgb_to_ycbcr(&px.to_rgb())));
    Ok(())
}

/// Rewrites every `(R, G, B)` cell as `(Y, U, V)` in place.
pub fn yuv(img: &mut Image) -> Result<()> {
    require_rgb(img)?;
    apply_to_pixels(img, |px| *px = Pixel::Rgb(rgb_to_yuv(&px.to_rgb())));
    Ok(())
}

/// Copies channel `which` of `img` into a new, independent grayscale image.
pub fn extract_channel(img: &Image, which: Channel) -> Result<Image> {
    let mut out = Image::new(img.width(), img.height(), PixelKind::Gray)?;
    out.pixels_mut().extract_channel(img.pixels(), which)?;
    Ok(out)
}

/// Pulls the Y, Cb or Cr plane out of an image previously passed through `ycbcr`.
pub fn extract_plane(img: &Image, which: Plane) -> Result<Image> {
    extract_channel(img, which.channel())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rgb() -> Image {
        let mut img = Image::new(2, 2, PixelKind::Rgb).expect("Error creating image.");
        img.set(0, 0, Pixel::rgb(10, 20, 30));
        img.set(0, 1, Pixel::rgb(40, 50, 60));
        img.set(1, 0, Pixel::rgb(70, 80, 90));
        img.set(1, 1, Pixel::rgb(100, 110, 120));
        img
    }

    fn gray_values(img: &Image) -> Vec<u8> {
        img.pixels().pixels().map(Pixel::gray_value).collect()
    }

    #[test]
    fn luma_truncates_and_flips_kind() {
        let mut img = sample_rgb();
        luma(&mut img);
        assert_eq!(img.kind(), PixelKind::Gray);
        // 0.299*10 + 0.587*20 + 0.114*30 = 18.15
        assert_eq!(gray_values(&img), vec![18, 48, 78, 108]);
        assert!(img.pixels().pixels().all(|px| matches!(px, Pixel::Gray(_))));
    }

    #[test]
    fn luma_leaves_gray_images_alone() {
        let mut img = Image::new(1, 1, PixelKind::Gray).expect("Error creating image.");
        img.set(0, 0, Pixel::gray(128));
        luma(&mut img);
        assert_eq!(img.get(0, 0), Some(&Pixel::gray(128)));
    }

    #[test]
    fn gray_image_uses_per_channel_floor() {
        let mut img = Image::new(1, 2, PixelKind::Rgb).expect("Error creating image.");
        img.set(0, 0, Pixel::rgb(4, 4, 1));
        img.set(1, 0, Pixel::rgb(255, 255, 255));
        rgb_to_gray_image(&mut img);
        assert_eq!(img.kind(), PixelKind::Gray);
        assert_eq!(gray_values(&img), vec![2, 255]);
    }

    #[test]
    fn ycbcr_overwrites_slots_in_place() {
        let mut img = sample_rgb();
        ycbcr(&mut img).expect("Error converting to YCbCr.");
        assert_eq!(img.kind(), PixelKind::Rgb);
        // Y = 18.15, Cb = 134.687, Cr = 122.187
        assert_eq!(img.get(0, 0), Some(&Pixel::rgb(18, 134, 122)));
    }

    #[test]
    fn ycbcr_saturates_at_the_top_of_the_range() {
        let mut img = Image::new(1, 1, PixelKind::Rgb).expect("Error creating image.");
        img.set(0, 0, Pixel::rgb(255, 0, 0));
        ycbcr(&mut img).expect("Error converting to YCbCr.");
        // Cr = 255.5 before truncation
        assert_eq!(img.get(0, 0), Some(&Pixel::rgb(76, 84, 255)));
    }

    #[test]
    fn ycbcr_requires_rgb() {
        let mut img = Image::new(1, 1, PixelKind::Gray).expect("Error creating image.");
        assert!(matches!(
            ycbcr(&mut img),
            Err(PnmError::KindMismatch {
                requested: PixelKind::Rgb,
                found: PixelKind::Gray
            })
        ));
    }

    #[test]
    fn planes_come_out_independently() {
        let mut img = sample_rgb();
        ycbcr(&mut img).expect("Error converting to YCbCr.");

        let y = extract_plane(&img, Plane::Y).expect("Error extracting Y.");
        let cb = extract_plane(&img, Plane::Cb).expect("Error extracting Cb.");
        let cr = extract_plane(&img, Plane::Cr).expect("Error extracting Cr.");

        assert_eq!(y.kind(), PixelKind::Gray);
        assert_eq!(gray_values(&y), vec![18, 48, 78, 108]);
        assert_eq!(gray_values(&cb), vec![134; 4]);
        assert_eq!(gray_values(&cr), vec![122; 4]);
        // the source still holds all three planes
        assert_eq!(img.get(1, 1), Some(&Pixel::rgb(108, 134, 122)));
    }

    #[test]
    fn red_extraction_expands_back_to_equal_channels() {
        let img = sample_rgb();
        let mut red = extract_channel(&img, Channel::Red).expect("Error extracting red.");
        gray_to_rgb_image(&mut red);

        assert_eq!(red.kind(), PixelKind::Rgb);
        for (orig, expanded) in img.pixels().pixels().zip(red.pixels().pixels()) {
            let o = orig.to_rgb();
            assert_eq!(*expanded, Pixel::rgb(o.r, o.r, o.r));
        }
    }

    #[test]
    fn yuv_keeps_neutral_grays_centered() {
        let mut img = Image::new(1, 1, PixelKind::Rgb).expect("Error creating image.");
        img.set(0, 0, Pixel::rgb(0, 0, 0));
        yuv(&mut img).expect("Error converting to YUV.");
        assert_eq!(img.get(0, 0), Some(&Pixel::rgb(0, 128, 128)));
    }

    #[test]
    fn apply_visits_every_cell() {
        let mut img = sample_rgb();
        let mut visited = 0;
        apply_to_pixels(&mut img, |px| {
            px.set_gray_value(0);
            visited += 1;
        });
        assert_eq!(visited, 4);
        assert_eq!(img.get(1, 1), Some(&Pixel::rgb(0, 110, 120)));
    }

    #[test]
    fn apply_cannot_change_the_cell_kind() {
        let mut img = sample_rgb();
        apply_to_pixels(&mut img, |px| *px = Pixel::gray(7));
        assert_eq!(img.kind(), PixelKind::Rgb);
        assert!(img.pixels().pixels().all(|px| *px == Pixel::rgb(7, 7, 7)));
    }
}
