// THEORY:
// The `Pixel` module is the smallest unit of the library. A PNM image stores one of
// two kinds of cell: a single gray byte (P5) or a red/green/blue byte triple (P6).
// Both kinds live behind one `Pixel` enum so a `Matrix` can hold either, while the
// owning `Image` carries a `PixelKind` tag saying which one is expected.
//
// Key architectural principles:
// 1.  **Shared first slot**: The gray value of a cell and the red channel of a cell
//     occupy the same logical slot. Reading the gray value of an RGB cell yields its
//     red channel; writing the gray value of an RGB cell overwrites its red channel
//     and leaves green and blue untouched. Channel extraction (see `Matrix`) is built
//     on this contract, so it is exposed as the named pair `gray_value` /
//     `set_gray_value` rather than left to memory layout.
// 2.  **Per-channel truncation**: `rgb_to_grayscale` divides every channel by three
//     before summing. This is not the same as flooring the mean; `(4, 4, 1)` gives 2.
// 3.  **Wire widths**: `PixelKind::bytes_per_pixel` is the only place that knows a
//     gray cell is one byte on disk and an RGB cell is three.

pub mod pixel {
    use std::fmt;

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type ChannelValue = Byte;
    pub type Luminance = f64;

    /// The two pixel representations a PNM image in this library can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum PixelKind {
        /// One byte per pixel, stored as `P5`.
        Gray,
        /// Three bytes per pixel (R, G, B), stored as `P6`.
        Rgb,
    }

    impl PixelKind {
        /// Number of payload bytes one cell of this kind occupies on disk.
        pub const fn bytes_per_pixel(self) -> usize {
            match self {
                PixelKind::Gray => 1,
                PixelKind::Rgb => 3,
            }
        }

        /// The digit following `P` in the magic number.
        pub const fn magic_digit(self) -> u8 {
            match self {
                PixelKind::Gray => b'5',
                PixelKind::Rgb => b'6',
            }
        }

        pub const fn from_magic_digit(digit: u8) -> Option<Self> {
            match digit {
                b'5' => Some(PixelKind::Gray),
                b'6' => Some(PixelKind::Rgb),
                _ => None,
            }
        }

        /// The zeroed cell an image of this kind starts from.
        pub const fn blank_pixel(self) -> Pixel {
            match self {
                PixelKind::Gray => Pixel::Gray(GrayPixel { v: 0 }),
                PixelKind::Rgb => Pixel::Rgb(RgbPixel { r: 0, g: 0, b: 0 }),
            }
        }
    }

    impl fmt::Display for PixelKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                PixelKind::Gray => f.write_str("grayscale (P5)"),
                PixelKind::Rgb => f.write_str("RGB (P6)"),
            }
        }
    }

    /// Selects one color channel of an RGB cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Channel {
        Red,
        Green,
        Blue,
    }

    /// A single gray byte.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct GrayPixel {
        pub v: ChannelValue,
    }

    /// A red, green, blue byte triple.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct RgbPixel {
        pub r: ChannelValue,
        pub g: ChannelValue,
        pub b: ChannelValue,
    }

    /// One matrix cell: either representation, tagged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Pixel {
        Gray(GrayPixel),
        Rgb(RgbPixel),
    }

    impl Default for Pixel {
        fn default() -> Self {
            Pixel::Gray(GrayPixel::default())
        }
    }

    /// Builds an RGB pixel with all three channels set to `v`.
    pub fn grayscale_from_scalar(v: ChannelValue) -> RgbPixel {
        RgbPixel { r: v, g: v, b: v }
    }

    /// Collapses an RGB pixel to gray as `r/3 + g/3 + b/3`, truncating each channel
    /// before the sum.
    pub fn rgb_to_grayscale(px: &RgbPixel) -> GrayPixel {
        GrayPixel {
            v: px.r / 3 + px.g / 3 + px.b / 3,
        }
    }

    /// Overwrites `target` with an RGB cell. An absent target is ignored.
    pub fn set_rgb(target: Option<&mut Pixel>, r: ChannelValue, g: ChannelValue, b: ChannelValue) {
        if let Some(px) = target {
            *px = Pixel::Rgb(RgbPixel { r, g, b });
        }
    }

    /// Overwrites `target` with a gray cell. An absent target is ignored.
    pub fn set_gray(target: Option<&mut Pixel>, v: ChannelValue) {
        if let Some(px) = target {
            *px = Pixel::Gray(GrayPixel { v });
        }
    }

    impl GrayPixel {
        pub fn new(v: ChannelValue) -> Self {
            Self { v }
        }

        /// Expands the gray value into all three channels.
        pub fn to_rgb(&self) -> RgbPixel {
            grayscale_from_scalar(self.v)
        }
    }

    impl RgbPixel {
        pub fn new(r: ChannelValue, g: ChannelValue, b: ChannelValue) -> Self {
            Self { r, g, b }
        }

        pub fn channel(&self, which: Channel) -> ChannelValue {
            match which {
                Channel::Red => self.r,
                Channel::Green => self.g,
                Channel::Blue => self.b,
            }
        }

        /// Rec. 601 luma, unrounded.
        pub fn luminance(&self) -> Luminance {
            0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
        }
    }

    impl Pixel {
        pub fn gray(v: ChannelValue) -> Self {
            Pixel::Gray(GrayPixel { v })
        }

        pub fn rgb(r: ChannelValue, g: ChannelValue, b: ChannelValue) -> Self {
            Pixel::Rgb(RgbPixel { r, g, b })
        }

        pub fn kind(&self) -> PixelKind {
            match self {
                Pixel::Gray(_) => PixelKind::Gray,
                Pixel::Rgb(_) => PixelKind::Rgb,
            }
        }

        /// Reads the shared first slot: the gray value, or the red channel of an RGB cell.
        pub fn gray_value(&self) -> ChannelValue {
            match self {
                Pixel::Gray(px) => px.v,
                Pixel::Rgb(px) => px.r,
            }
        }

        /// Writes the shared first slot. On an RGB cell only red changes.
        pub fn set_gray_value(&mut self, v: ChannelValue) {
            match self {
                Pixel::Gray(px) => px.v = v,
                Pixel::Rgb(px) => px.r = v,
            }
        }

        /// Reads one channel. A gray cell answers every channel with its value.
        pub fn channel(&self, which: Channel) -> ChannelValue {
            match self {
                Pixel::Gray(px) => px.v,
                Pixel::Rgb(px) => px.channel(which),
            }
        }

        /// The RGB view of this cell; gray cells are expanded.
        pub fn to_rgb(&self) -> RgbPixel {
            match self {
                Pixel::Gray(px) => px.to_rgb(),
                Pixel::Rgb(px) => *px,
            }
        }

        /// Converts this cell in place to `kind` through `to_gray` / `to_rgb`.
        pub fn coerce_to(&mut self, kind: PixelKind) {
            *self = match kind {
                PixelKind::Gray => Pixel::Gray(self.to_gray()),
                PixelKind::Rgb => Pixel::Rgb(self.to_rgb()),
            };
        }

        /// The gray view of this cell; RGB cells go through `rgb_to_grayscale`.
        pub fn to_gray(&self) -> GrayPixel {
            match self {
                Pixel::Gray(px) => *px,
                Pixel::Rgb(px) => rgb_to_grayscale(px),
            }
        }
    }

    impl From<GrayPixel> for Pixel {
        fn from(px: GrayPixel) -> Self {
            Pixel::Gray(px)
        }
    }

    impl From<RgbPixel> for Pixel {
        fn from(px: RgbPixel) -> Self {
            Pixel::Rgb(px)
        }
    }

    /// Builds a cell from its wire bytes: one byte is gray, three bytes are RGB.
    impl TryFrom<&[Byte]> for Pixel {
        type Error = usize;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match *bytes {
                [v] => Ok(Pixel::gray(v)),
                [r, g, b] => Ok(Pixel::rgb(r, g, b)),
                _ => Err(bytes.len()),
            }
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            match pixel {
                Pixel::Gray(px) => vec![px.v],
                Pixel::Rgb(px) => vec![px.r, px.g, px.b],
            }
        }
    }
}
