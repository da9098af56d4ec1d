// THEORY:
// The `codec` module is the top-level API of the library. It turns a binary PNM
// stream into an `Image` and an `Image` back into a stream, and it is the only place
// that knows the wire format.
//
// Reading is a strictly sequential state machine over a buffered byte stream. The
// only lookahead is the one byte `BufRead::fill_buf` lets us peek at, which plays the
// role of single-character pushback:
//   1. Magic: `P` followed by one digit. `5` is gray, `6` is RGB, any other digit is
//      a PNM variant this codec does not handle. A caller that asked for a specific
//      kind is turned away here, before any payload byte is touched.
//   2. Header fields: width, height and maxval, each preceded by any run of
//      whitespace and `#` comment lines. Running out of input here is fatal. Only a
//      maxval of 255 is accepted. One whitespace byte then separates the header from
//      the payload.
//   3. Payload: `height` rows of `width` cells, 1 or 3 bytes each, top to bottom and
//      left to right. A short payload is reported together with the partly filled
//      image.
//
// Writing mirrors reading: `P5`/`P6`, a newline, `"{width} {height} 255"`, a newline,
// then the payload in the same order.
//
// Files are opened inside the function that uses them and dropped on every exit
// path, so no handle outlives a failed read or write.

use crate::core_modules::image::Image;
use crate::core_modules::pixel::pixel::{Byte, Pixel, PixelKind};
use crate::error::{FormatError, PnmError, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// The only maxval this codec reads or writes.
pub const MAXVAL: u32 = 255;

const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

/// Configuration for a `PnmCodec`.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Largest `width * height` a header may announce. Bigger images fail with
    /// `PnmError::Allocation` before any storage is reserved.
    pub max_pixels: u64,
    /// Treat bytes after the last pixel as a format error instead of ignoring them.
    pub reject_trailing_data: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            reject_trailing_data: false,
        }
    }
}

/// The fields of a PNM header, as found in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnmHeader {
    pub kind: PixelKind,
    pub width: u32,
    pub height: u32,
    pub maxval: u32,
}

impl PnmHeader {
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Reads and writes binary PGM/PPM images according to a `CodecConfig`.
#[derive(Debug, Clone, Default)]
pub struct PnmCodec {
    config: CodecConfig,
}

impl PnmCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Reads `path`, which must hold an image of `kind`.
    pub fn read(&self, path: impl AsRef<Path>, kind: PixelKind) -> Result<Image> {
        self.read_file(path.as_ref(), Some(kind))
    }

    /// Reads `path`, taking the kind from its magic number.
    pub fn read_any(&self, path: impl AsRef<Path>) -> Result<Image> {
        self.read_file(path.as_ref(), None)
    }

    /// Reads only the header of `path`. The maxval is reported as found, without
    /// being checked.
    pub fn read_header(&self, path: impl AsRef<Path>) -> Result<PnmHeader> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let header = parse_header(&mut reader, None)?;
        debug!(
            "{}: {} {}x{} maxval {}",
            path.display(),
            header.kind,
            header.width,
            header.height,
            header.maxval
        );
        Ok(header)
    }

    fn read_file(&self, path: &Path, expected: Option<PixelKind>) -> Result<Image> {
        let file = File::open(path)?;
        let image = self.decode(BufReader::new(file), expected);
        if let Err(err) = &image {
            warn!("failed to read {}: {err}", path.display());
        }
        image
    }

    /// Decodes an image from `reader`. With `expected` set, an image of the other
    /// kind fails with `PnmError::KindMismatch` before its payload is read.
    pub fn decode<R: BufRead>(&self, mut reader: R, expected: Option<PixelKind>) -> Result<Image> {
        let header = parse_header(&mut reader, expected)?;
        if header.maxval != MAXVAL {
            return Err(FormatError::UnsupportedMaxval(header.maxval).into());
        }
        if header.pixel_count() > self.config.max_pixels {
            warn!(
                "{}x{} image exceeds the {} pixel limit",
                header.width, header.height, self.config.max_pixels
            );
            return Err(PnmError::Allocation {
                width: header.width,
                height: header.height,
            });
        }
        debug!("decoding {} {}x{}", header.kind, header.width, header.height);

        let mut image = Image::new(header.width, header.height, header.kind)?;
        let expected_pixels = image.pixels().len();
        let read = read_payload(&mut reader, &mut image)?;
        if read < expected_pixels {
            warn!("payload truncated after {read} of {expected_pixels} pixels");
            return Err(PnmError::TruncatedPayload {
                expected: expected_pixels,
                read,
                partial: Box::new(image),
            });
        }

        if self.config.reject_trailing_data {
            let trailing = io::copy(&mut reader, &mut io::sink())?;
            if trailing > 0 {
                return Err(FormatError::TrailingData(trailing as usize).into());
            }
        }
        Ok(image)
    }

    /// Writes `image` to `path` in its own kind.
    pub fn write(&self, path: impl AsRef<Path>, image: &Image) -> Result<()> {
        self.write_as(path, image, image.kind())
    }

    /// Writes `image` to `path` as `kind`. An RGB image written as gray goes through
    /// `rgb_to_grayscale`; a gray image written as RGB repeats its value in every
    /// channel.
    pub fn write_as(&self, path: impl AsRef<Path>, image: &Image, kind: PixelKind) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        encode_as(&mut writer, image, kind)?;
        writer.flush()?;
        debug!(
            "wrote {} {}x{} to {}",
            kind,
            image.width(),
            image.height(),
            path.display()
        );
        Ok(())
    }
}

/// Reads `path` with the default configuration; the file must hold `kind`.
pub fn read(path: impl AsRef<Path>, kind: PixelKind) -> Result<Image> {
    PnmCodec::default().read(path, kind)
}

/// Reads `path` with the default configuration and whichever kind it holds.
pub fn read_any(path: impl AsRef<Path>) -> Result<Image> {
    PnmCodec::default().read_any(path)
}

/// Reads the header of `path` without touching the payload.
pub fn read_header(path: impl AsRef<Path>) -> Result<PnmHeader> {
    PnmCodec::default().read_header(path)
}

/// Writes `image` to `path` in its own kind.
pub fn write(path: impl AsRef<Path>, image: &Image) -> Result<()> {
    PnmCodec::default().write(path, image)
}

/// Writes `image` to `path` converted to `kind`.
pub fn write_as(path: impl AsRef<Path>, image: &Image, kind: PixelKind) -> Result<()> {
    PnmCodec::default().write_as(path, image, kind)
}

/// Decodes an image from memory with the default configuration.
pub fn decode_bytes(bytes: &[u8], expected: Option<PixelKind>) -> Result<Image> {
    PnmCodec::default().decode(bytes, expected)
}

/// Serializes `image` in its own kind into a new buffer.
pub fn encode_to_vec(image: &Image) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(image.payload_len() + 32);
    encode(&mut out, image)?;
    Ok(out)
}

/// Serializes `image` in its own kind.
pub fn encode<W: Write>(writer: &mut W, image: &Image) -> Result<()> {
    encode_as(writer, image, image.kind())
}

/// Serializes `image` as `kind`.
///
/// Writing an image in its own kind emits the stored slots as they are: a gray
/// image whose cells are still RGB emits their shared first slot. Writing in the
/// other kind converts each cell.
pub fn encode_as<W: Write>(writer: &mut W, image: &Image, kind: PixelKind) -> Result<()> {
    write!(
        writer,
        "P{}\n{} {} {}\n",
        char::from(kind.magic_digit()),
        image.width(),
        image.height(),
        MAXVAL
    )?;

    let converting = kind != image.kind();
    let mut buffer: Vec<Byte> = Vec::with_capacity(image.width() as usize * kind.bytes_per_pixel());
    for row in image.pixels().rows() {
        buffer.clear();
        for px in row {
            match kind {
                PixelKind::Gray if converting => buffer.push(px.to_gray().v),
                PixelKind::Gray => buffer.push(px.gray_value()),
                PixelKind::Rgb => {
                    let rgb = px.to_rgb();
                    buffer.extend_from_slice(&[rgb.r, rgb.g, rgb.b]);
                }
            }
        }
        writer.write_all(&buffer)?;
    }
    Ok(())
}

fn peek_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    Ok(reader.fill_buf()?.first().copied())
}

fn next_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    let byte = peek_byte(reader)?;
    if byte.is_some() {
        reader.consume(1);
    }
    Ok(byte)
}

/// Reads `P<digit>`. The magic number ends at whitespace, a comment or the end of
/// input; anything else (another digit included) makes it a different magic.
fn parse_magic<R: BufRead>(reader: &mut R) -> Result<PixelKind> {
    let first = next_byte(reader)?;
    let second = next_byte(reader)?;
    let digit = match (first, second) {
        (Some(b'P'), Some(digit)) if digit.is_ascii_digit() => digit,
        _ => return Err(FormatError::BadMagic(first.into_iter().chain(second).collect()).into()),
    };

    match peek_byte(reader)? {
        None | Some(b'#') => {}
        Some(byte) if byte.is_ascii_whitespace() => {}
        Some(byte) => return Err(FormatError::BadMagic(vec![b'P', digit, byte]).into()),
    }
    PixelKind::from_magic_digit(digit).ok_or(FormatError::UnsupportedKind(digit).into())
}

fn skip_whitespace<R: BufRead>(reader: &mut R) -> io::Result<()> {
    while let Some(byte) = peek_byte(reader)? {
        if !byte.is_ascii_whitespace() {
            break;
        }
        reader.consume(1);
    }
    Ok(())
}

/// Skips whitespace and `#` comment lines ahead of header field `field`. Leaves the
/// reader on the first byte of the field.
fn skip_comments<R: BufRead>(reader: &mut R, field: &'static str) -> Result<()> {
    loop {
        skip_whitespace(reader)?;
        match peek_byte(reader)? {
            None => return Err(FormatError::UnexpectedEof(field).into()),
            Some(b'#') => {
                let mut comment = Vec::new();
                reader.read_until(b'\n', &mut comment)?;
                if comment.last() != Some(&b'\n') {
                    return Err(FormatError::UnexpectedEof(field).into());
                }
            }
            Some(_) => return Ok(()),
        }
    }
}

fn parse_number<R: BufRead>(reader: &mut R, field: &'static str) -> Result<u32> {
    skip_comments(reader, field)?;

    let mut value: Option<u32> = None;
    while let Some(byte) = peek_byte(reader)? {
        if !byte.is_ascii_digit() {
            break;
        }
        let digit = u32::from(byte - b'0');
        value = Some(
            value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(FormatError::InvalidNumber(field))?,
        );
        reader.consume(1);
    }
    value.ok_or(FormatError::MissingField(field).into())
}

fn parse_header<R: BufRead>(reader: &mut R, expected: Option<PixelKind>) -> Result<PnmHeader> {
    let kind = parse_magic(reader)?;
    if let Some(requested) = expected {
        if requested != kind {
            return Err(PnmError::KindMismatch {
                requested,
                found: kind,
            });
        }
    }

    let width = parse_number(reader, "width")?;
    let height = parse_number(reader, "height")?;
    let maxval = parse_number(reader, "maxval")?;

    match next_byte(reader)? {
        Some(byte) if byte.is_ascii_whitespace() => {}
        // An empty payload is still reported as truncated by the caller.
        None => {}
        Some(_) => return Err(FormatError::MissingField("whitespace after maxval").into()),
    }

    Ok(PnmHeader {
        kind,
        width,
        height,
        maxval,
    })
}

/// Fills `buf` from `reader` until it is full or the input ends. Returns the number
/// of bytes read.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads the payload row by row into `image`. Returns the number of complete pixels
/// stored; cells past that point keep their zeroed state.
fn read_payload<R: Read>(reader: &mut R, image: &mut Image) -> Result<usize> {
    let kind = image.kind();
    let bpp = kind.bytes_per_pixel();
    let mut buffer: Vec<Byte> = vec![0; image.width() as usize * bpp];
    let mut read = 0;

    for row in image.pixels_mut().rows_mut() {
        let filled = read_fully(reader, &mut buffer)?;
        let complete = filled / bpp;
        for (cell, bytes) in row.iter_mut().zip(buffer[..complete * bpp].chunks_exact(bpp)) {
            *cell = match kind {
                PixelKind::Gray => Pixel::gray(bytes[0]),
                PixelKind::Rgb => Pixel::rgb(bytes[0], bytes[1], bytes[2]),
            };
        }
        read += complete;
        if complete < row.len() {
            break;
        }
    }
    Ok(read)
}
