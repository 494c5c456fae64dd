//! Frame-to-intensity reduction
//!
//! A fingertip pressed over the lens with the torch on fills the whole image
//! with a red glow whose brightness pulses with blood volume. Averaging the
//! red channel over a region of the frame turns each frame into one scalar.
//!
//! The centre of the frame is used by default: edges are where the finger
//! lifts first and where ambient light leaks in. The region and the pixel
//! stride are tunables, not contracts.

use crate::{
    errors::{ConfigError, ConfigResult},
    traits::{Frame, Rgb, Seconds},
};

/// Which part of the frame is averaged
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtractionRegion {
    /// Every pixel
    FullFrame,
    /// A centred rectangle covering `fraction` of each dimension
    Center {
        /// Share of width and height, in `(0, 1]`
        fraction: f32,
    },
}

impl Default for ExtractionRegion {
    fn default() -> Self {
        Self::Center { fraction: 0.5 }
    }
}

impl ExtractionRegion {
    /// Pixel bounds `(x0, y0, x1, y1)` (exclusive end) within a frame
    pub fn bounds(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        match *self {
            Self::FullFrame => (0, 0, width, height),
            Self::Center { fraction } => {
                let f = fraction.clamp(0.0, 1.0);
                let w = ((width as f32 * f) as usize).max(1).min(width);
                let h = ((height as f32 * f) as usize).max(1).min(height);
                let x0 = (width - w) / 2;
                let y0 = (height - h) / 2;
                (x0, y0, x0 + w, y0 + h)
            }
        }
    }

    /// Reject fractions outside `(0, 1]`
    pub fn validate(&self) -> ConfigResult<()> {
        match *self {
            Self::FullFrame => Ok(()),
            Self::Center { fraction } if fraction > 0.0 && fraction <= 1.0 => Ok(()),
            Self::Center { .. } => Err(ConfigError::InvalidValue { name: "region.fraction" }),
        }
    }
}

/// Mean channel intensities over the extraction region
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    /// Mean red (0-255)
    pub red: f32,
    /// Mean green (0-255)
    pub green: f32,
    /// Mean blue (0-255)
    pub blue: f32,
    /// Pixels that contributed
    pub pixels: usize,
}

impl ChannelStats {
    /// Share of red in the total intensity, 0 for a black frame
    pub fn red_ratio(&self) -> f32 {
        let total = self.red + self.green + self.blue;
        if total <= f32::EPSILON {
            return 0.0;
        }
        self.red / total
    }

    /// True if no pixel could be read
    pub fn is_empty(&self) -> bool {
        self.pixels == 0
    }
}

/// Average the channels of `frame` over `region`, visiting every `step`-th pixel
///
/// Malformed frames (zero size, unreadable pixels) yield zeroed stats.
pub fn extract_channels<F: Frame + ?Sized>(
    frame: &F,
    region: ExtractionRegion,
    step: usize,
) -> ChannelStats {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return ChannelStats::default();
    }

    let step = step.max(1);
    let (x0, y0, x1, y1) = region.bounds(width, height);
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    let mut pixels = 0usize;

    for y in (y0..y1).step_by(step) {
        for x in (x0..x1).step_by(step) {
            if let Some(px) = frame.rgb_at(x, y) {
                r += px.r as u64;
                g += px.g as u64;
                b += px.b as u64;
                pixels += 1;
            }
        }
    }

    if pixels == 0 {
        return ChannelStats::default();
    }

    let n = pixels as f32;
    ChannelStats {
        red: r as f32 / n,
        green: g as f32 / n,
        blue: b as f32 / n,
        pixels,
    }
}

/// Byte layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes: R, G, B
    Rgb8,
    /// 4 bytes: R, G, B, A
    Rgba8,
    /// 4 bytes: B, G, R, A (iOS camera default)
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

/// A borrowed, interleaved 8-bit camera frame
///
/// `stride` is the number of bytes per row, which camera APIs often pad
/// beyond `width * bytes_per_pixel`.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    timestamp: Seconds,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap a tightly packed buffer
    pub fn new(data: &'a [u8], width: usize, height: usize, format: PixelFormat, timestamp: Seconds) -> Self {
        Self::with_stride(data, width, height, width * format.bytes_per_pixel(), format, timestamp)
    }

    /// Wrap a buffer with padded rows
    pub fn with_stride(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
        timestamp: Seconds,
    ) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            format,
            timestamp,
        }
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

impl Frame for PixelBuffer<'_> {
    fn timestamp(&self) -> Seconds {
        self.timestamp
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn rgb_at(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = y.checked_mul(self.stride)?.checked_add(x.checked_mul(bpp)?)?;
        let px = self.data.get(offset..offset + 3)?;
        Some(match self.format {
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => Rgb { r: px[0], g: px[1], b: px[2] },
            PixelFormat::Bgra8 => Rgb { r: px[2], g: px[1], b: px[0] },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        rgb.iter().copied().cycle().take(width * height * 3).collect()
    }

    #[test]
    fn solid_frame_mean() {
        let data = solid(8, 6, [200, 40, 20]);
        let frame = PixelBuffer::new(&data, 8, 6, PixelFormat::Rgb8, 0.0);
        let stats = extract_channels(&frame, ExtractionRegion::FullFrame, 1);
        assert_eq!(stats.red, 200.0);
        assert_eq!(stats.green, 40.0);
        assert_eq!(stats.pixels, 48);
        assert!((stats.red_ratio() - 200.0 / 260.0).abs() < 1e-6);
    }

    #[test]
    fn bgra_channels_swapped() {
        let data = [10u8, 20, 30, 255];
        let frame = PixelBuffer::new(&data, 1, 1, PixelFormat::Bgra8, 0.0);
        assert_eq!(frame.rgb_at(0, 0), Some(Rgb { r: 30, g: 20, b: 10 }));
    }

    #[test]
    fn stride_padding_skipped() {
        // 2x2 RGB with 2 bytes of row padding
        let data = [
            1, 1, 1, 2, 2, 2, 0xEE, 0xEE,
            3, 3, 3, 4, 4, 4, 0xEE, 0xEE,
        ];
        let frame = PixelBuffer::with_stride(&data, 2, 2, 8, PixelFormat::Rgb8, 0.0);
        assert_eq!(frame.rgb_at(0, 1), Some(Rgb { r: 3, g: 3, b: 3 }));
        let stats = extract_channels(&frame, ExtractionRegion::FullFrame, 1);
        assert_eq!(stats.red, 2.5);
    }

    #[test]
    fn center_region_ignores_border() {
        // bright border, dark 2x2 centre in a 4x4 frame
        let mut data = solid(4, 4, [250, 250, 250]);
        for y in 1..3 {
            for x in 1..3 {
                let i = (y * 4 + x) * 3;
                data[i..i + 3].copy_from_slice(&[100, 10, 10]);
            }
        }
        let frame = PixelBuffer::new(&data, 4, 4, PixelFormat::Rgb8, 0.0);
        let stats = extract_channels(&frame, ExtractionRegion::Center { fraction: 0.5 }, 1);
        assert_eq!(stats.red, 100.0);
        assert_eq!(stats.pixels, 4);
    }

    #[test]
    fn short_buffer_degrades_to_zero() {
        let data = [255u8; 5];
        let frame = PixelBuffer::new(&data, 10, 10, PixelFormat::Rgb8, 0.0);
        let stats = extract_channels(&frame, ExtractionRegion::FullFrame, 1);
        // only the first pixel is readable
        assert_eq!(stats.pixels, 1);

        let empty = PixelBuffer::new(&[], 0, 0, PixelFormat::Rgb8, 0.0);
        let stats = extract_channels(&empty, ExtractionRegion::default(), 2);
        assert!(stats.is_empty());
        assert_eq!(stats.red_ratio(), 0.0);
    }

    #[test]
    fn region_validation() {
        assert!(ExtractionRegion::Center { fraction: 0.0 }.validate().is_err());
        assert!(ExtractionRegion::Center { fraction: 1.5 }.validate().is_err());
        assert!(ExtractionRegion::Center { fraction: 1.0 }.validate().is_ok());
        assert!(ExtractionRegion::FullFrame.validate().is_ok());
    }
}
