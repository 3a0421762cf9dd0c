//! Image adjustments applied before the watermark.
//!
//! All functions are pure and keep the pixel layout of their input where
//! it can be represented: 8-bit luma and RGB stay as they are, every other
//! layout comes back as RGBA8. Alpha is never modified.

use image::{DynamicImage, ImageBuffer, Pixel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed range for brightness and contrast factors.
pub const MIN_FACTOR: f32 = 0.0;
pub const MAX_FACTOR: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Blur,
    EdgeEnhance,
    Sharpen,
    Grayscale,
}

impl Filter {
    pub const ALL: [Filter; 4] = [
        Filter::Blur,
        Filter::EdgeEnhance,
        Filter::Sharpen,
        Filter::Grayscale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::Blur => "blur",
            Filter::EdgeEnhance => "edge-enhance",
            Filter::Sharpen => "sharpen",
            Filter::Grayscale => "grayscale",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "blur" => Ok(Filter::Blur),
            "edge-enhance" | "edge" => Ok(Filter::EdgeEnhance),
            "sharpen" => Ok(Filter::Sharpen),
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Filter::Grayscale),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Square convolution kernel applied to the colour channels.
struct Kernel {
    size: usize,
    weights: &'static [i32],
    divisor: i32,
}

/// 5x5 ring of ones.
#[rustfmt::skip]
const BLUR: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1, 1, 1, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 1, 1, 1, 1,
    ],
    divisor: 16,
};

#[rustfmt::skip]
const EDGE_ENHANCE: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1, 10, -1,
        -1, -1, -1,
    ],
    divisor: 2,
};

#[rustfmt::skip]
const SHARPEN: Kernel = Kernel {
    size: 3,
    weights: &[
        -2, -2, -2,
        -2, 32, -2,
        -2, -2, -2,
    ],
    divisor: 16,
};

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        1.0
    } else {
        factor.clamp(MIN_FACTOR, MAX_FACTOR)
    }
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Scale every colour channel by `factor` (0.0 black, 1.0 unchanged).
pub fn brightness(image: &DynamicImage, factor: f32) -> DynamicImage {
    let factor = clamp_factor(factor);
    map_color_channels(image, |c| to_channel(c as f32 * factor))
}

/// Blend with the mean grey level: `mean + (c - mean) * factor`
/// (0.0 flat grey, 1.0 unchanged).
pub fn contrast(image: &DynamicImage, factor: f32) -> DynamicImage {
    let factor = clamp_factor(factor);
    let mean = mean_luma(image) as f32;
    map_color_channels(image, |c| to_channel(mean + (c as f32 - mean) * factor))
}

pub fn apply_filter(image: &DynamicImage, filter: Filter) -> DynamicImage {
    match filter {
        Filter::Blur => convolve(image, &BLUR),
        Filter::EdgeEnhance => convolve(image, &EDGE_ENHANCE),
        Filter::Sharpen => convolve(image, &SHARPEN),
        Filter::Grayscale => grayscale(image),
    }
}

/// Single-channel luma. Alpha is dropped.
pub fn grayscale(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) => image.clone(),
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

/// Mean luma, rounded to the nearest level.
fn mean_luma(image: &DynamicImage) -> u8 {
    let luma = image.to_luma8();
    let count = luma.as_raw().len() as u64;
    if count == 0 {
        return 0;
    }
    let sum: u64 = luma.as_raw().iter().map(|&v| v as u64).sum();
    ((sum + count / 2) / count) as u8
}

fn map_color_channels(image: &DynamicImage, f: impl Fn(u8) -> u8) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(map_buffer(buf, 1, &f)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(map_buffer(buf, 1, &f)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(map_buffer(buf, 3, &f)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(map_buffer(buf, 3, &f)),
        other => DynamicImage::ImageRgba8(map_buffer(&other.to_rgba8(), 3, &f)),
    }
}

/// Apply `f` to the first `color_channels` channels of every pixel.
fn map_buffer<P>(
    buf: &ImageBuffer<P, Vec<u8>>,
    color_channels: usize,
    f: &impl Fn(u8) -> u8,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = P::CHANNEL_COUNT as usize;
    let mut out = buf.clone();
    for pixel in out.chunks_exact_mut(channels) {
        for c in pixel.iter_mut().take(color_channels) {
            *c = f(*c);
        }
    }
    out
}

fn convolve(image: &DynamicImage, kernel: &Kernel) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(convolve_buffer(buf, 1, kernel)),
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(convolve_buffer(buf, 1, kernel))
        }
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(convolve_buffer(buf, 3, kernel)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(convolve_buffer(buf, 3, kernel)),
        other => DynamicImage::ImageRgba8(convolve_buffer(&other.to_rgba8(), 3, kernel)),
    }
}

/// Convolve the colour channels, replicating edge pixels past the border.
fn convolve_buffer<P>(
    buf: &ImageBuffer<P, Vec<u8>>,
    color_channels: usize,
    kernel: &Kernel,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = buf.dimensions();
    let mut out = buf.clone();
    if width == 0 || height == 0 {
        return out;
    }

    let channels = P::CHANNEL_COUNT as usize;
    let src = buf.as_raw();
    let radius = (kernel.size / 2) as i64;
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let stride = width as usize * channels;

    let dst: &mut [u8] = &mut out;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let base = y as usize * stride + x as usize * channels;
            for c in 0..color_channels {
                let mut sum = 0i32;
                for ky in 0..kernel.size as i64 {
                    let sy = (y + ky - radius).clamp(0, max_y) as usize;
                    for kx in 0..kernel.size as i64 {
                        let weight = kernel.weights[(ky as usize) * kernel.size + kx as usize];
                        if weight == 0 {
                            continue;
                        }
                        let sx = (x + kx - radius).clamp(0, max_x) as usize;
                        sum += weight * src[sy * stride + sx * channels + c] as i32;
                    }
                }
                dst[base + c] = to_channel(sum as f32 / kernel.divisor as f32);
            }
        }
    }

    out
}
