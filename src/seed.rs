use crate::arrays::Array2D;
use crate::common::RgbaView;
use crate::error::Error;
use crate::grid::Grid;
use rayon::prelude::*;

/// Signed overlay value of every pixel. The sign is the label, the magnitude in `[0, 1]`
/// is the confidence.
pub type StrengthField = Array2D<f32>;

/// Strength of a seed. Nothing can attack with more than this, so seeds never change.
pub const SEED_STRENGTH: f32 = 1.0;

/// How overlay pixels are classified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeedConfig {
    /// Overlay pixels with alpha at or below this are not seeds.
    pub opacity_threshold: u8,
    /// A seed is background when its red channel exceeds green by more than this.
    pub background_margin: u8,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            opacity_threshold: 0x80,
            background_margin: 128,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Label {
    Foreground,
    Background,
    Unknown,
}

impl Label {
    /// Red-dominant opaque pixels mark background, any other opaque pixel marks
    /// foreground.
    #[inline(always)]
    pub fn from_overlay_pixel(pixel: [u8; 4], config: &SeedConfig) -> Label {
        if pixel[3] <= config.opacity_threshold {
            Label::Unknown
        } else if pixel[0] as u16 > pixel[1] as u16 + config.background_margin as u16 {
            Label::Background
        } else {
            Label::Foreground
        }
    }

    #[inline(always)]
    pub fn from_strength(strength: f32) -> Label {
        if strength > 0.0 {
            Label::Foreground
        } else if strength < 0.0 {
            Label::Background
        } else {
            Label::Unknown
        }
    }

    /// Initial strength of a pixel with this label.
    #[inline(always)]
    pub fn seed_strength(self) -> f32 {
        match self {
            Label::Foreground => SEED_STRENGTH,
            Label::Background => -SEED_STRENGTH,
            Label::Unknown => 0.0,
        }
    }
}

/// Builds the initial strength buffer from an overlay image.
pub fn seed_from_overlay(overlay: &RgbaView, config: &SeedConfig) -> Result<StrengthField, Error> {
    let width = overlay.width();
    let mut strength: StrengthField = Array2D::try_zeroed(width, overlay.height())?;
    strength
        .data
        .par_chunks_mut(width)
        .zip(overlay.data().par_chunks(width * 4))
        .for_each(|(row_out, row_in)| {
            for (out, px) in row_out.iter_mut().zip(row_in.chunks_exact(4)) {
                *out = Label::from_overlay_pixel([px[0], px[1], px[2], px[3]], config)
                    .seed_strength();
            }
        });
    Ok(strength)
}

/// Builds the initial strength buffer from explicit seed coordinates. A pixel listed as
/// both ends up as background.
pub fn seed_points(
    grid: Grid,
    foreground: &[(usize, usize)],
    background: &[(usize, usize)],
) -> Result<StrengthField, Error> {
    if grid.is_empty() {
        return Err(Error::EmptyImage {
            width: grid.width,
            height: grid.height,
        });
    }
    if let Some(&(x, y)) = foreground
        .iter()
        .chain(background)
        .find(|(x, y)| !grid.contains(*x, *y))
    {
        return Err(Error::SeedOutOfBounds { x, y });
    }
    let mut strength: StrengthField = Array2D::try_zeroed(grid.width, grid.height)?;
    for &point in foreground {
        strength[point] = Label::Foreground.seed_strength();
    }
    for &point in background {
        strength[point] = Label::Background.seed_strength();
    }
    Ok(strength)
}
