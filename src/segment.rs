use crate::affinity::AffinityField;
use crate::automaton::{Automaton, Outcome};
use crate::color::ColorField;
use crate::common::{Config, RgbaView};
use crate::error::Error;
use crate::mask::Mask;
use crate::seed::{seed_from_overlay, StrengthField};
use log::debug;
use std::time::Instant;

/// Result of [`segment`].
#[derive(Debug)]
pub struct Segmentation {
    pub mask: Mask,
    /// Settled signed strength of every pixel.
    pub strength: StrengthField,
    /// Smoothed colors the affinities were computed from.
    pub colors: ColorField,
    pub outcome: Outcome,
}

impl Segmentation {
    /// The source image with alpha replaced by the mask.
    pub fn to_rgba8(&self, source: &RgbaView) -> Result<Vec<u8>, Error> {
        self.mask.apply_to_rgba8(source)
    }

    /// The smoothed color field, opaque.
    pub fn smoothed_rgba8(&self) -> Vec<u8> {
        self.colors.to_rgba8()
    }
}

fn check_dimensions(image: &RgbaView, overlay: &RgbaView) -> Result<(), Error> {
    if image.grid() != overlay.grid() {
        return Err(Error::DimensionMismatch {
            image: (image.width(), image.height()),
            overlay: (overlay.width(), overlay.height()),
        });
    }
    Ok(())
}

/// This function is the main pipeline.
///
/// The steps are:
/// - check that both images have the same size (nothing is allocated before this passes)
/// - normalize and smooth the source colors
/// - precompute neighbor affinities
/// - turn the overlay into seeds
/// - run the automaton until convergence or `config.max_iterations`
/// - extract the mask
pub fn segment(image: &RgbaView, overlay: &RgbaView, config: &Config) -> Result<Segmentation, Error> {
    check_dimensions(image, overlay)?;
    let start = Instant::now();

    let mut stage = Instant::now();
    let mut colors = ColorField::from_rgba8(image)?;
    colors.smooth()?;
    debug!("color field smoothed in {:?}", stage.elapsed());

    stage = Instant::now();
    let affinity = AffinityField::compute(&colors)?;
    debug!("affinities computed in {:?}", stage.elapsed());

    let seeds = seed_from_overlay(overlay, &config.seed)?;
    debug!(
        "{} seed pixels in {}x{} image",
        seeds.data.iter().filter(|v| **v != 0.0).count(),
        image.width(),
        image.height()
    );

    let mut automaton = Automaton::new(&affinity, seeds, config)?;
    let outcome = automaton.run();
    let strength = automaton.into_strength();

    let mask = Mask::from_strength(&strength)?;
    debug!(
        "{} of {} pixels foreground, total {:?}",
        mask.foreground_count(),
        image.grid().len(),
        start.elapsed()
    );
    Ok(Segmentation {
        mask,
        strength,
        colors,
        outcome,
    })
}
