//! GrowCut segmentation in Rust.
//!
//! This crate implements interactive foreground/background segmentation with the GrowCut
//! cellular automaton. A few user supplied foreground and background seed pixels compete
//! for the rest of the image. Each pixel is attacked by its 8 neighbors with a strength
//! weighted by how similar their (slightly smoothed) colors are, and the strongest attacker
//! takes it over. The result is a binary mask following irregular object boundaries.
//!
//! Seeds are given as an RGBA overlay of the same size as the image: opaque red-dominant
//! pixels mark background, any other opaque pixel marks foreground.
//!
//! The following example describes how to process image in packed RGBA8 format (default
//! for the `image` crate's `RgbaImage`):
//!
//! ```rust
//! use fast_growcut_rust::common::{Config, RgbaView};
//! use fast_growcut_rust::segment::segment;
//!
//! fn main() -> Result<(), fast_growcut_rust::error::Error> {
//!     let (width, height) = (64, 48);
//!     // dark left half, bright right half
//!     let image: Vec<u8> = (0..width * height)
//!         .flat_map(|i| {
//!             if i % width < width / 2 {
//!                 [20, 20, 20, 255]
//!             } else {
//!                 [230, 230, 230, 255]
//!             }
//!         })
//!         .collect();
//!     // green stroke on the left (foreground), red stroke on the right (background)
//!     let mut overlay = vec![0u8; width * height * 4];
//!     for y in 10..38 {
//!         let fg = (y * width + 10) * 4;
//!         overlay[fg..fg + 4].copy_from_slice(&[0, 255, 0, 255]);
//!         let bg = (y * width + 54) * 4;
//!         overlay[bg..bg + 4].copy_from_slice(&[255, 0, 0, 255]);
//!     }
//!     let image = RgbaView::new(&image, width, height)?;
//!     let overlay = RgbaView::new(&overlay, width, height)?;
//!     // create config with defaults (2000 iterations at most, all rayon threads)
//!     let config = Config::default();
//!     let result = segment(&image, &overlay, &config)?;
//!     // source colors with alpha set from the mask
//!     let output = result.to_rgba8(&image)?;
//!     assert_eq!(output[3], 0xFF);
//!     assert_eq!(output[(width - 1) * 4 + 3], 0x00);
//!     Ok(())
//! }
//! ```
//!
//! The stages can also be driven one by one (`color`, `affinity`, `seed`, `automaton`,
//! `mask`), e.g. to seed from explicit coordinates with `seed::seed_points()` or to step
//! the automaton manually.
//!
//! The automaton is double-buffered. Each step is a pure function of the previous state, so
//! the row-band parallelization gives bit-identical results for any number of threads.
//! The interior of the image is processed without bounds checks in hot-loops (`assume!`
//! macro in release builds), the outer ring of pixels separately with them.
//!
//! Progress is reported through the `log` crate.
//!

pub mod affinity;
pub mod arrays;
pub mod automaton;
pub mod color;
pub mod common;
pub mod error;
pub mod grid;
pub mod mask;
pub mod seed;
pub mod segment;
