//! Core types for online region shape classification.
//!
//! This crate is intentionally small: binary-mask views, region and
//! descriptor types, and overlay primitives. It knows nothing about how
//! regions are found, how descriptors are computed, or how they are matched.

mod descriptor;
mod logger;
mod mask;
mod overlay;

pub use descriptor::{LabeledShape, OrientedBox, ShapeDescriptor, INVARIANT_DIMS};
pub use mask::{is_foreground, Mask, MaskView, PixelRect, Region};
pub use overlay::RegionOverlay;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
