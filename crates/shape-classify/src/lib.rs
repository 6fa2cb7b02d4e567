//! High-level facade crate for the `shape-classify-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates
//! - a [`Session`] orchestrator that drives mask -> regions -> descriptors
//!   -> labels per frame and handles the operator training loop
//! - (feature `image`) the segmentation stage that turns grayscale frames
//!   into cleaned binary masks
//! - (feature `cli`) an interactive binary over a sequence of frame images
//!
//! ## Quickstart
//!
//! ```
//! use shape_classify::extract::RegionExtractorParams;
//! use shape_classify::{Mask, Session, TrainingStore};
//!
//! // A 64x64 mask with one filled square object.
//! let mut mask = Mask::new(64, 64);
//! for y in 8..56 {
//!     for x in 8..56 {
//!         mask.data[y * 64 + x] = 1;
//!     }
//! }
//!
//! let store = TrainingStore::empty("examples.csv");
//! let mut session = Session::with_store(store, RegionExtractorParams::default());
//! let summary = session.process_mask(&mask.view());
//! assert_eq!(summary.observations.len(), 1);
//! // Empty training set: explicitly unclassified, never a guessed label.
//! assert!(summary.observations[0].label.is_none());
//! ```
//!
//! ## API map
//! - `shape_classify::core`: mask, region, descriptor and overlay types.
//! - `shape_classify::extract`: connected components, contours, moments,
//!   oriented boxes.
//! - `shape_classify::knn`: nearest-neighbor matching and the CSV-backed
//!   training store.

pub use shape_classify_core as core;
pub use shape_classify_extract as extract;
pub use shape_classify_knn as knn;

pub use shape_classify_core::{
    LabeledShape, Mask, MaskView, OrientedBox, Region, RegionOverlay, ShapeDescriptor,
};
pub use shape_classify_knn::{NearestMatch, TrainingStore};

mod io;
#[cfg(feature = "image")]
mod segment;
mod session;

pub use io::{FrameReport, SessionConfig, SessionIoError, SessionReport};
#[cfg(feature = "image")]
pub use segment::{mask_from_gray, mask_from_gray_u8, SegmentError, SegmentParams};
pub use session::{FrameSummary, Observation, Session, SessionState, TrainError};
