//! Nearest-neighbor classification over invariant shape descriptors, plus
//! the append-only training store backing it.
//!
//! The classifier is a plain closed-set nearest-neighbor match: it never
//! infers label semantics, only returns the label of the closest previously
//! stored example. The store grows online, one operator-labeled example at a
//! time, and is written through to disk on every append.

mod classifier;
mod store;

pub use classifier::{classify, descriptor_distance, NearestMatch};
pub use store::{StoreError, TrainingStore};
