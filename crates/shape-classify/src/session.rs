//! Frame session orchestration.
//!
//! A [`Session`] owns the training store and drives the read path for each
//! frame: mask -> regions -> descriptors -> labels. The operator training
//! loop is an explicit state machine; while a label is being captured the
//! frame loop is suspended, so the classification read path and the store
//! write path can never interleave.

use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use shape_classify_core::{LabeledShape, MaskView, RegionOverlay, ShapeDescriptor};
use shape_classify_extract::{extract_all, RegionExtractor, RegionExtractorParams};
use shape_classify_knn::{classify, StoreError, TrainingStore};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum TrainError {
    /// Training was requested while the current frame had no observations.
    #[error("nothing to label: no regions observed in the current frame")]
    NothingToLabel,

    /// A label was submitted without a pending selection.
    #[error("no training selection is pending")]
    NoPendingSelection,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lifecycle of an interactive session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Frames are being consumed and classified.
    Running,
    /// Frame consumption is suspended until the operator supplies a label
    /// or cancels.
    AwaitingLabel,
    /// The operator asked to end the session.
    Exiting,
}

/// One classified region observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    pub shape: ShapeDescriptor,
    /// Nearest-neighbor label; `None` while the training set is empty.
    pub label: Option<String>,
    /// Distance to the winning example, when one exists.
    pub distance: Option<f64>,
}

impl Observation {
    pub fn overlay(&self) -> RegionOverlay {
        RegionOverlay::from_descriptor(&self.shape, self.label.as_deref())
    }
}

/// Classified contents of one frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameSummary {
    pub frame_index: u64,
    pub observations: Vec<Observation>,
}

impl FrameSummary {
    /// Overlay primitives for the display collaborator, one per observation.
    pub fn overlays(&self) -> Vec<RegionOverlay> {
        self.observations.iter().map(Observation::overlay).collect()
    }
}

/// Owns the training store and the per-frame pipeline state.
pub struct Session {
    extractor: RegionExtractor,
    store: TrainingStore,
    state: SessionState,
    frame_index: u64,
    /// Observations of the most recent frame; training selects into these
    /// by index so a pending selection cannot dangle.
    current: Vec<Observation>,
    pending: Option<usize>,
}

impl Session {
    /// Open a session backed by the store at `store_path`.
    ///
    /// An unreadable store degrades to an empty training set so the session
    /// stays usable; the failure is logged, not escalated.
    pub fn open(store_path: impl Into<PathBuf>, params: RegionExtractorParams) -> Self {
        let store_path = store_path.into();
        let store = match TrainingStore::open(&store_path) {
            Ok(store) => store,
            Err(err) => {
                warn!(
                    "training store {} unreadable ({err}); starting with an empty set",
                    store_path.display()
                );
                TrainingStore::empty(store_path)
            }
        };
        Self::with_store(store, params)
    }

    pub fn with_store(store: TrainingStore, params: RegionExtractorParams) -> Self {
        Self {
            extractor: RegionExtractor::new(params),
            store,
            state: SessionState::Running,
            frame_index: 0,
            current: Vec::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &TrainingStore {
        &self.store
    }

    /// Observations of the most recently processed frame.
    pub fn observations(&self) -> &[Observation] {
        &self.current
    }

    /// Run the read path on one frame's mask: extract regions, compute
    /// descriptors, classify each against the training set. The training
    /// set is never touched here.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mask), fields(frame = self.frame_index))
    )]
    pub fn process_mask(&mut self, mask: &MaskView<'_>) -> FrameSummary {
        let regions = self.extractor.extract(mask);
        let descriptors = extract_all(mask, &regions);

        let observations: Vec<Observation> = descriptors
            .into_iter()
            .map(|shape| match classify(&shape, self.store.examples()) {
                Some(found) => Observation {
                    shape,
                    label: Some(found.label.to_owned()),
                    distance: Some(found.distance),
                },
                None => Observation {
                    shape,
                    label: None,
                    distance: None,
                },
            })
            .collect();

        self.current = observations.clone();
        self.pending = None;

        let summary = FrameSummary {
            frame_index: self.frame_index,
            observations,
        };
        self.frame_index += 1;
        summary
    }

    /// Enter `AwaitingLabel`, selecting the observation with the largest
    /// oriented-box area in the current frame. Returns the selected index.
    ///
    /// With zero observations the command is rejected outright and the
    /// session stays in `Running`.
    pub fn begin_training(&mut self) -> Result<usize, TrainError> {
        let mut selected: Option<usize> = None;
        let mut best_area = f32::NEG_INFINITY;
        for (index, observation) in self.current.iter().enumerate() {
            let area = observation.shape.obb.area();
            if area > best_area {
                best_area = area;
                selected = Some(index);
            }
        }

        let selected = selected.ok_or(TrainError::NothingToLabel)?;
        self.pending = Some(selected);
        self.state = SessionState::AwaitingLabel;
        Ok(selected)
    }

    /// Attach the operator's label to the selected observation and append
    /// it to the training store, then return to `Running`.
    ///
    /// On a store failure the pending selection and the in-memory set are
    /// left untouched, so the command can be retried.
    pub fn submit_label(&mut self, label: &str) -> Result<(), TrainError> {
        let index = self.pending.ok_or(TrainError::NoPendingSelection)?;
        let shape = self.current[index].shape.clone();
        self.store.append(LabeledShape::new(shape, label))?;

        info!(
            "trained {label:?} on observation {index} ({} example(s) total)",
            self.store.len()
        );
        self.pending = None;
        self.state = SessionState::Running;
        Ok(())
    }

    /// Abandon a pending selection and resume the frame loop.
    pub fn cancel_training(&mut self) {
        self.pending = None;
        self.state = SessionState::Running;
    }

    pub fn request_exit(&mut self) {
        self.state = SessionState::Exiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shape_classify_core::Mask;
    use shape_classify_knn::TrainingStore;

    fn small_params() -> RegionExtractorParams {
        RegionExtractorParams { min_area: 100 }
    }

    fn mask_with_squares(squares: &[(usize, usize, usize)]) -> Mask {
        let mut mask = Mask::new(160, 160);
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    mask.data[y * 160 + x] = 1;
                }
            }
        }
        mask
    }

    fn session_in_tempdir(dir: &tempfile::TempDir) -> Session {
        Session::open(dir.path().join("train.csv"), small_params())
    }

    #[test]
    fn empty_training_set_leaves_observations_unclassified() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);

        let mask = mask_with_squares(&[(20, 20, 30)]);
        let summary = session.process_mask(&mask.view());
        assert_eq!(summary.observations.len(), 1);
        assert!(summary.observations[0].label.is_none());
        assert!(summary.observations[0].distance.is_none());
    }

    #[test]
    fn training_selects_the_largest_box() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);

        // Two squares; the second is clearly larger.
        let mask = mask_with_squares(&[(10, 10, 30), (60, 60, 60)]);
        let summary = session.process_mask(&mask.view());
        assert_eq!(summary.observations.len(), 2);

        let selected = session.begin_training().expect("two observations");
        assert_eq!(session.state(), SessionState::AwaitingLabel);
        session.submit_label("block").expect("append");
        assert_eq!(session.state(), SessionState::Running);

        let stored = &session.store().examples()[0];
        assert_eq!(stored.label, "block");
        // The large square is centred near (89.5, 89.5).
        assert!(stored.shape.centroid.x > 80.0);
        assert_eq!(selected, 1);
    }

    #[test]
    fn training_with_no_observations_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);

        let mask = Mask::new(160, 160);
        let summary = session.process_mask(&mask.view());
        assert!(summary.observations.is_empty());

        let err = session.begin_training().expect_err("must reject");
        assert!(matches!(err, TrainError::NothingToLabel));
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.store().is_empty());
    }

    #[test]
    fn label_without_selection_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);
        let err = session.submit_label("x").expect_err("must reject");
        assert!(matches!(err, TrainError::NoPendingSelection));
    }

    #[test]
    fn trained_shape_classifies_itself_at_distance_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);

        let mask = mask_with_squares(&[(40, 40, 40)]);
        session.process_mask(&mask.view());
        session.begin_training().expect("one observation");
        session.submit_label("square").expect("append");

        let summary = session.process_mask(&mask.view());
        let observation = &summary.observations[0];
        assert_eq!(observation.label.as_deref(), Some("square"));
        assert!(observation.distance.expect("matched") < 1e-12);
    }

    #[test]
    fn cancel_returns_to_running_without_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_in_tempdir(&dir);

        let mask = mask_with_squares(&[(20, 20, 30)]);
        session.process_mask(&mask.view());
        session.begin_training().expect("one observation");
        session.cancel_training();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.store().is_empty());

        let err = session.submit_label("late").expect_err("selection gone");
        assert!(matches!(err, TrainError::NoPendingSelection));
    }
}
