//! Append-only CSV persistence for labeled shape examples.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use nalgebra::Point2;
use shape_classify_core::{LabeledShape, OrientedBox, ShapeDescriptor};

/// Fixed record layout; one example per line, header written exactly once.
const HEADER: &str = "centroid_x,centroid_y,hu0,hu1,hu2,hu3,hu4,hu5,hu6,percentFilled,hwRatio,label";
const RECORD_FIELDS: usize = 12;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("label {0:?} is empty or contains a comma or line break")]
    InvalidLabel(String),
}

/// Durable, append-only collection of labeled examples.
///
/// The CSV file on disk and the in-memory sequence never diverge: `append`
/// persists and flushes the record before extending the in-memory set, so a
/// failed write leaves both sides as they were. Existing records are never
/// rewritten.
#[derive(Debug)]
pub struct TrainingStore {
    path: PathBuf,
    examples: Vec<LabeledShape>,
}

impl TrainingStore {
    /// Open a store, loading any existing records.
    ///
    /// A missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let examples = match File::open(&path) {
            Ok(file) => parse_records(BufReader::new(file))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        info!(
            "loaded {} training example(s) from {}",
            examples.len(),
            path.display()
        );
        Ok(Self { path, examples })
    }

    /// An empty store that will create `path` on first append.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            examples: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Examples in insertion order; the order is what makes nearest-neighbor
    /// tie-breaking deterministic.
    pub fn examples(&self) -> &[LabeledShape] {
        &self.examples
    }

    /// Durably append one labeled example.
    ///
    /// The header line is written only when the file transitions from
    /// nonexistent or empty to non-empty; appending to a populated store
    /// never duplicates it.
    pub fn append(&mut self, example: LabeledShape) -> Result<(), StoreError> {
        validate_label(&example.label)?;

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{HEADER}")?;
        }
        writeln!(file, "{}", format_record(&example))?;
        file.sync_all()?;

        debug!(
            "appended example labeled {:?} to {}",
            example.label,
            self.path.display()
        );
        self.examples.push(example);
        Ok(())
    }
}

fn validate_label(label: &str) -> Result<(), StoreError> {
    if label.is_empty() || label.contains(',') || label.contains('\n') || label.contains('\r') {
        return Err(StoreError::InvalidLabel(label.to_owned()));
    }
    Ok(())
}

fn format_record(example: &LabeledShape) -> String {
    let shape = &example.shape;
    let mut fields = Vec::with_capacity(RECORD_FIELDS);
    fields.push(shape.centroid.x.to_string());
    fields.push(shape.centroid.y.to_string());
    for hu in &shape.hu {
        fields.push(hu.to_string());
    }
    fields.push(shape.percent_filled.to_string());
    fields.push(shape.hw_ratio.to_string());
    fields.push(example.label.clone());
    fields.join(",")
}

fn parse_records(reader: impl BufRead) -> Result<Vec<LabeledShape>, StoreError> {
    let mut examples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 || line.trim().is_empty() {
            // header, or trailing blank line
            continue;
        }
        examples.push(parse_record(&line, idx + 1)?);
    }
    Ok(examples)
}

fn parse_record(line: &str, line_no: usize) -> Result<LabeledShape, StoreError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != RECORD_FIELDS {
        return Err(StoreError::Malformed {
            line: line_no,
            reason: format!("expected {RECORD_FIELDS} fields, got {}", fields.len()),
        });
    }

    let num = |i: usize| -> Result<f64, StoreError> {
        fields[i].trim().parse::<f64>().map_err(|err| StoreError::Malformed {
            line: line_no,
            reason: format!("field {i}: {err}"),
        })
    };

    let centroid = Point2::new(num(0)? as f32, num(1)? as f32);
    let mut hu = [0f64; 7];
    for (k, slot) in hu.iter_mut().enumerate() {
        *slot = num(2 + k)?;
    }
    let percent_filled = num(9)?;
    let hw_ratio = num(10)?;
    let label = fields[11].trim().to_owned();
    if label.is_empty() {
        return Err(StoreError::Malformed {
            line: line_no,
            reason: "empty label".to_owned(),
        });
    }

    Ok(LabeledShape {
        shape: ShapeDescriptor {
            centroid,
            hu,
            percent_filled,
            hw_ratio,
            // The oriented box is per-frame display state and is not part
            // of the record format.
            obb: OrientedBox::default(),
        },
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn example(label: &str, hu0: f64) -> LabeledShape {
        LabeledShape {
            shape: ShapeDescriptor {
                centroid: Point2::new(12.5, 40.25),
                hu: [hu0, 1e-4, -2.5e-7, 3.25e-9, 0.0, -1.5e-13, 7e-15],
                percent_filled: 0.7321,
                hw_ratio: 0.985,
                obb: OrientedBox::default(),
            },
            label: label.to_owned(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TrainingStore::open(dir.path().join("none.csv")).expect("open");
        assert!(store.is_empty());
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");

        let mut store = TrainingStore::open(&path).expect("open");
        store.append(example("circle", 0.162)).expect("append");
        store.append(example("wrench", 0.31)).expect("append");

        let reloaded = TrainingStore::open(&path).expect("reopen");
        assert_eq!(reloaded.len(), 2);
        let first = &reloaded.examples()[0];
        assert_eq!(first.label, "circle");
        assert_relative_eq!(first.shape.hu[0], 0.162);
        assert_relative_eq!(first.shape.hu[6], 7e-15);
        assert_relative_eq!(first.shape.percent_filled, 0.7321);
        assert_relative_eq!(first.shape.centroid.x, 12.5);
        assert_eq!(reloaded.examples()[1].label, "wrench");
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");

        let mut store = TrainingStore::open(&path).expect("open");
        store.append(example("a", 0.1)).expect("append");
        store.append(example("b", 0.2)).expect("append");
        drop(store);

        let mut store = TrainingStore::open(&path).expect("reopen");
        store.append(example("c", 0.3)).expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        let headers = contents
            .lines()
            .filter(|line| line.starts_with("centroid_x,"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn invalid_label_is_rejected_without_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");
        let mut store = TrainingStore::open(&path).expect("open");

        for bad in ["", "a,b", "line\nbreak"] {
            let err = store.append(example(bad, 0.5)).expect_err("must reject");
            assert!(matches!(err, StoreError::InvalidLabel(_)));
        }
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_record_is_reported_with_line_number() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");
        std::fs::write(&path, format!("{HEADER}\n1,2,not-a-number,0,0,0,0,0,0,0.5,1,box\n"))
            .expect("write");

        let err = TrainingStore::open(&path).expect_err("must fail");
        match err {
            StoreError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
