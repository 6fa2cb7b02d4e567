use shape_classify_core::{LabeledShape, ShapeDescriptor};

/// Result of a nearest-neighbor lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestMatch<'a> {
    pub label: &'a str,
    pub distance: f64,
    /// Index of the winning example in the training set.
    pub index: usize,
}

/// Euclidean distance over the nine invariant descriptor dimensions.
///
/// Centroid and oriented box are positional metadata and take no part in
/// the metric.
pub fn descriptor_distance(a: &ShapeDescriptor, b: &ShapeDescriptor) -> f64 {
    let va = a.invariants();
    let vb = b.invariants();
    va.iter()
        .zip(vb.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Label the query with its nearest training example.
///
/// Returns `None` when the training set is empty: callers must surface the
/// unclassified state instead of guessing a label. Ties keep the
/// earliest-inserted example: the scan follows stored order and only a
/// strictly smaller distance replaces the current best.
pub fn classify<'a>(
    query: &ShapeDescriptor,
    examples: &'a [LabeledShape],
) -> Option<NearestMatch<'a>> {
    let mut best: Option<NearestMatch<'a>> = None;
    for (index, example) in examples.iter().enumerate() {
        let distance = descriptor_distance(query, &example.shape);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(NearestMatch {
                label: &example.label,
                distance,
                index,
            });
        }
    }
    best
}
