use crate::element::ElementKind;
use crate::mesh::Block;

/// A named subset of node or element numbers.
///
/// The numbers come in container order, unsorted, and may reference
/// entities outside the mesh they are attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdSet {
    pub name: String,
    pub ids: Vec<i32>,
}

impl IdSet {
    pub fn new(name: impl Into<String>, ids: Vec<i32>) -> IdSet {
        IdSet {
            name: name.into(),
            ids,
        }
    }
}

/// Integration-point samples for the elements of one kind.
///
/// Row `i` holds the samples of element `i` of the matching block, one
/// column per integration point. The buffer is row-major and always
/// `rows * cols` long with at least one column.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleArray {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl SampleArray {
    /// Returns `None` when `values` is not `rows * cols` long or `cols`
    /// is zero.
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> Option<SampleArray> {
        if cols == 0 || rows.checked_mul(cols) != Some(values.len()) {
            return None;
        }
        Some(SampleArray { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major sample values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Arithmetic mean of each row, in row order.
    pub fn row_means(&self) -> Vec<f32> {
        self.values
            .chunks_exact(self.cols)
            .map(|row| row.iter().sum::<f32>() / self.cols as f32)
            .collect()
    }
}

/// One `category::field` result with its per-kind sample arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultField {
    pub category: String,
    pub field: String,
    pub samples: Vec<(ElementKind, SampleArray)>,
}

impl ResultField {
    pub fn new(category: impl Into<String>, field: impl Into<String>) -> ResultField {
        ResultField {
            category: category.into(),
            field: field.into(),
            samples: Vec::new(),
        }
    }

    /// The cell-data name this field reduces into.
    pub fn name(&self) -> String {
        format!("{}::{}", self.category, self.field)
    }

    /// The sample array covering elements of `kind`, if any.
    pub fn samples_for(&self, kind: ElementKind) -> Option<&SampleArray> {
        self.samples
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, samples)| samples)
    }
}

/// One analysis container, as the mesh builder sees it.
///
/// Implementations hand out borrowed snapshots. Sections a container does
/// not carry surface as empty slices and consumers treat them as nothing
/// to enrich; a container missing its mandatory node data does not get as
/// far as implementing this trait (the parser rejects it).
pub trait Source {
    /// Node coordinates in storage order.
    fn coordinates(&self) -> &[[f32; 3]];

    /// Node numbers aligned with `coordinates`.
    fn node_numbers(&self) -> &[i32];

    /// Connectivity blocks in container order.
    fn element_blocks(&self) -> &[Block];

    /// Named element sets.
    fn element_sets(&self) -> &[IdSet];

    /// Named node sets.
    fn node_sets(&self) -> &[IdSet];

    /// Integration-point result fields.
    fn results(&self) -> &[ResultField];
}
