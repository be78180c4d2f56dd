use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools as _;

use crate::element::ElementKind;
use crate::source::Source;
use crate::zerobase::Offsets;

/// Errors thrown by mesh construction and enrichment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Coordinates and node numbers differ in length.
    NodeCardinality { points: usize, numbers: usize },

    /// Node numbers stop increasing at the given position.
    UnsortedNodeNumbers { position: usize },

    /// A block's flat connectivity is not a multiple of its row width.
    BlockShape { kind: ElementKind, values: usize },

    /// A block's element-number list does not match its element count.
    ElementCardinality {
        kind: ElementKind,
        elements: usize,
        numbers: usize,
    },

    /// Connectivity references a node number absent from the mesh.
    NodeNotFound { kind: ElementKind, node: i32 },

    /// Element sets were requested on a block without element numbers.
    MissingElementNumbers { kind: ElementKind },

    /// A result field carries no samples for a kind the mesh contains.
    MissingSamples {
        category: String,
        field: String,
        kind: ElementKind,
    },

    /// A sample array's row count does not match its block.
    SampleShape {
        category: String,
        field: String,
        kind: ElementKind,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NodeCardinality { points, numbers } => {
                write!(f, "mesh has {points} points but {numbers} node numbers")
            }
            Error::UnsortedNodeNumbers { position } => {
                write!(f, "node numbers do not increase at position {position}")
            }
            Error::BlockShape { kind, values } => write!(
                f,
                "{kind} block holds {values} connectivity values, not a multiple of {}",
                kind.node_count(),
            ),
            Error::ElementCardinality {
                kind,
                elements,
                numbers,
            } => write!(
                f,
                "{kind} block has {elements} elements but {numbers} element numbers",
            ),
            Error::NodeNotFound { kind, node } => {
                write!(f, "{kind} element references unknown node {node}")
            }
            Error::MissingElementNumbers { kind } => write!(
                f,
                "{kind} block carries no element numbers, element sets need them",
            ),
            Error::MissingSamples {
                category,
                field,
                kind,
            } => write!(f, "{category}::{field} has no samples for {kind} elements"),
            Error::SampleShape {
                category,
                field,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{category}::{field} samples for {kind}: expected {expected} rows, got {actual}",
            ),
        }
    }
}

impl std::error::Error for Error {}

/// One homogeneous connectivity block.
///
/// `nodes` holds source node numbers row-major, `kind.node_count()` per
/// element. `numbers` holds the source number of each element when the
/// container provides them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub kind: ElementKind,
    pub nodes: Vec<i32>,
    pub numbers: Option<Vec<i32>>,
}

impl Block {
    pub fn new(kind: ElementKind, nodes: Vec<i32>) -> Block {
        Block {
            kind,
            nodes,
            numbers: None,
        }
    }

    /// Number of elements in this block.
    pub fn element_count(&self) -> usize {
        self.nodes.len() / self.kind.node_count()
    }
}

/// The visualization-ready mesh and its attached fields.
///
/// Constructed once per conversion from a [`Source`], then enriched in
/// place by [`Mesh::reduce_results`], [`Mesh::mark_element_sets`] and
/// [`Mesh::mark_node_sets`], and finally drained by the VTK assembly.
/// Stored connectivity keeps the source numbering; zero-based views are
/// computed on demand.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) points: Vec<[f32; 3]>,
    pub(crate) point_ids: Vec<i32>,
    pub(crate) cells: Vec<Block>,
    pub(crate) cell_data: BTreeMap<String, Vec<Vec<f32>>>,
    pub(crate) point_data: BTreeMap<String, Vec<f32>>,
}

impl Mesh {
    /// Builds a mesh from a source, validating it whole.
    ///
    /// Checks point/number cardinality, strict monotonicity of node
    /// numbers, block widths, element-number cardinality and membership of
    /// every connectivity value in the node-number space. On error no mesh
    /// is returned.
    pub fn from_source(source: &impl Source) -> Result<Mesh, Error> {
        let points = source.coordinates().to_vec();
        let point_ids = source.node_numbers().to_vec();
        if points.len() != point_ids.len() {
            return Err(Error::NodeCardinality {
                points: points.len(),
                numbers: point_ids.len(),
            });
        }
        if let Some(i) = point_ids.iter().tuple_windows().position(|(a, b)| a >= b) {
            return Err(Error::UnsortedNodeNumbers { position: i + 1 });
        }

        let offsets = Offsets::new(&point_ids);
        let cells = source.element_blocks().to_vec();
        for block in &cells {
            if block.nodes.len() % block.kind.node_count() != 0 {
                return Err(Error::BlockShape {
                    kind: block.kind,
                    values: block.nodes.len(),
                });
            }
            if let Some(numbers) = &block.numbers {
                if numbers.len() != block.element_count() {
                    return Err(Error::ElementCardinality {
                        kind: block.kind,
                        elements: block.element_count(),
                        numbers: numbers.len(),
                    });
                }
            }
            for &node in &block.nodes {
                if offsets.rank(node).is_none() {
                    return Err(Error::NodeNotFound {
                        kind: block.kind,
                        node,
                    });
                }
            }
        }

        tracing::debug!(
            points = points.len(),
            blocks = cells.len(),
            "mesh loaded"
        );
        Ok(Mesh {
            points,
            point_ids,
            cells,
            cell_data: BTreeMap::new(),
            point_data: BTreeMap::new(),
        })
    }

    /// Node coordinates in storage order.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Node numbers aligned with [`Mesh::points`], strictly increasing.
    pub fn point_ids(&self) -> &[i32] {
        &self.point_ids
    }

    /// Connectivity blocks, in source numbering.
    pub fn blocks(&self) -> &[Block] {
        &self.cells
    }

    /// Per-element fields, one array per block per name.
    pub fn cell_data(&self) -> &BTreeMap<String, Vec<Vec<f32>>> {
        &self.cell_data
    }

    /// Per-point fields.
    pub fn point_data(&self) -> &BTreeMap<String, Vec<f32>> {
        &self.point_data
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn element_count(&self) -> usize {
        self.cells.iter().map(Block::element_count).sum()
    }

    /// Renumbers every connectivity block to zero-based ranks, lazily and
    /// without touching the stored blocks.
    ///
    /// Each call recomputes the renumbering from the current node numbers;
    /// blocks come out in storage order as fresh vectors.
    pub fn cells_zero_based(
        &self,
    ) -> impl Iterator<Item = Result<(ElementKind, Vec<i32>), Error>> + '_ {
        let offsets = Offsets::new(&self.point_ids);
        self.cells
            .iter()
            .map(move |block| Ok((block.kind, offsets.apply(block.kind, &block.nodes)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Archive;

    fn tet_archive() -> Archive {
        Archive {
            coordinates: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            node_numbers: vec![1, 2, 3, 4],
            blocks: vec![Block::new(ElementKind::Tetra4, vec![1, 2, 3, 4])],
            ..Archive::default()
        }
    }

    #[test]
    fn build_and_renumber() {
        let mesh = Mesh::from_source(&tet_archive()).unwrap();
        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.element_count(), 1);
        let cells: Result<Vec<_>, _> = mesh.cells_zero_based().collect();
        let cells = cells.unwrap();
        assert_eq!(cells, vec![(ElementKind::Tetra4, vec![0, 1, 2, 3])]);
        // the stored block keeps its source numbering
        assert_eq!(mesh.blocks()[0].nodes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn piecewise_renumbering() {
        let mut archive = tet_archive();
        archive.coordinates.extend([[1.0, 1.0, 0.0], [1.0, 0.0, 1.0]]);
        archive.node_numbers = vec![1, 2, 3, 10, 11, 12];
        archive.blocks = vec![
            Block::new(ElementKind::Tetra4, vec![1, 2, 3, 10]),
            Block::new(ElementKind::Tetra4, vec![3, 10, 11, 12]),
        ];
        let mesh = Mesh::from_source(&archive).unwrap();
        let cells: Result<Vec<_>, _> = mesh.cells_zero_based().collect();
        let cells = cells.unwrap();
        assert_eq!(cells[0].1, vec![0, 1, 2, 3]);
        assert_eq!(cells[1].1, vec![2, 3, 4, 5]);
    }

    #[test]
    fn fatal_on_unsorted_numbers() {
        let mut archive = tet_archive();
        archive.node_numbers = vec![3, 2, 1, 4];
        let err = Mesh::from_source(&archive).unwrap_err();
        assert_eq!(err, Error::UnsortedNodeNumbers { position: 1 });
    }

    #[test]
    fn fatal_on_cardinality_mismatch() {
        let mut archive = tet_archive();
        archive.node_numbers.push(5);
        let err = Mesh::from_source(&archive).unwrap_err();
        assert_eq!(
            err,
            Error::NodeCardinality {
                points: 4,
                numbers: 5,
            }
        );
    }

    #[test]
    fn fatal_on_unknown_connectivity() {
        let mut archive = tet_archive();
        archive.blocks[0].nodes[3] = 9;
        let err = Mesh::from_source(&archive).unwrap_err();
        assert_eq!(
            err,
            Error::NodeNotFound {
                kind: ElementKind::Tetra4,
                node: 9,
            }
        );
    }

    #[test]
    fn fatal_on_ragged_block() {
        let mut archive = tet_archive();
        archive.blocks[0].nodes.pop();
        let err = Mesh::from_source(&archive).unwrap_err();
        assert_eq!(
            err,
            Error::BlockShape {
                kind: ElementKind::Tetra4,
                values: 3,
            }
        );
    }

    #[test]
    fn fatal_on_number_count_mismatch() {
        let mut archive = tet_archive();
        archive.blocks[0].numbers = Some(vec![1, 2]);
        let err = Mesh::from_source(&archive).unwrap_err();
        assert_eq!(
            err,
            Error::ElementCardinality {
                kind: ElementKind::Tetra4,
                elements: 1,
                numbers: 2,
            }
        );
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::from_source(&Archive::default()).unwrap();
        assert_eq!(mesh.point_count(), 0);
        assert_eq!(mesh.element_count(), 0);
        assert_eq!(mesh.cells_zero_based().count(), 0);
    }
}
