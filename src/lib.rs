//! Post-processing of finite-element results into visualization meshes.
//!
//! Solvers write a [container archive](container::Archive) holding node
//! coordinates under solver numbering, element connectivity grouped into
//! blocks of one shape each, named element and node sets, and raw
//! integration-point samples. This crate reconciles such an archive into a
//! [`Mesh`] whose cells index a compact zero-based point list, reduces the
//! samples to one value per element, turns sets into indicator fields and,
//! with the default `vtu` feature, assembles everything into a VTK XML
//! unstructured grid.
//!
//! # Example
//!
//! ```
//! use feapost::container::Archive;
//! use feapost::{Block, ElementKind, IdSet, Mesh, ResultField, SampleArray};
//!
//! // One tetrahedron whose solver numbers the nodes from 11.
//! let archive = Archive {
//!     coordinates: vec![
//!         [0.0, 0.0, 0.0],
//!         [1.0, 0.0, 0.0],
//!         [0.0, 1.0, 0.0],
//!         [0.0, 0.0, 1.0],
//!     ],
//!     node_numbers: vec![11, 12, 13, 14],
//!     blocks: vec![Block {
//!         kind: ElementKind::Tetra4,
//!         nodes: vec![11, 12, 13, 14],
//!         numbers: Some(vec![1]),
//!     }],
//!     node_sets: vec![IdSet::new("clamped", vec![11])],
//!     ..Archive::default()
//! };
//!
//! let mut mesh = Mesh::from_source(&archive).unwrap();
//!
//! let mut field = ResultField::new("fatigue", "damage");
//! field.samples.push((
//!     ElementKind::Tetra4,
//!     SampleArray::new(1, 4, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
//! ));
//! mesh.reduce_results(&[field]).unwrap();
//! mesh.mark_node_sets(&archive.node_sets);
//!
//! let (kind, nodes) = mesh.cells_zero_based().next().unwrap().unwrap();
//! assert_eq!(kind, ElementKind::Tetra4);
//! assert_eq!(nodes, vec![0, 1, 2, 3]);
//! assert_eq!(mesh.cell_data()["fatigue::damage"], vec![vec![2.5]]);
//! assert_eq!(mesh.point_data()["NodeSet::clamped"], vec![1.0, 0.0, 0.0, 0.0]);
//! ```

pub mod container;

mod element;
mod mesh;
mod reduce;
mod sets;
mod source;
#[cfg(feature = "vtu")]
mod vtk;
mod zerobase;

pub use crate::element::{ElementKind, UnknownCode};
pub use crate::mesh::{Block, Error, Mesh};
pub use crate::sets::{ELSET_PREFIX, NODESET_PREFIX};
pub use crate::source::{IdSet, ResultField, SampleArray, Source};
