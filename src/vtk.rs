//! Assembly of the finished mesh into VTK XML unstructured grids.

use std::io;

use vtkio::IOBuffer;
use vtkio::Vtk;
use vtkio::model::Attribute;
use vtkio::model::Attributes;
use vtkio::model::ByteOrder;
use vtkio::model::CellType;
use vtkio::model::Cells;
use vtkio::model::DataArray;
use vtkio::model::DataSet;
use vtkio::model::UnstructuredGridPiece;
use vtkio::model::Version;
use vtkio::model::VertexNumbers;

use crate::element::ElementKind;
use crate::mesh::{Error, Mesh};

impl ElementKind {
    fn into_cell_type(self) -> CellType {
        match self {
            ElementKind::Tetra4 => CellType::Tetra,
            ElementKind::Pyramid5 => CellType::Pyramid,
            ElementKind::Wedge6 => CellType::Wedge,
            ElementKind::Hexa8 => CellType::Hexahedron,
            ElementKind::Tetra10 => CellType::QuadraticTetra,
            ElementKind::Wedge15 => CellType::QuadraticWedge,
            ElementKind::Hexa20 => CellType::QuadraticHexahedron,
        }
    }
}

fn scalars(name: &str, values: Vec<f32>) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.to_owned(),
        elem: vtkio::model::ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::F32(values),
    })
}

impl Mesh {
    /// Assembles the renumbered topology and every attached field into one
    /// inline unstructured-grid piece.
    ///
    /// Cell-data arrays are concatenated in block order, matching the cell
    /// order of the piece; point data passes through unchanged. No other
    /// transformation happens here.
    pub fn to_vtk(&self) -> Result<Vtk, Error> {
        let mut connectivity = Vec::new();
        let mut offsets = Vec::with_capacity(self.element_count());
        let mut types = Vec::with_capacity(self.element_count());
        for entry in self.cells_zero_based() {
            let (kind, nodes) = entry?;
            let cell_type = kind.into_cell_type();
            for element in nodes.chunks_exact(kind.node_count()) {
                connectivity.extend(element.iter().map(|&node| node as u64));
                offsets.push(connectivity.len() as u64);
                types.push(cell_type);
            }
        }

        let points: Vec<f32> = self.points.iter().flatten().copied().collect();
        let cell = self
            .cell_data
            .iter()
            .map(|(name, arrays)| {
                scalars(name, arrays.iter().flatten().copied().collect())
            })
            .collect();
        let point = self
            .point_data
            .iter()
            .map(|(name, values)| scalars(name, values.clone()))
            .collect();

        Ok(Vtk {
            version: Version::new((0, 1)),
            title: String::new(),
            byte_order: ByteOrder::BigEndian,
            file_path: None,
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F32(points),
                cells: Cells {
                    cell_verts: VertexNumbers::XML {
                        connectivity,
                        offsets,
                    },
                    types,
                },
                data: Attributes { point, cell },
            }),
        })
    }

    /// Writes the mesh as a VTK XML unstructured grid (`.vtu`).
    ///
    /// Wrapping `w` in a [`std::io::BufWriter`] is recommended.
    pub fn write_vtu<W: io::Write>(&self, w: W) -> io::Result<()> {
        let vtk = self
            .to_vtk()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        vtk.write_xml(w)
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use vtkio::model::Piece;

    use super::*;
    use crate::container::Archive;
    use crate::mesh::Block;
    use crate::source::{IdSet, ResultField, SampleArray};

    fn enriched_mesh() -> Mesh {
        let archive = Archive {
            coordinates: vec![[0.0; 3]; 5],
            node_numbers: vec![1, 2, 3, 4, 5],
            blocks: vec![
                Block {
                    kind: ElementKind::Tetra4,
                    nodes: vec![1, 2, 3, 4],
                    numbers: Some(vec![1]),
                },
                Block {
                    kind: ElementKind::Pyramid5,
                    nodes: vec![1, 2, 3, 4, 5],
                    numbers: Some(vec![2]),
                },
            ],
            ..Archive::default()
        };
        let mut mesh = Mesh::from_source(&archive).unwrap();
        let mut field = ResultField::new("fatigue", "stress");
        field.samples.push((
            ElementKind::Tetra4,
            SampleArray::new(1, 2, vec![1.0, 3.0]).unwrap(),
        ));
        field.samples.push((
            ElementKind::Pyramid5,
            SampleArray::new(1, 1, vec![7.0]).unwrap(),
        ));
        mesh.reduce_results(&[field]).unwrap();
        mesh.mark_element_sets(&[IdSet::new("loaded", vec![2])])
            .unwrap();
        mesh.mark_node_sets(&[IdSet::new("clamped", vec![1, 5])]);
        mesh
    }

    #[test]
    fn piece_shape() {
        let vtk = enriched_mesh().to_vtk().unwrap();
        let pieces = match vtk.data {
            DataSet::UnstructuredGrid { pieces, .. } => pieces,
            _ => panic!("expected an unstructured grid"),
        };
        assert_eq!(pieces.len(), 1);
        let piece = match pieces.into_iter().next().unwrap() {
            Piece::Inline(piece) => *piece,
            _ => panic!("expected an inline piece"),
        };

        assert_eq!(piece.points, IOBuffer::F32(vec![0.0; 15]));
        let (connectivity, offsets) = match piece.cells.cell_verts {
            VertexNumbers::XML {
                connectivity,
                offsets,
            } => (connectivity, offsets),
            VertexNumbers::Legacy { .. } => panic!("expected XML cells"),
        };
        assert_eq!(connectivity, vec![0, 1, 2, 3, 0, 1, 2, 3, 4]);
        assert_eq!(offsets, vec![4, 9]);
        assert_eq!(
            piece.cells.types,
            vec![CellType::Tetra, CellType::Pyramid],
        );

        // cell data concatenates in block order, point data passes through
        assert_eq!(piece.data.cell.len(), 2);
        match &piece.data.cell[0] {
            Attribute::DataArray(array) => {
                assert_eq!(array.name, "ElSet::loaded");
                assert_eq!(array.data, IOBuffer::F32(vec![0.0, 1.0]));
            }
            _ => panic!("expected a data array"),
        }
        match &piece.data.cell[1] {
            Attribute::DataArray(array) => {
                assert_eq!(array.name, "fatigue::stress");
                assert_eq!(array.data, IOBuffer::F32(vec![2.0, 7.0]));
            }
            _ => panic!("expected a data array"),
        }
        match &piece.data.point[0] {
            Attribute::DataArray(array) => {
                assert_eq!(array.name, "NodeSet::clamped");
                assert_eq!(
                    array.data,
                    IOBuffer::F32(vec![1.0, 0.0, 0.0, 0.0, 1.0]),
                );
            }
            _ => panic!("expected a data array"),
        }
    }

    #[test]
    fn write_vtu_produces_xml() {
        let mut out = Vec::new();
        enriched_mesh().write_vtu(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("UnstructuredGrid"));
    }
}
