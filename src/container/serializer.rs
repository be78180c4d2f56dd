use std::io;

use super::section;
use super::{Archive, MAGIC, VERSION};
use crate::source::IdSet;

fn write_name<W: io::Write>(w: &mut W, name: &str) -> io::Result<()> {
    let len = u16::try_from(name.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "name too long"))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(name.as_bytes())
}

fn write_set<W: io::Write>(w: &mut W, tag: u8, set: &IdSet) -> io::Result<()> {
    w.write_all(&[tag])?;
    write_name(w, &set.name)?;
    w.write_all(&(set.ids.len() as u64).to_le_bytes())?;
    for id in &set.ids {
        w.write_all(&id.to_le_bytes())?;
    }
    Ok(())
}

pub fn write<W: io::Write>(archive: &Archive, mut w: W) -> io::Result<()> {
    // Header
    w.write_all(MAGIC)?;
    w.write_all(&[VERSION, 0])?;

    // Nodes
    w.write_all(&[section::NODES])?;
    w.write_all(&(archive.coordinates.len() as u64).to_le_bytes())?;
    for point in &archive.coordinates {
        for coordinate in point {
            w.write_all(&coordinate.to_le_bytes())?;
        }
    }
    for number in &archive.node_numbers {
        w.write_all(&number.to_le_bytes())?;
    }

    // Element blocks
    for block in &archive.blocks {
        w.write_all(&[section::ELEMENTS])?;
        write_name(&mut w, block.kind.code())?;
        w.write_all(&(block.element_count() as u64).to_le_bytes())?;
        w.write_all(&[block.numbers.is_some() as u8])?;
        for node in &block.nodes {
            w.write_all(&node.to_le_bytes())?;
        }
        if let Some(numbers) = &block.numbers {
            for number in numbers {
                w.write_all(&number.to_le_bytes())?;
            }
        }
    }

    // Sets
    for set in &archive.element_sets {
        write_set(&mut w, section::ELSET, set)?;
    }
    for set in &archive.node_sets {
        write_set(&mut w, section::NODESET, set)?;
    }

    // Integration-point results
    for result in &archive.results {
        for (kind, samples) in &result.samples {
            w.write_all(&[section::SAMPLES])?;
            write_name(&mut w, &result.category)?;
            write_name(&mut w, &result.field)?;
            write_name(&mut w, kind.code())?;
            w.write_all(&(samples.rows() as u64).to_le_bytes())?;
            w.write_all(&(samples.cols() as u64).to_le_bytes())?;
            for value in samples.values() {
                w.write_all(&value.to_le_bytes())?;
            }
        }
    }

    w.write_all(&[section::END])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::Archive;
    use crate::element::ElementKind;
    use crate::mesh::Block;
    use crate::source::{IdSet, ResultField, SampleArray};

    #[test]
    fn test_roundtrip() {
        let mut field = ResultField::new("fatigue", "stress");
        field.samples.push((
            ElementKind::Tetra4,
            SampleArray::new(1, 4, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
        ));
        let archive = Archive {
            coordinates: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            node_numbers: vec![1, 2, 3, 4],
            blocks: vec![Block {
                kind: ElementKind::Tetra4,
                nodes: vec![1, 2, 3, 4],
                numbers: Some(vec![7]),
            }],
            element_sets: vec![IdSet::new("critical", vec![7])],
            node_sets: vec![IdSet::new("clamped", vec![1, 4])],
            results: vec![field],
        };

        let mut buf = Vec::new();
        archive.serialize(&mut buf).unwrap();
        let parsed = Archive::from_reader(buf.as_slice()).unwrap();
        assert_eq!(parsed, archive);
    }
}
