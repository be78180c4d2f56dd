//! The flat binary container written by the solver pipeline.
//!
//! An archive carries everything downstream tooling needs in one file: node
//! coordinates with their solver numbering, element connectivity grouped into
//! blocks of one shape each, named element and node sets, and arrays of
//! per-integration-point result values. [`Archive`] is the in-memory form;
//! the wire layout is documented in the parser.

mod parser;
mod serializer;

use std::fs::File;
use std::io;
use std::path::Path;

use crate::element::ElementKind;
use crate::mesh::Block;
use crate::source::{IdSet, ResultField, SampleArray, Source};

pub use parser::Error as ParseError;

const MAGIC: &[u8; 4] = b"FeNC";
const VERSION: u8 = 1;

/// Section tags of the wire format.
mod section {
    pub const NODES: u8 = 1;
    pub const ELEMENTS: u8 = 2;
    pub const ELSET: u8 = 3;
    pub const NODESET: u8 = 4;
    pub const SAMPLES: u8 = 5;
    pub const END: u8 = 6;
}

/// In-memory form of a solver archive.
///
/// Fields are public so callers can assemble archives directly;
/// [`Archive::from_reader`] fills them from the wire format instead.
#[derive(Debug, Default, PartialEq)]
pub struct Archive {
    pub coordinates: Vec<[f32; 3]>,
    pub node_numbers: Vec<i32>,
    pub blocks: Vec<Block>,
    pub element_sets: Vec<IdSet>,
    pub node_sets: Vec<IdSet>,
    pub results: Vec<ResultField>,
}

impl Archive {
    /// Reads an archive from `r`.
    ///
    /// Bytes after the end tag are left unread.
    pub fn from_reader(r: impl io::BufRead) -> Result<Archive, ParseError> {
        parser::parse(r)
    }

    /// Reads an archive from the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Archive, ParseError> {
        let file = File::open(path)?;
        Archive::from_reader(io::BufReader::new(file))
    }

    /// Writes the archive in wire format.
    pub fn serialize<W: io::Write>(&self, w: W) -> io::Result<()> {
        serializer::write(self, w)
    }

    /// Records an integration-point array, overwriting any earlier array for
    /// the same field and element shape.
    fn insert_samples(
        &mut self,
        category: &str,
        field: &str,
        kind: ElementKind,
        samples: SampleArray,
    ) {
        let entry = match self
            .results
            .iter()
            .position(|result| result.category == category && result.field == field)
        {
            Some(i) => &mut self.results[i],
            None => {
                self.results.push(ResultField::new(category, field));
                let end = self.results.len() - 1;
                &mut self.results[end]
            }
        };
        match entry.samples.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = samples,
            None => entry.samples.push((kind, samples)),
        }
    }
}

impl Source for Archive {
    fn coordinates(&self) -> &[[f32; 3]] {
        &self.coordinates
    }

    fn node_numbers(&self) -> &[i32] {
        &self.node_numbers
    }

    fn element_blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn element_sets(&self) -> &[IdSet] {
        &self.element_sets
    }

    fn node_sets(&self) -> &[IdSet] {
        &self.node_sets
    }

    fn results(&self) -> &[ResultField] {
        &self.results
    }
}
