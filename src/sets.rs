use std::collections::HashSet;

use crate::mesh::{Error, Mesh};
use crate::source::IdSet;

/// Name prefix of element-set indicator fields.
pub const ELSET_PREFIX: &str = "ElSet::";

/// Name prefix of node-set indicator fields.
pub const NODESET_PREFIX: &str = "NodeSet::";

impl Mesh {
    /// Marks element-set membership as 0/1 cell data.
    ///
    /// Needs element numbers on every block; that is checked before the
    /// first set is committed. Numbers a set holds but no block carries are
    /// skipped, so sets may reference elements outside this mesh.
    pub fn mark_element_sets(&mut self, sets: &[IdSet]) -> Result<(), Error> {
        if sets.is_empty() {
            return Ok(());
        }
        let mut numbers = Vec::with_capacity(self.cells.len());
        for block in &self.cells {
            match &block.numbers {
                Some(n) => numbers.push(n.as_slice()),
                None => return Err(Error::MissingElementNumbers { kind: block.kind }),
            }
        }
        for set in sets {
            let members: HashSet<i32> = set.ids.iter().copied().collect();
            let indicator: Vec<Vec<f32>> = numbers
                .iter()
                .map(|block| {
                    block
                        .iter()
                        .map(|n| if members.contains(n) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect();
            tracing::debug!(name = %set.name, "marked element set");
            self.cell_data
                .insert(format!("{ELSET_PREFIX}{}", set.name), indicator);
        }
        Ok(())
    }

    /// Marks node-set membership as 0/1 point data.
    ///
    /// Numbers outside the mesh's node-number space are skipped.
    pub fn mark_node_sets(&mut self, sets: &[IdSet]) {
        for set in sets {
            let members: HashSet<i32> = set.ids.iter().copied().collect();
            let indicator = self
                .point_ids
                .iter()
                .map(|id| if members.contains(id) { 1.0 } else { 0.0 })
                .collect();
            tracing::debug!(name = %set.name, "marked node set");
            self.point_data
                .insert(format!("{NODESET_PREFIX}{}", set.name), indicator);
        }
    }
}
