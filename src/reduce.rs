use crate::mesh::{Error, Mesh};
use crate::source::ResultField;

impl Mesh {
    /// Reduces integration-point samples to one mean value per element and
    /// stores them as cell data.
    ///
    /// Every field must cover every block kind of the mesh with one sample
    /// row per element; rows are averaged over their columns. A field is
    /// committed only once all of its blocks reduced, so a failing field
    /// leaves no partial entry and fields committed earlier in the same
    /// call stay. An empty `fields` slice is a no-op.
    pub fn reduce_results(&mut self, fields: &[ResultField]) -> Result<(), Error> {
        for field in fields {
            let mut reduced = Vec::with_capacity(self.cells.len());
            for block in &self.cells {
                let samples =
                    field
                        .samples_for(block.kind)
                        .ok_or_else(|| Error::MissingSamples {
                            category: field.category.clone(),
                            field: field.field.clone(),
                            kind: block.kind,
                        })?;
                if samples.rows() != block.element_count() {
                    return Err(Error::SampleShape {
                        category: field.category.clone(),
                        field: field.field.clone(),
                        kind: block.kind,
                        expected: block.element_count(),
                        actual: samples.rows(),
                    });
                }
                reduced.push(samples.row_means());
            }
            tracing::debug!(name = %field.name(), "reduced result field");
            self.cell_data.insert(field.name(), reduced);
        }
        Ok(())
    }
}
