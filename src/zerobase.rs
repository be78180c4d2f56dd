use crate::element::ElementKind;
use crate::mesh::Error;

/// Zero-based renumbering of a strictly increasing node-number space.
///
/// Solver node numbers are arbitrary integer labels; the output wants the
/// rank of each node in storage order. Since the numbers increase strictly,
/// `number - rank` is constant over contiguous stretches of the numbering
/// and one entry per stretch resolves any number. Meshes numbered with a
/// single starting offset collapse to one entry.
#[derive(Clone, Debug, Default)]
pub(crate) struct Offsets {
    runs: Vec<Run>,
}

#[derive(Clone, Copy, Debug)]
struct Run {
    first: i32,
    last: i32,
    offset: i32,
}

impl Offsets {
    /// Builds the run table. `point_ids` must be strictly increasing.
    pub fn new(point_ids: &[i32]) -> Offsets {
        let mut runs: Vec<Run> = Vec::new();
        for (i, &id) in point_ids.iter().enumerate() {
            let offset = id - i as i32;
            match runs.last_mut() {
                Some(run) if run.offset == offset => run.last = id,
                _ => runs.push(Run {
                    first: id,
                    last: id,
                    offset,
                }),
            }
        }
        Offsets { runs }
    }

    /// Resolves one node number to its zero-based rank.
    ///
    /// Every number of a run maps into the run's index range, so range
    /// containment is exact membership. Returns `None` for numbers outside
    /// every run.
    pub fn rank(&self, node: i32) -> Option<i32> {
        let run = if self.runs.len() == 1 {
            // uniform numbering, no search needed
            &self.runs[0]
        } else {
            let i = self.runs.partition_point(|run| run.last < node);
            self.runs.get(i)?
        };
        (run.first <= node && node <= run.last).then(|| node - run.offset)
    }

    /// Renumbers a whole connectivity block into a fresh vector, leaving
    /// the input untouched. `kind` is only carried into the error.
    pub fn apply(&self, kind: ElementKind, nodes: &[i32]) -> Result<Vec<i32>, Error> {
        nodes
            .iter()
            .map(|&node| self.rank(node).ok_or(Error::NodeNotFound { kind, node }))
            .collect()
    }
}
