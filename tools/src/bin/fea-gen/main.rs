use std::env;
use std::io;

use anyhow::Context as _;
use anyhow::Result;
use feapost::container::Archive;
use feapost::{Block, ElementKind, IdSet, ResultField, SampleArray};

const USAGE: &str = "Usage: fea-gen [options] >out.fnc";

/// Builds a brick of `cells`^3 hexahedra on a unit grid, nodes numbered
/// consecutively from `base`. With `gap`, the upper half of the nodes jumps
/// ahead by 1000, which gives the numbering two constant-offset stretches.
fn brick(cells: usize, base: i32, gap: bool) -> Archive {
    let side = cells + 1;
    let node_count = side * side * side;

    let number_of = |index: usize| -> i32 {
        let mut number = base + index as i32;
        if gap && index >= node_count / 2 {
            number += 1000;
        }
        number
    };
    let number_at = |i: usize, j: usize, k: usize| number_of((k * side + j) * side + i);

    let mut coordinates = Vec::with_capacity(node_count);
    let mut node_numbers = Vec::with_capacity(node_count);
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                node_numbers.push(number_of(coordinates.len()));
                coordinates.push([i as f32, j as f32, k as f32]);
            }
        }
    }

    let mut nodes = Vec::with_capacity(cells * cells * cells * 8);
    let mut numbers = Vec::with_capacity(cells * cells * cells);
    for k in 0..cells {
        for j in 0..cells {
            for i in 0..cells {
                nodes.extend([
                    number_at(i, j, k),
                    number_at(i + 1, j, k),
                    number_at(i + 1, j + 1, k),
                    number_at(i, j + 1, k),
                    number_at(i, j, k + 1),
                    number_at(i + 1, j, k + 1),
                    number_at(i + 1, j + 1, k + 1),
                    number_at(i, j + 1, k + 1),
                ]);
                numbers.push(numbers.len() as i32 + 1);
            }
        }
    }

    Archive {
        coordinates,
        node_numbers,
        blocks: vec![Block {
            kind: ElementKind::Hexa8,
            nodes,
            numbers: Some(numbers),
        }],
        ..Archive::default()
    }
}

/// Adds the bottom face as a node set and the lower half of the elements as
/// an element set.
fn add_sets(archive: &mut Archive, cells: usize) {
    let side = cells + 1;
    let bottom = archive.node_numbers[..side * side].to_vec();
    archive.node_sets.push(IdSet::new("bottom", bottom));

    let element_count = cells * cells * cells;
    let cap = (element_count / 2).max(1) as i32;
    let lower = (1..=cap).collect();
    archive.element_sets.push(IdSet::new("lower", lower));
}

/// Adds a two-integration-point field whose per-element mean is the height
/// of the element's centre.
fn add_height_field(archive: &mut Archive, cells: usize) -> Result<()> {
    let element_count = cells * cells * cells;
    let mut values = Vec::with_capacity(2 * element_count);
    for k in 0..cells {
        for _ in 0..cells * cells {
            values.push(k as f32);
            values.push((k + 1) as f32);
        }
    }
    let samples =
        SampleArray::new(element_count, 2, values).context("sample array shape mismatch")?;
    let mut field = ResultField::new("synthetic", "height");
    field.samples.push((ElementKind::Hexa8, samples));
    archive.results.push(field);
    Ok(())
}

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt("n", "cells", "cells per side (default: 4)", "COUNT");
    options.optopt("b", "base", "first solver node number (default: 1)", "NUMBER");
    options.optflag("g", "gap", "insert a jump in the node numbering");
    options.optflag("s", "sets", "add one element set and one node set");
    options.optflag("r", "results", "add a synthetic integration-point field");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        return Ok(());
    }
    if !matches.free.is_empty() {
        anyhow::bail!("too many arguments\n\n{}", options.usage(USAGE));
    }

    let cells: usize = matches.opt_get("n")?.unwrap_or(4);
    if cells == 0 {
        anyhow::bail!("expected at least one cell per side");
    }
    let base: i32 = matches.opt_get("b")?.unwrap_or(1);

    let mut archive = brick(cells, base, matches.opt_present("g"));
    if matches.opt_present("s") {
        add_sets(&mut archive, cells);
    }
    if matches.opt_present("r") {
        add_height_field(&mut archive, cells)?;
    }

    eprintln!("Writing archive to standard output...");

    let stdout = io::stdout();
    let stdout = stdout.lock();
    let stdout = io::BufWriter::new(stdout);
    archive.serialize(stdout).context("failed to write archive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use feapost::Mesh;

    #[test]
    fn brick_is_a_consistent_mesh() {
        let mut archive = brick(2, 5, true);
        add_sets(&mut archive, 2);
        add_height_field(&mut archive, 2).unwrap();

        let mut mesh = Mesh::from_source(&archive).unwrap();
        mesh.reduce_results(&archive.results).unwrap();
        mesh.mark_element_sets(&archive.element_sets).unwrap();
        mesh.mark_node_sets(&archive.node_sets);

        assert_eq!(mesh.point_count(), 27);
        assert_eq!(mesh.element_count(), 8);
        for entry in mesh.cells_zero_based() {
            let (_, nodes) = entry.unwrap();
            assert!(nodes.iter().all(|&node| 0 <= node && node < 27));
        }
        // centre heights of the two element layers
        assert_eq!(
            mesh.cell_data()["synthetic::height"],
            vec![vec![0.5, 0.5, 0.5, 0.5, 1.5, 1.5, 1.5, 1.5]],
        );
    }
}
