use std::env;

use anyhow::Result;
use itertools::Itertools as _;

const USAGE: &str = "Usage: fea-info [options] <in.fnc";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt("m", "mesh", "mesh archive (default: stdin)", "FILE");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        return Ok(());
    }
    if !matches.free.is_empty() {
        anyhow::bail!("too many arguments\n\n{}", options.usage(USAGE));
    }

    let archive = feapost_tools::read_archive(matches.opt_str("m").as_deref())?;

    println!("nodes: {}", archive.coordinates.len());
    let element_count: usize = archive
        .blocks
        .iter()
        .map(|block| block.element_count())
        .sum();
    println!("elements: {}", element_count);
    for block in &archive.blocks {
        let numbered = if block.numbers.is_some() {
            ", numbered"
        } else {
            ""
        };
        println!("  {} {}{}", block.element_count(), block.kind, numbered);
    }
    for set in &archive.element_sets {
        println!("element set {:?}: {} elements", set.name, set.ids.len());
    }
    for set in &archive.node_sets {
        println!("node set {:?}: {} nodes", set.name, set.ids.len());
    }
    for result in &archive.results {
        let shapes = result
            .samples
            .iter()
            .map(|(kind, samples)| format!("{} {}x{}", kind, samples.rows(), samples.cols()))
            .join(", ");
        println!("result {}: {}", result.name(), shapes);
    }

    Ok(())
}
