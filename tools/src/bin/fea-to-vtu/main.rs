use std::env;
use std::fs;
use std::io;

use anyhow::Context as _;
use anyhow::Result;
use feapost::Mesh;

const USAGE: &str = "Usage: fea-to-vtu [options] <in.fnc >out.vtu";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt("m", "mesh", "mesh archive (default: stdin)", "FILE");
    options.optopt(
        "r",
        "results",
        "take integration-point results from this archive instead",
        "FILE",
    );
    options.optopt("o", "output", "VTU output file (default: stdout)", "FILE");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        return Ok(());
    }
    if !matches.free.is_empty() {
        anyhow::bail!("too many arguments\n\n{}", options.usage(USAGE));
    }

    feapost_tools::init_logging();

    let archive = feapost_tools::read_archive(matches.opt_str("m").as_deref())?;
    let result_archive = match matches.opt_str("r") {
        Some(path) => Some(feapost_tools::read_archive(Some(&path))?),
        None => None,
    };

    let mut mesh = Mesh::from_source(&archive).context("archive is not a consistent mesh")?;
    let fields = match &result_archive {
        Some(other) => &other.results,
        None => &archive.results,
    };
    mesh.reduce_results(fields)
        .context("failed to reduce integration-point results")?;
    mesh.mark_element_sets(&archive.element_sets)
        .context("failed to mark element sets")?;
    mesh.mark_node_sets(&archive.node_sets);

    match matches.opt_str("o") {
        Some(path) => {
            let file =
                fs::File::create(&path).with_context(|| format!("failed to create {path:?}"))?;
            mesh.write_vtu(io::BufWriter::new(file))
                .with_context(|| format!("failed to write {path:?}"))?;
            println!("{path}");
        }
        None => {
            eprintln!("Writing VTU to standard output...");
            let stdout = io::stdout();
            let stdout = stdout.lock();
            mesh.write_vtu(io::BufWriter::new(stdout))
                .context("failed to write VTU to standard output")?;
        }
    }

    Ok(())
}
