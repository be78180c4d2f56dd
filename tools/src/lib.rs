use std::io;

use anyhow::Context as _;
use anyhow::Result;
use feapost::container::Archive;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

/// Routes library traces to stderr, filtered through the `LOG` environment
/// variable.
pub fn init_logging() {
    Registry::default()
        .with(EnvFilter::from_env("LOG"))
        .with(
            HierarchicalLayer::new(4)
                .with_thread_ids(true)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .init();
}

/// Reads an archive from `path`, or from standard input when no path is
/// given.
pub fn read_archive(path: Option<&str>) -> Result<Archive> {
    match path {
        Some(path) => {
            Archive::from_file(path).with_context(|| format!("failed to read archive {path:?}"))
        }
        None => {
            eprintln!("Reading archive from standard input...");
            let input = io::stdin();
            let input = input.lock();
            let input = io::BufReader::new(input);
            Archive::from_reader(input).context("failed to read archive from standard input")
        }
    }
}
