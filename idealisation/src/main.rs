mod loader;

use anyhow::Context;
use clap::Parser;
use dwell_common::{
    metrics::describe_pipeline_metrics,
    to_millis,
    tracer::{TracerEngine, TracerOptions},
};
use dwell_idealisation::{DwellHistogram, IdealisationResult, IdealisationSettings, idealise_batch};
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Record files holding one `duration,amplitude,quality` line per interval.
    #[clap(required = true)]
    records: Vec<PathBuf>,

    #[command(flatten)]
    settings: IdealisationSettings,

    /// Also print the open and shut period histograms of each record.
    #[clap(long)]
    histograms: bool,

    /// Colour the log output.
    #[clap(long)]
    ansi: bool,
}

fn print_histogram(name: &str, histogram: IdealisationResult<DwellHistogram>) {
    match histogram {
        Ok(histogram) => {
            println!("{name} periods ({} below resolution)", histogram.below_resolution());
            for (edges, count) in histogram.edges().windows(2).zip(histogram.counts()) {
                if let [low, high] = edges {
                    println!("  {:>12.6} - {:>12.6} ms: {count}", to_millis(*low), to_millis(*high));
                }
            }
        }
        Err(e) => warn!("No {name} period histogram: {e}"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = TracerEngine::new(
        TracerOptions {
            ansi: args.ansi,
            ..Default::default()
        },
        "idealise",
    )?;
    describe_pipeline_metrics();
    args.settings.validate()?;

    let records = args
        .records
        .iter()
        .map(|path| {
            loader::load_record(path).with_context(|| format!("Cannot load {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (path, result) in args.records.iter().zip(idealise_batch(records, &args.settings)) {
        match result {
            Ok(record) => {
                println!("{}", path.display());
                print!("{}", record.summary());
                if args.histograms {
                    print_histogram("Open", record.open_period_histogram());
                    print_histogram("Shut", record.shut_period_histogram());
                }
            }
            Err(e) => error!("{}: {e}", path.display()),
        }
    }
    Ok(())
}
