//! ctes-prep entry point: CLI wiring and config-driven pipeline run.

use std::process;

use ctes_prep::cli;
use ctes_prep::config::PrepConfig;
use ctes_prep::pipeline;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(opts.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("error: failed to install log subscriber: {e}");
        process::exit(1);
    }

    // Load config: --config takes priority, then --preset
    let loaded = match (&opts.config, &opts.preset) {
        (Some(path), _) => PrepConfig::from_toml_file(path),
        (None, Some(name)) => PrepConfig::from_preset(name),
        (None, None) => Ok(PrepConfig::baseline()),
    };
    let config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    match pipeline::run(&config, &opts.out_dir) {
        Ok(output) => {
            for summary in &output.summary.chillers {
                println!("{summary}\n");
            }
            info!(
                files = output.files.len(),
                out = %opts.out_dir.display(),
                "solver files written"
            );
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
