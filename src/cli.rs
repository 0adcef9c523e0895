use std::env;
use std::path::PathBuf;

use tracing::Level;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub out_dir: PathBuf,
    pub log_level: Level,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut config = None;
    let mut preset = None;
    let mut out_dir = None;
    let mut log_level = None;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let flag = flag.as_str();
        if matches!(flag, "--help" | "-h") {
            print_usage();
            std::process::exit(0);
        }
        let expects = match flag {
            "--config" => "a TOML file path",
            "--preset" => "a preset name",
            "--out" => "a directory path",
            "--log-level" => "trace, debug, info, warn, or error",
            other => return Err(format!("unknown argument: {other}")),
        };
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {flag} (expected {expects})"))?;
        let repeated = match flag {
            "--config" => config.replace(PathBuf::from(value)).is_some(),
            "--preset" => preset.replace(value.clone()).is_some(),
            "--out" => out_dir.replace(PathBuf::from(value)).is_some(),
            _ => {
                let level = value
                    .parse::<Level>()
                    .map_err(|_| format!("invalid --log-level \"{value}\""))?;
                log_level.replace(level).is_some()
            }
        };
        if repeated {
            return Err(format!("{flag} provided more than once"));
        }
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if config.is_none() && preset.is_none() {
        preset = Some("demo".to_string());
    }

    Ok(CliOptions {
        config,
        preset,
        out_dir: out_dir.unwrap_or_else(|| PathBuf::from("output")),
        log_level: log_level.unwrap_or(Level::INFO),
    })
}

pub fn print_usage() {
    eprintln!("ctes-prep: chiller load-shed and ice-charging curves for storage dispatch");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  ctes-prep [--config <path> | --preset <name>] [--out <dir>] [--log-level <level>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>      Load run configuration from a TOML file");
    eprintln!("  --preset <name>      Use a built-in preset (baseline, demo)");
    eprintln!("  --out <dir>          Output directory for solver files (default: output)");
    eprintln!("  --log-level <level>  trace, debug, info, warn, or error (default: info)");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the demo preset is used.");
}
