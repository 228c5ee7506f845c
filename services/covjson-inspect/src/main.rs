//! CoverageJSON inspector.
//!
//! Decodes a document into raster and vector products and prints a JSON
//! summary of what was produced and which coverages failed.

mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use coverage_decoder::{CoverageJsonReader, DecoderConfig};
use summary::DocumentSummary;

#[derive(Parser, Debug)]
#[command(name = "covjson-inspect")]
#[command(about = "Decode a CoverageJSON document and summarize its products")]
struct Args {
    /// CoverageJSON document to decode
    path: PathBuf,

    /// Decoder configuration file (YAML)
    #[arg(short, long, env = "COVJSON_CONFIG")]
    config: Option<PathBuf>,

    /// Override the raster no-data value
    #[arg(long, env = "COVJSON_NO_DATA_VALUE")]
    no_data_value: Option<f64>,

    /// Decode collection members one at a time
    #[arg(long)]
    sequential: bool,

    /// Pretty-print the summary
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_config(&args)?;
    info!(
        path = %args.path.display(),
        no_data_value = config.no_data_value,
        parallel = config.parallel,
        "Decoding document"
    );

    let reader = CoverageJsonReader::from_path(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let decoded = reader.decode(&config);

    for failure in &decoded.failures {
        warn!(index = failure.index, kind = ?failure.kind, "{}", failure.message);
    }
    info!(
        rasters = decoded.rasters.len(),
        vectors = decoded.vectors.len(),
        failures = decoded.failures.len(),
        "Decoded document"
    );

    let summary = DocumentSummary::new(
        &args.path.display().to_string(),
        reader.coverage_type().as_str(),
        reader.coverages_count(),
        &decoded,
    );
    let output = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", output);

    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout carries only the summary.
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<DecoderConfig> {
    let mut config = match &args.config {
        Some(path) => DecoderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DecoderConfig::default(),
    };

    if let Some(value) = args.no_data_value {
        config = config.with_no_data_value(value);
    }
    if args.sequential {
        config = config.with_parallel(false);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["covjson-inspect", "doc.covjson"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = load_config(&args(&["--no-data-value=-1", "--sequential"])).unwrap();
        assert_eq!(config.no_data_value, -1.0);
        assert!(!config.parallel);
        assert!(config.add_no_data_category);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no_data_value: 0\nno_data_color: \"#000000\"").unwrap();
        let path = file.path().to_str().unwrap();

        let config = load_config(&args(&["--config", path, "--no-data-value=-5"])).unwrap();
        assert_eq!(config.no_data_value, -5.0);
        assert_eq!(config.no_data_color, "#000000");
        assert!(config.parallel);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let err = load_config(&args(&["--config", "/nonexistent/decoder.yaml"])).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/decoder.yaml"));
    }
}
