//! Command execution

use crate::cli::{ArtifactArgs, Cli, Commands};
use crate::report::{self, BatchReport};
use anyhow::{bail, Context, Result};
use classbridge_classifier::{ArtifactPaths, Bridge, BridgeConfig};
use std::path::Path;
use tracing::{debug, info};

/// Resolve artifact paths: explicit files win over the directory defaults
pub fn artifact_paths(args: &ArtifactArgs) -> ArtifactPaths {
    let defaults = ArtifactPaths::from_dir(&args.artifacts_dir);
    ArtifactPaths::new(
        args.model.clone().unwrap_or(defaults.model),
        args.scaler.clone().unwrap_or(defaults.scaler),
        args.labels.clone().unwrap_or(defaults.labels),
    )
}

/// Load the config file if present, then apply command-line overrides
pub fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = if cli.config.is_file() {
        info!(path = %cli.config.display(), "Loading configuration");
        BridgeConfig::from_file(&cli.config)
            .with_context(|| format!("failed to load config {}", cli.config.display()))?
    } else {
        debug!(path = %cli.config.display(), "No config file, using defaults");
        BridgeConfig::default()
    };

    if let Some(slot) = cli.output_slot {
        config.engine.probability_output_slot = slot;
    }
    if cli.reject_zero_scale {
        config.scaler.reject_zero_scale = true;
    }
    config.validate()?;
    Ok(config)
}

/// Parse a comma-separated feature list
pub fn parse_features(text: &str) -> Result<Vec<f32>> {
    text.split(',')
        .enumerate()
        .map(|(i, field)| {
            field
                .trim()
                .parse::<f32>()
                .with_context(|| format!("feature {} ({:?}) is not a number", i + 1, field.trim()))
        })
        .collect()
}

fn open_bridge(cli: &Cli) -> Result<Bridge> {
    let paths = artifact_paths(&cli.artifacts);
    let missing = paths.missing();
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        bail!("missing artifact files: {}", list.join(", "));
    }

    let config = load_config(cli)?;
    let mut bridge = Bridge::new(config);
    bridge
        .initialize(&paths)
        .context("failed to initialize classifier")?;
    Ok(bridge)
}

pub fn run(cli: Cli) -> Result<()> {
    let mut bridge = open_bridge(&cli)?;

    let outcome = match &cli.command {
        Commands::Predict {
            features,
            min_probability,
            json,
        } => predict(&mut bridge, features, *min_probability, *json),
        Commands::Batch {
            csv,
            min_probability,
            json,
        } => batch(&mut bridge, csv, *min_probability, *json),
        Commands::Info => show_info(&bridge),
    };

    bridge.cleanup();
    outcome
}

fn predict(bridge: &mut Bridge, features: &str, min_probability: f32, json: bool) -> Result<()> {
    let features = parse_features(features)?;
    let result = bridge.predict(&features).context("prediction failed")?;

    if json {
        let labeled = bridge.label_prediction(result)?;
        println!("{}", serde_json::to_string_pretty(&labeled)?);
    } else {
        print!(
            "{}",
            report::render_prediction(bridge.labels()?, &result, min_probability)
        );
    }
    Ok(())
}

fn batch(bridge: &mut Bridge, csv: &Path, min_probability: f32, json: bool) -> Result<()> {
    let results = bridge
        .predict_file(csv)
        .with_context(|| format!("batch prediction failed for {}", csv.display()))?;
    info!(samples = results.len(), "Batch complete");

    if json {
        let total = results.len();
        let samples = results
            .into_iter()
            .map(|r| bridge.label_prediction(r))
            .collect::<classbridge_core::Result<Vec<_>>>()?;
        let report = BatchReport {
            source: csv.display().to_string(),
            total,
            samples,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            report::render_batch(bridge.labels()?, &results, min_probability)
        );
    }
    Ok(())
}

fn show_info(bridge: &Bridge) -> Result<()> {
    let engine = bridge.engine()?;
    let config = bridge.config();

    println!("Features: {}", bridge.feature_count());
    println!("Classes:  {}", bridge.class_count());
    println!("Engine:   {}", engine.name());
    println!("Inputs:   {}", engine.input_names().join(", "));
    println!("Outputs:  {}", engine.output_names().join(", "));
    println!(
        "Slots:    input {}, probabilities {}",
        config.engine.input_slot, config.engine.probability_output_slot
    );
    println!();
    println!("Labels:");
    for (i, name) in bridge.labels()?.iter().enumerate() {
        let shown = if name.is_empty() { "<missing>" } else { name };
        println!("  {}: {}", i, shown);
    }
    Ok(())
}
