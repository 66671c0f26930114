use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "classbridge")]
#[command(
    author,
    version,
    about = "Run the LightGBM ONNX classifier on single samples or CSV files"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Bridge configuration file (YAML); defaults apply if it does not exist
    #[arg(short, long, global = true, default_value = "classbridge.yaml")]
    pub config: PathBuf,

    /// Override the model output slot holding class probabilities
    #[arg(long, global = true)]
    pub output_slot: Option<usize>,

    /// Refuse scaling profiles containing a zero scale
    #[arg(long, global = true)]
    pub reject_zero_scale: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Directory holding lightgbm_model.onnx, scaler_params.json and label_mapping.json
    #[arg(short, long, global = true, default_value = ".", env = "CLASSBRIDGE_ARTIFACTS")]
    pub artifacts_dir: PathBuf,

    /// Model file (overrides the artifacts directory)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Scaling profile (overrides the artifacts directory)
    #[arg(long, global = true)]
    pub scaler: Option<PathBuf>,

    /// Label map (overrides the artifacts directory)
    #[arg(long, global = true)]
    pub labels: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one sample given as comma-separated features
    Predict {
        /// Raw feature values, e.g. "0.1,2.3,..."
        #[arg(short, long, allow_hyphen_values = true)]
        features: String,

        /// Hide probabilities below this fraction
        #[arg(long, default_value = "0.01")]
        min_probability: f32,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Classify every row of a CSV file
    Batch {
        /// CSV file with one sample per row
        csv: PathBuf,

        /// Hide probabilities below this fraction
        #[arg(long, default_value = "0.01")]
        min_probability: f32,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show model shape, labels and declared engine inputs/outputs
    Info,
}
