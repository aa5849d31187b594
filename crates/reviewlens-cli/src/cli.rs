use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewlens")]
#[command(author, version, about = "Train and apply TF-IDF sentiment models on review CSVs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample, split, fit and print a classification report
    Train(TrainArgs),

    /// Score texts with a saved model
    Predict(PredictArgs),

    /// Write a clean CSV without unneeded columns
    Prepare(PrepareArgs),

    /// Filter a clean hotel review CSV and summarize the matching reviews
    Explore(ExploreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Configuration file path
    #[arg(short, long, env = "REVIEWLENS_CONFIG", default_value = "reviewlens.yaml")]
    pub config: PathBuf,

    /// Review CSV (overrides data.path)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Fraction of clean rows to sample (overrides data.sample_fraction)
    #[arg(long)]
    pub sample_fraction: Option<f64>,

    /// Sampling seed for reproducible runs (overrides data.sample_seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Train/test split seed (overrides split.seed)
    #[arg(long)]
    pub split_seed: Option<u64>,

    /// Held-out fraction (overrides split.test_size)
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Vocabulary cap (overrides vectorizer.max_features)
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Write the fitted model to this JSON file
    #[arg(long)]
    pub save_model: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Model file written by `train --save-model`
    #[arg(short, long)]
    pub model: PathBuf,

    /// Texts to score; read one per line from stdin when empty
    pub texts: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Raw CSV export
    #[arg(long, default_value = "data/Hotel_Reviews_Raw.csv")]
    pub raw: PathBuf,

    /// Clean CSV to write
    #[arg(long, default_value = "data/Hotel_Reviews_Clean.csv")]
    pub clean: PathBuf,

    /// Comma-separated columns to drop (default: the hotel export's address, tags and geo columns)
    #[arg(long, value_delimiter = ',')]
    pub drop: Vec<String>,

    /// Overwrite the clean CSV if it already exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    /// Clean hotel review CSV
    #[arg(short, long, default_value = "data/Hotel_Reviews_Clean.csv")]
    pub data: PathBuf,

    /// Case-insensitive hotel name pattern
    #[arg(long)]
    pub hotel: Option<String>,

    /// Case-insensitive reviewer nationality pattern
    #[arg(long)]
    pub nationality: Option<String>,

    /// Lowest reviewer score to keep
    #[arg(long, default_value_t = 0.0)]
    pub min_score: f64,

    /// Highest reviewer score to keep
    #[arg(long, default_value_t = 10.0)]
    pub max_score: f64,

    /// Entries in the top hotel and nationality rankings
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Also print the first N matching reviews
    #[arg(long, default_value_t = 0)]
    pub rows: usize,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_overrides() {
        let cli = Cli::try_parse_from([
            "reviewlens",
            "train",
            "--data",
            "reviews.csv",
            "--sample-fraction",
            "0.5",
            "--max-features",
            "200",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Train(args) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.data, Some(PathBuf::from("reviews.csv")));
        assert_eq!(args.sample_fraction, Some(0.5));
        assert_eq!(args.max_features, Some(200));
        assert!(args.save_model.is_none());
    }

    #[test]
    fn test_parse_predict_texts() {
        let cli =
            Cli::try_parse_from(["reviewlens", "predict", "-m", "model.json", "great", "awful"])
                .unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict command");
        };
        assert_eq!(args.texts, vec!["great", "awful"]);
    }

    #[test]
    fn test_parse_prepare_drop_list() {
        let cli = Cli::try_parse_from(["reviewlens", "prepare", "--drop", "lat,lng", "--force"])
            .unwrap();
        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare command");
        };
        assert_eq!(args.drop, vec!["lat", "lng"]);
        assert!(args.force);
        assert_eq!(args.clean, PathBuf::from("data/Hotel_Reviews_Clean.csv"));
    }

    #[test]
    fn test_parse_explore_defaults_and_filters() {
        let cli = Cli::try_parse_from(["reviewlens", "explore", "--hotel", "savoy", "--min-score", "7.5"])
            .unwrap();
        let Commands::Explore(args) = cli.command else {
            panic!("expected explore command");
        };
        assert_eq!(args.hotel.as_deref(), Some("savoy"));
        assert_eq!(args.nationality, None);
        assert_eq!(args.min_score, 7.5);
        assert_eq!(args.max_score, 10.0);
        assert_eq!(args.top, 10);
        assert_eq!(args.rows, 0);
        assert!(!args.json);
    }
}
