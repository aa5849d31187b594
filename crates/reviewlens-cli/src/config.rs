//! Training configuration with CLI overrides

use crate::cli::TrainArgs;
use reviewlens_classifiers::TrainingConfig;
use tracing::{debug, warn};

/// Load configuration from file (if present) and apply CLI overrides
pub fn load(args: &TrainArgs) -> anyhow::Result<TrainingConfig> {
    let mut config = if args.config.exists() {
        debug!(path = %args.config.display(), "Reading configuration file");
        TrainingConfig::from_file(&args.config)?
    } else {
        warn!(path = %args.config.display(), "Configuration file not found, using defaults");
        TrainingConfig::default()
    };

    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut TrainingConfig, args: &TrainArgs) {
    if let Some(data) = &args.data {
        config.data.path = data.clone();
    }
    if let Some(fraction) = args.sample_fraction {
        config.data.sample_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.data.sample_seed = Some(seed);
    }
    if let Some(seed) = args.split_seed {
        config.split.seed = seed;
    }
    if let Some(test_size) = args.test_size {
        config.split.test_size = test_size;
    }
    if let Some(max_features) = args.max_features {
        config.vectorizer.max_features = max_features;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(config: PathBuf) -> TrainArgs {
        TrainArgs {
            config,
            data: None,
            sample_fraction: None,
            seed: None,
            split_seed: None,
            test_size: None,
            max_features: None,
            save_model: None,
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load(&args(dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, TrainingConfig::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reviewlens.yaml");
        std::fs::write(
            &path,
            "data:\n  path: from-file.csv\n  sample_fraction: 0.3\nvectorizer:\n  max_features: 50\n",
        )
        .unwrap();

        let mut a = args(path);
        a.max_features = Some(10);
        a.seed = Some(9);
        let config = load(&a).unwrap();

        assert_eq!(config.data.path, PathBuf::from("from-file.csv"));
        assert_eq!(config.data.sample_fraction, 0.3);
        assert_eq!(config.data.sample_seed, Some(9));
        assert_eq!(config.vectorizer.max_features, 10);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = TempDir::new().unwrap();
        let mut a = args(dir.path().join("absent.yaml"));
        a.sample_fraction = Some(2.0);
        assert!(load(&a).is_err());
    }
}
