//! reviewlens
//!
//! Trains a TF-IDF + logistic regression sentiment model on a review CSV and
//! prints a per-class classification report. Saved models can score new text,
//! raw hotel exports can be slimmed down before training, and clean exports
//! can be filtered and summarized.

use anyhow::{Context, Result};
use clap::Parser;
use reviewlens_classifiers::{Classifier, SentimentClassifier, TrainingPipeline};
use reviewlens_core::{
    load_hotel_reviews, prepare_csv, ExploreSummary, ReviewFilter, DEFAULT_DROP_COLUMNS,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod cli;
mod config;

use cli::{Cli, Commands, ExploreArgs, PredictArgs, PrepareArgs, TrainArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => train(args).await,
        Commands::Predict(args) => predict(args).await,
        Commands::Prepare(args) => prepare(args),
        Commands::Explore(args) => explore(args),
    }
}

async fn train(args: TrainArgs) -> Result<()> {
    let config = config::load(&args)?;
    info!(
        data = %config.data.path.display(),
        sample_fraction = config.data.sample_fraction,
        max_features = config.vectorizer.max_features,
        "Configuration loaded"
    );

    let pipeline = TrainingPipeline::new(config)?;
    let outcome = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .context("training task failed to complete")??;

    info!(
        n_train = outcome.n_train,
        n_test = outcome.n_test,
        accuracy = outcome.report.accuracy,
        "Training finished"
    );
    println!("{}", outcome.report);

    if let Some(path) = &args.save_model {
        outcome
            .model
            .save(path)
            .with_context(|| format!("failed to save model to {}", path.display()))?;
    }

    Ok(())
}

async fn predict(args: PredictArgs) -> Result<()> {
    let classifier = SentimentClassifier::from_file(&args.model)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;

    let texts = if args.texts.is_empty() {
        read_stdin_lines().await?
    } else {
        args.texts
    };

    let results = classifier.classify_batch(texts.as_slice()).await?;
    for (text, result) in texts.iter().zip(&results) {
        println!("{}\t{:.4}\t{}", result.label, result.score, text);
    }

    info!(
        classifier = classifier.name(),
        scored = results.len(),
        "Prediction finished"
    );
    Ok(())
}

async fn read_stdin_lines() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut texts = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            texts.push(line);
        }
    }
    Ok(texts)
}

fn prepare(args: PrepareArgs) -> Result<()> {
    if args.clean.exists() && !args.force {
        info!(
            clean = %args.clean.display(),
            "Clean file already exists, skipping (use --force to overwrite)"
        );
        return Ok(());
    }

    let summary = if args.drop.is_empty() {
        prepare_csv(&args.raw, &args.clean, DEFAULT_DROP_COLUMNS)
    } else {
        prepare_csv(&args.raw, &args.clean, args.drop.as_slice())
    }
    .with_context(|| format!("failed to prepare {}", args.raw.display()))?;

    println!(
        "Wrote {} rows with {} columns to {} (dropped: {})",
        summary.rows_written,
        summary.columns_kept.len(),
        args.clean.display(),
        summary.columns_dropped.join(", ")
    );
    Ok(())
}

fn explore(args: ExploreArgs) -> Result<()> {
    let mut filter = ReviewFilter::default().with_score_range(args.min_score, args.max_score)?;
    if let Some(pattern) = &args.hotel {
        filter = filter.with_hotel(pattern)?;
    }
    if let Some(pattern) = &args.nationality {
        filter = filter.with_nationality(pattern)?;
    }

    let reviews = load_hotel_reviews(&args.data)
        .with_context(|| format!("failed to read {}", args.data.display()))?;
    let total = reviews.len();
    let matching = filter.apply(reviews);
    info!(total, matching = matching.len(), "Filtered hotel reviews");

    let summary = ExploreSummary::from_reviews(&matching, args.top);
    let shown = &matching[..args.rows.min(matching.len())];

    if args.json {
        let output = serde_json::json!({ "summary": summary, "reviews": shown });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{summary}");
    if !shown.is_empty() {
        println!();
        for review in shown {
            println!(
                "{}\t{}\t{}\t{}",
                review.hotel_name.as_deref().unwrap_or("N/A"),
                review.nationality.as_deref().unwrap_or("N/A"),
                review.score.map_or_else(|| "N/A".to_string(), |s| s.to_string()),
                review.excerpt(100)
            );
        }
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only the report or predictions
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewlens=debug,reviewlens_core=debug,reviewlens_classifiers=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("reviewlens=info,reviewlens_core=info,reviewlens_classifiers=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
