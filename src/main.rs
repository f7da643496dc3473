//! CreditWise: customer segment assignment CLI
//!
//! Loads the trained artifact set once and either predicts a single record,
//! predicts a CSV batch, or prints a summary of the artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use creditwise::{data, logging, Args, CustomerRecord, Segmenter};
use std::fs::File;
use std::io;
use std::process;
use std::time::Instant;

/// Exit status for records rejected as invalid input
const EXIT_REJECTED: i32 = 2;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    logging::init_cli_logger(args.verbose);

    match run(&args) {
        Err(e) if is_rejected_input(&e) => {
            tracing::warn!(error = %e, "record rejected");
            eprintln!("Rejected input: {}", e);
            process::exit(EXIT_REJECTED);
        }
        other => other,
    }
}

/// User-fixable request errors, as opposed to broken artifacts or IO
fn is_rejected_input(err: &anyhow::Error) -> bool {
    err.downcast_ref::<creditwise::Error>()
        .map(creditwise::Error::is_input_error)
        .unwrap_or(false)
}

fn run(args: &Args) -> Result<()> {
    let segmenter = Segmenter::load(&args.artifacts).with_context(|| {
        format!("failed to load artifacts from {}", args.artifacts.display())
    })?;

    if let Some(record) = args.parse_record()? {
        run_prediction_mode(&segmenter, &record)?;
    } else if args.input.is_some() {
        run_batch_mode(args, &segmenter)?;
    } else {
        print_summary(args, &segmenter);
    }

    Ok(())
}

/// Run prediction mode for a single customer
fn run_prediction_mode(segmenter: &Segmenter, record: &CustomerRecord) -> Result<()> {
    let start_time = Instant::now();
    let prediction = segmenter.predict(record)?;
    tracing::debug!(
        elapsed_us = start_time.elapsed().as_micros() as u64,
        "prediction done"
    );

    println!(
        "Predicted: {} ({})",
        prediction.cluster_id, prediction.segment_name
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let features = segmenter.transform(record)?;
        tracing::debug!(?features, "assembled feature vector");
        let distances = segmenter.artifacts().model.distances(&features)?;
        for (cluster, distance) in distances.iter().enumerate() {
            tracing::debug!(cluster, distance, "squared distance to centroid");
        }
    }

    Ok(())
}

/// Run batch prediction over a CSV file
fn run_batch_mode(args: &Args, segmenter: &Segmenter) -> Result<()> {
    let input = args.input.as_ref().context("batch mode requires --input")?;
    let start_time = Instant::now();

    let table = data::load_records(input)
        .with_context(|| format!("failed to read records from {}", input.display()))?;
    tracing::info!(rows = table.len(), input = %input.display(), "loaded records");

    let predictions = segmenter.predict_batch(&table.records)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            data::write_predictions(file, &table, &predictions)?;
            tracing::info!(output = %path.display(), "predictions written");
        }
        None => data::write_predictions(io::stdout().lock(), &table, &predictions)?,
    }

    let mut sizes = vec![0usize; segmenter.n_clusters()];
    for prediction in &predictions {
        sizes[prediction.cluster_id] += 1;
    }
    for (cluster, &size) in sizes.iter().enumerate() {
        let percentage = if predictions.is_empty() {
            0.0
        } else {
            (size as f64 / predictions.len() as f64) * 100.0
        };
        tracing::info!(
            cluster,
            segment = %segmenter.artifacts().names.resolve(cluster),
            size,
            "{:.1}% of batch",
            percentage
        );
    }
    tracing::info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "batch complete"
    );

    Ok(())
}

/// Print the loaded artifact set: clusters, feature order and accepted values
fn print_summary(args: &Args, segmenter: &Segmenter) {
    let artifacts = segmenter.artifacts();

    println!("=== Artifact Summary ===");
    println!("Directory: {}", args.artifacts.display());
    println!("Clusters: {}", artifacts.model.n_clusters());

    println!("\n=== Segments ===");
    for cluster in 0..artifacts.model.n_clusters() {
        println!("{}: {}", cluster, artifacts.names.resolve(cluster));
    }

    println!("\n=== Feature Order ===");
    for (position, field) in artifacts.order.iter().enumerate() {
        let kind = if let Some(codec) = artifacts.codecs.codec(field) {
            let fallback = if codec.has_unknown_fallback() {
                ", unknown fallback"
            } else {
                ""
            };
            format!("categorical{}: {}", fallback, codec.classes().join(" | "))
        } else if let Some(stats) = artifacts.stats.stats(field) {
            format!("numeric, mean={:.3}, scale={:.3}", stats.mean, stats.scale)
        } else {
            "numeric, raw".to_string()
        };
        println!("{:>2}. {} ({})", position, field, kind);
    }
}
