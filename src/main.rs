// Command line front end: compare two images, or scan a directory for duplicates.

use anyhow::{Context, bail};
use clap::{Arg, ArgAction, Command, value_parser};
use icon_similarity::CustomCoefficients;
use icon_similarity::parallel_pipeline::BatchProcessor;
use icon_similarity::pipeline::{PipelineConfig, SignaturePipeline, Verdict, save_png};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;

fn parse_coefficients(raw: &str) -> anyhow::Result<CustomCoefficients> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("coefficients must be numbers, got {:?}", raw))?;
    let [luma, chroma_b, chroma_r, proportion] = values[..] else {
        bail!("expected 4 coefficients (Y,CB,CR,PROP), got {}", values.len());
    };
    Ok(CustomCoefficients::new(luma, chroma_b, chroma_r, proportion)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("icon_similarity")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decide whether images are visually similar using tiny perceptual icons.")
        .arg(
            Arg::new("image_a")
                .help("First image")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("scan")
                .index(1),
        )
        .arg(
            Arg::new("image_b")
                .help("Second image")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("scan")
                .index(2),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .help("Report similar pairs among all images in a directory")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .conflicts_with_all(["image_a", "image_b", "icon_out"]),
        )
        .arg(
            Arg::new("rotations")
                .long("rotations")
                .help("Also accept 90° and 270° rotations")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("coefficients")
                .long("coefficients")
                .short('c')
                .help("Threshold multipliers, 1 is the default tolerance and 0 demands identity")
                .value_name("Y,CB,CR,PROP"),
        )
        .arg(
            Arg::new("icon_out")
                .long("icon-out")
                .help("Write a PNG preview of the first image's icon")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log generation details")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let coefficients = match matches.get_one::<String>("coefficients") {
        Some(raw) => parse_coefficients(raw)?,
        None => CustomCoefficients::UNIT,
    };
    let config = PipelineConfig {
        coefficients,
        check_rotations: matches.get_flag("rotations"),
        ..PipelineConfig::default()
    };

    if let Some(dir) = matches.get_one::<PathBuf>("scan") {
        return scan(dir, config).await;
    }

    let path_a = matches.get_one::<PathBuf>("image_a").context("missing first image")?;
    let path_b = matches.get_one::<PathBuf>("image_b").context("missing second image")?;

    let pipeline = SignaturePipeline::new(config);
    let icon_a = pipeline.icon_for_path(path_a)?;
    let icon_b = pipeline.icon_for_path(path_b)?;

    if let Some(out) = matches.get_one::<PathBuf>("icon_out") {
        save_png(&icon_a.to_rgba_image(), out)?;
        println!("Icon preview saved to {}", out.display());
    }

    let report = pipeline.compare(&icon_a, &icon_b)?;
    let metrics = report.metrics;
    println!("proportion: {:.6}", metrics.proportion);
    println!("luma:       {:.3}", metrics.luma);
    println!("chroma_b:   {:.3}", metrics.chroma_b);
    println!("chroma_r:   {:.3}", metrics.chroma_r);
    let verdict = match report.verdict {
        Verdict::Similar => "similar",
        Verdict::SimilarRotated => "similar (rotated)",
        Verdict::Different => "different",
    };
    println!("verdict:    {}", verdict);
    Ok(())
}

async fn scan(dir: &Path, config: PipelineConfig) -> anyhow::Result<()> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let processor = BatchProcessor::new(config);
    let entries = processor.generate(paths).await;

    let mut names = Vec::with_capacity(entries.len());
    let mut icons = Vec::with_capacity(entries.len());
    for entry in entries {
        // Undecodable files stay in as empty icons and never match.
        icons.push(entry.icon.unwrap_or_else(|_| icon_similarity::Icon::empty()));
        names.push(entry.path);
    }

    let pairs = processor.find_duplicates(Arc::new(icons)).await?;
    for (i, j) in &pairs {
        println!("{}\t{}", names[*i].display(), names[*j].display());
    }
    println!("{} similar pair(s) among {} file(s)", pairs.len(), names.len());
    Ok(())
}
