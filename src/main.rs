use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use contour_stages::{
    BatchJob, DebugDump, FigureWriter, PipelineParams, Stage, run_batch, unique_basenames,
};

#[derive(Parser)]
#[command(name = "contour-stages")]
#[command(about = "Run the blur/threshold/morphology/contour stage report on images")]
struct Cli {
    /// Images to process, as PATH[:OFFSET[:KERNEL]] (default: GIRAFA, AVIAO, SATELITE)
    #[arg(value_name = "IMAGE")]
    images: Vec<String>,

    /// Threshold offset for images that do not set their own
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    threshold_offset: i32,

    /// Structuring element size for images that do not set their own
    #[arg(long, default_value_t = 7)]
    kernel_size: u32,

    /// Directory for the generated figures
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Save every stage artifact to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Process images on separate threads
    #[arg(long, conflicts_with = "fail_fast")]
    parallel: bool,

    /// Stop at the first image that fails
    #[arg(long)]
    fail_fast: bool,

    /// Skip writing figures
    #[arg(long)]
    no_figures: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let fallback = PipelineParams::new(args.threshold_offset, args.kernel_size);
    fallback.validate().context("invalid default parameters")?;

    let jobs = if args.images.is_empty() {
        BatchJob::defaults()
    } else {
        args.images
            .iter()
            .map(|spec| {
                BatchJob::parse_with(spec, fallback)
                    .with_context(|| format!("invalid image argument '{spec}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let debug = args.debug_out.map(DebugDump::new).transpose()?;
    let figures = if args.no_figures {
        None
    } else {
        Some(FigureWriter::new(&args.output_dir)?)
    };

    info!("Processing {} images...", jobs.len());
    let outcomes = if args.fail_fast {
        // one at a time so nothing runs after the first failure
        let mut outcomes = Vec::new();
        for job in &jobs {
            let mut outcome = run_batch(std::slice::from_ref(job), false);
            let failed = outcome.iter().any(|o| !o.is_ok());
            outcomes.append(&mut outcome);
            if failed {
                break;
            }
        }
        outcomes
    } else {
        run_batch(&jobs, args.parallel)
    };

    // outcomes are in job order (a prefix of it under --fail-fast)
    let names = unique_basenames(&jobs);
    let mut succeeded = Vec::new();
    let mut failures = 0;
    for (outcome, name) in outcomes.iter().zip(&names) {
        match &outcome.result {
            Ok(result) => {
                if let Some(debug) = &debug {
                    debug.write(name, result)?;
                }
                if let Some(figures) = &figures {
                    figures.write_image_figures(name, result)?;
                }
                succeeded.push(result);
            }
            Err(e) => {
                error!("{}: {}", outcome.job.path.display(), e);
                failures += 1;
            }
        }
    }

    if let Some(figures) = &figures {
        if !succeeded.is_empty() {
            figures.write_batch_figures(&succeeded)?;
        }
    }

    info!("Stages applied:");
    for stage in Stage::ALL {
        info!("  {}. {}", stage.number(), stage.label());
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} images failed", jobs.len());
    }
    info!("All {} images processed", outcomes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_and_fail_fast_are_exclusive() {
        let parsed = Cli::try_parse_from(["contour-stages", "--parallel", "--fail-fast"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn job_specs_and_flags_parse() {
        let cli = Cli::try_parse_from([
            "contour-stages",
            "--parallel",
            "--threshold-offset",
            "-10",
            "GIRAFA.jpeg:40:5",
        ])
        .unwrap();
        assert!(cli.parallel && !cli.fail_fast);
        assert_eq!(cli.threshold_offset, -10);
        assert_eq!(cli.images, vec!["GIRAFA.jpeg:40:5"]);
    }
}
