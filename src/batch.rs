use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::pipeline::{PipelineParams, PipelineResult, process_file};

/// One image to process, with its own parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub path: PathBuf,
    pub title: String,
    pub params: PipelineParams,
}

impl BatchJob {
    pub fn new(path: impl Into<PathBuf>, params: PipelineParams) -> Self {
        let path = path.into();
        let title = basename(&path);
        Self { path, title, params }
    }

    /// The giraffe, airplane and satellite photographs with their tuned parameters
    pub fn defaults() -> Vec<BatchJob> {
        vec![
            BatchJob::new("GIRAFA.jpeg", PipelineParams::new(30, 7)),
            BatchJob::new("AVIAO.jpeg", PipelineParams::new(40, 5)),
            BatchJob::new("SATELITE.jpeg", PipelineParams::new(20, 9)),
        ]
    }

    /// Parse `PATH[:OFFSET[:KERNEL]]`, filling missing values from `fallback`
    pub fn parse_with(spec: &str, fallback: PipelineParams) -> Result<Self> {
        let mut parts = spec.rsplitn(3, ':').collect::<Vec<_>>();
        parts.reverse();

        // Only trailing numeric fields are parameters, so paths containing ':' still work
        let numeric = |s: &str| s.parse::<i64>().is_ok();
        let (path, offset, kernel) = match parts.as_slice() {
            [path, offset, kernel] if numeric(*offset) && numeric(*kernel) => {
                (path.to_string(), Some(*offset), Some(*kernel))
            }
            [head @ .., last] if !head.is_empty() && numeric(*last) => (head.join(":"), Some(*last), None),
            _ => (spec.to_string(), None, None),
        };

        if path.is_empty() {
            return Err(Error::InvalidArgument(format!("missing image path in '{spec}'")));
        }

        let mut params = fallback;
        if let Some(offset) = offset {
            params.threshold_offset = offset.parse().map_err(|_| {
                Error::InvalidArgument(format!("invalid threshold offset '{offset}'"))
            })?;
        }
        if let Some(kernel) = kernel {
            params.kernel_size = kernel
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("invalid kernel size '{kernel}'")))?;
        }
        params.validate()?;

        Ok(BatchJob::new(path, params))
    }
}

impl FromStr for BatchJob {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BatchJob::parse_with(s, PipelineParams::default())
    }
}

/// File stem used to name the figures of an image ("GIRAFA.jpeg" -> "GIRAFA")
pub fn basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Result of one job; failures do not affect the other jobs
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: Result<PipelineResult>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Process every job, returning one outcome per job in job order.
///
/// With `parallel` each job runs on its own scoped thread; runs share nothing.
/// Failures are returned, not logged; reporting is up to the caller.
pub fn run_batch(jobs: &[BatchJob], parallel: bool) -> Vec<BatchOutcome> {
    run_jobs(jobs, parallel, |job| process_file(&job.path, job.params))
}

fn run_jobs<F>(jobs: &[BatchJob], parallel: bool, process: F) -> Vec<BatchOutcome>
where
    F: Fn(&BatchJob) -> Result<PipelineResult> + Sync,
{
    let run = |job: &BatchJob| BatchOutcome {
        job: job.clone(),
        result: process(job),
    };

    if !parallel {
        return jobs.iter().map(run).collect();
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .iter()
            .map(|job| {
                let run = &run;
                scope.spawn(move || run(job))
            })
            .collect();

        // a panicking worker is a bug, not an image failure: re-raise it
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}

/// Output names for each job, in job order. Jobs whose file stems collide
/// get `_2`, `_3`, ... appended so their figures do not overwrite each other.
pub fn unique_basenames(jobs: &[BatchJob]) -> Vec<String> {
    let mut taken = HashSet::new();
    jobs.iter()
        .map(|job| {
            let stem = basename(&job.path);
            let mut name = stem.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{stem}_{n}");
                n += 1;
            }
            name
        })
        .collect()
}
