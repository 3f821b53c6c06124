use std::path::PathBuf;

use ems_cli::pipeline::PipelineRun;

/// Outcome of `ems-arrest run`.
#[derive(Debug)]
pub struct RunResult {
    pub workbook: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub run: PipelineRun,
}
