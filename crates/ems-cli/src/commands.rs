use std::path::Path;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;

use ems_cli::pipeline::run_pipeline;
use ems_model::PipelineConfig;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;
use crate::types::RunResult;

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load configuration {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn run_schema(config: &PipelineConfig) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Required column"]);
    apply_table_style(&mut table);
    for schema in &config.manifest().sheets {
        for (idx, column) in schema.required.iter().enumerate() {
            let sheet = if idx == 0 { schema.sheet.as_str() } else { "" };
            table.add_row(vec![sheet, column.as_str()]);
        }
    }
    println!("{table}");
    println!(
        "Columns whose header contains \"{}\" are read as spreadsheet serial date-times.",
        config.columns.time_marker
    );
    Ok(())
}

pub fn run(args: &RunArgs, config: &PipelineConfig) -> Result<RunResult> {
    let workbook = args
        .workbook
        .clone()
        .or_else(|| config.workbook.clone())
        .ok_or_else(|| anyhow!("no workbook given; pass WORKBOOK or set `workbook` in --config"))?;
    let run = run_pipeline(&workbook, config, args.output_dir.as_deref())?;
    Ok(RunResult {
        workbook,
        output_dir: args.output_dir.clone(),
        run,
    })
}
