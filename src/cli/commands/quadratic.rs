//! `bdp quadratic`: sequential vs. parallel timing comparison.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

use super::print_json;
use crate::config::Settings;
use crate::quadratic::{render_chart, run_benchmark, write_timings_csv, BenchmarkOptions};

pub struct QuadraticParams {
    pub max_exponent: Option<u32>,
    pub workers: Option<usize>,
    pub out_plot: Option<PathBuf>,
    pub out_csv: Option<PathBuf>,
    pub progress: bool,
}

impl QuadraticParams {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(max_exponent) = self.max_exponent {
            settings.benchmark.max_exponent = max_exponent;
        }
        if let Some(workers) = self.workers {
            settings.benchmark.workers = workers;
        }
        if let Some(out_plot) = &self.out_plot {
            settings.benchmark.out_plot = out_plot.clone();
        }
        if let Some(out_csv) = &self.out_csv {
            settings.benchmark.out_csv = out_csv.clone();
        }
    }
}

pub fn run_quadratic_command(params: QuadraticParams, mut settings: Settings, json: bool) -> Result<()> {
    params.apply_to(&mut settings);
    settings.validate()?;

    let options = BenchmarkOptions {
        show_progress: params.progress,
        ..BenchmarkOptions::from_settings(&settings)
    };
    let records = run_benchmark(&options)?;

    let out_csv = &settings.benchmark.out_csv;
    write_timings_csv(&records, out_csv)
        .with_context(|| format!("Failed to write {}", out_csv.display()))?;
    let plot = render_chart(&records, &settings.benchmark.out_plot).with_context(|| {
        format!(
            "Failed to write {}",
            settings.benchmark.out_plot.display()
        )
    })?;

    if json {
        return print_json(&json!({
            "timings": records,
            "csv": out_csv,
            "plot": plot,
        }));
    }

    println!("{:>12}  {:<10}  {:>12}", "ListLen", "Type", "TimeTaken");
    for record in &records {
        println!(
            "{:>12}  {:<10}  {:>12.6}",
            record.list_len,
            record.method.to_string(),
            record.time_taken
        );
    }
    println!("\nTimings written to {}", out_csv.display());
    println!("Chart written to {}", plot.display());
    Ok(())
}
