//! SVG line chart of benchmark timings

use super::benchmark::{Method, TimingRecord};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::debug;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 640.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;

const SVG_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}" font-family="sans-serif" font-size="12">
  <rect width="100%" height="100%" fill="white"/>
  <g stroke="#cccccc" stroke-width="1">
{%- for tick in y_ticks %}
    <line x1="{{ plot.left }}" y1="{{ tick.pos }}" x2="{{ plot.right }}" y2="{{ tick.pos }}"/>
{%- endfor %}
  </g>
  <g stroke="black" stroke-width="1">
    <line x1="{{ plot.left }}" y1="{{ plot.bottom }}" x2="{{ plot.right }}" y2="{{ plot.bottom }}"/>
    <line x1="{{ plot.left }}" y1="{{ plot.top }}" x2="{{ plot.left }}" y2="{{ plot.bottom }}"/>
  </g>
{%- for tick in x_ticks %}
  <text x="{{ tick.pos }}" y="{{ tick.label_pos }}" text-anchor="middle">{{ tick.label }}</text>
{%- endfor %}
{%- for tick in y_ticks %}
  <text x="{{ tick.label_pos }}" y="{{ tick.pos }}" dy="4" text-anchor="end">{{ tick.label }}</text>
{%- endfor %}
  <text x="{{ plot.center_x }}" y="{{ plot.x_title_y }}" text-anchor="middle">ListLen</text>
  <text x="{{ plot.y_title_x }}" y="{{ plot.center_y }}" text-anchor="middle" transform="rotate(-90 {{ plot.y_title_x }} {{ plot.center_y }})">TimeTaken (s)</text>
{%- for s in series %}
  <polyline fill="none" stroke="{{ s.color }}" stroke-width="2" points="{{ s.points }}"/>
{%- for m in s.markers %}
  <circle cx="{{ m.x }}" cy="{{ m.y }}" r="3" fill="{{ s.color }}"/>
{%- endfor %}
  <line x1="{{ plot.legend_x }}" y1="{{ s.legend_y }}" x2="{{ plot.legend_text_x }}" y2="{{ s.legend_y }}" stroke="{{ s.color }}" stroke-width="2"/>
  <text x="{{ plot.legend_text_x }}" y="{{ s.legend_y }}" dx="6" dy="4">{{ s.name }}</text>
{%- endfor %}
</svg>
"##;

/// Plot rectangle plus the derived label anchors the template places text at.
#[derive(Debug, Serialize)]
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    center_x: f64,
    center_y: f64,
    x_title_y: f64,
    y_title_x: f64,
    legend_x: f64,
    legend_text_x: f64,
}

impl PlotArea {
    fn new() -> Self {
        let (left, right) = (MARGIN_LEFT, WIDTH - MARGIN_RIGHT);
        let (top, bottom) = (MARGIN_TOP, HEIGHT - MARGIN_BOTTOM);
        Self {
            left,
            right,
            top,
            bottom,
            center_x: (left + right) / 2.0,
            center_y: (top + bottom) / 2.0,
            x_title_y: HEIGHT - 20.0,
            y_title_x: 24.0,
            legend_x: right + 20.0,
            legend_text_x: right + 44.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct Tick {
    pos: f64,
    label_pos: f64,
    label: String,
}

#[derive(Debug, Serialize)]
struct Marker {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct Series {
    name: String,
    color: &'static str,
    points: String,
    markers: Vec<Marker>,
    legend_y: f64,
}

/// Renders timings as an SVG chart: one line per method, list length on a
/// log-scaled x axis.
pub struct ChartRenderer {
    template_engine: Tera,
}

impl ChartRenderer {
    pub fn new() -> Result<Self> {
        let mut template_engine = Tera::default();
        template_engine.add_raw_template("timings.svg", SVG_TEMPLATE)?;
        Ok(Self { template_engine })
    }

    pub fn render(&self, records: &[TimingRecord]) -> Result<String> {
        let plot = PlotArea::new();

        let (x_min, x_max) = log_bounds(records);
        let y_max = records
            .iter()
            .map(|r| r.time_taken)
            .fold(0.0_f64, f64::max);
        let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

        let scale_x = |len: usize| {
            let log = (len.max(1) as f64).log10();
            plot.left + (log - x_min) / (x_max - x_min) * (plot.right - plot.left)
        };
        let scale_y = |secs: f64| plot.bottom - secs / y_max * (plot.bottom - plot.top);

        let mut lens: Vec<usize> = records.iter().map(|r| r.list_len).collect();
        lens.sort_unstable();
        lens.dedup();
        let x_ticks: Vec<Tick> = lens
            .iter()
            .map(|&len| Tick {
                pos: round1(scale_x(len)),
                label_pos: plot.bottom + 20.0,
                label: axis_label(len),
            })
            .collect();

        let y_ticks: Vec<Tick> = (0..=Y_TICKS)
            .map(|i| {
                let secs = y_max * i as f64 / Y_TICKS as f64;
                Tick {
                    pos: round1(scale_y(secs)),
                    label_pos: plot.left - 8.0,
                    label: format!("{secs:.3}"),
                }
            })
            .collect();

        let mut by_method: BTreeMap<Method, Vec<&TimingRecord>> = BTreeMap::new();
        for record in records {
            by_method.entry(record.method).or_default().push(record);
        }

        let series: Vec<Series> = by_method
            .into_iter()
            .enumerate()
            .map(|(i, (method, mut rows))| {
                rows.sort_by_key(|r| r.list_len);
                let markers: Vec<Marker> = rows
                    .iter()
                    .map(|r| Marker {
                        x: round1(scale_x(r.list_len)),
                        y: round1(scale_y(r.time_taken)),
                    })
                    .collect();
                let points = markers
                    .iter()
                    .map(|m| format!("{},{}", m.x, m.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                Series {
                    name: method.to_string(),
                    color: method_color(method),
                    points,
                    markers,
                    legend_y: plot.top + 10.0 + i as f64 * 22.0,
                }
            })
            .collect();

        let mut context = Context::new();
        context.insert("width", &WIDTH);
        context.insert("height", &HEIGHT);
        context.insert("plot", &plot);
        context.insert("x_ticks", &x_ticks);
        context.insert("y_ticks", &y_ticks);
        context.insert("series", &series);

        Ok(self.template_engine.render("timings.svg", &context)?)
    }
}

/// Render `records` to `path`, appending `.svg` when `path` has no extension.
/// Returns the path written.
pub fn render_chart(records: &[TimingRecord], path: &Path) -> Result<PathBuf> {
    let path = if path.extension().is_none() {
        path.with_extension("svg")
    } else {
        path.to_path_buf()
    };

    let svg = ChartRenderer::new()?.render(records)?;
    std::fs::write(&path, svg)?;
    debug!("Wrote chart to {}", path.display());
    Ok(path)
}

fn log_bounds(records: &[TimingRecord]) -> (f64, f64) {
    let logs = records.iter().map(|r| (r.list_len.max(1) as f64).log10());
    let min = logs.clone().fold(f64::INFINITY, f64::min);
    let max = logs.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn axis_label(len: usize) -> String {
    if len < 10_000 {
        len.to_string()
    } else {
        format!("1e{}", (len as f64).log10().round() as i32)
    }
}

fn method_color(method: Method) -> &'static str {
    match method {
        Method::Sequential => "#1f77b4",
        Method::Parallel => "#ff7f0e",
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
