// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Record;
use crate::store::{Metric, aggregate};
use crate::utils::fmt_amount;
use anyhow::{Context, Result};
use html_escape::encode_text;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Aggregated bars for one metric, ordered low to high.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub metric: Metric,
    pub bars: Vec<(String, Decimal)>,
}

impl Chart {
    fn color(&self) -> &'static str {
        match self.metric {
            Metric::TotalValue => "#2196F3",
            Metric::AverageTax => "#FF9800",
            Metric::AverageDiscount => "#4CAF50",
            Metric::TotalQuantity => "#9C27B0",
        }
    }

    pub fn label(&self, value: Decimal, symbol: &str) -> String {
        match self.metric {
            Metric::TotalValue => format!("{} {}", symbol, fmt_amount(value)),
            Metric::AverageTax | Metric::AverageDiscount => format!("{:.1}%", value.round_dp(1)),
            Metric::TotalQuantity => value.trunc().to_string(),
        }
    }

    // Bars scale to the largest positive value; zero or negative values draw empty.
    fn scale(&self, value: Decimal, width: f64) -> f64 {
        let max = self
            .bars
            .iter()
            .map(|(_, v)| *v)
            .max()
            .unwrap_or(Decimal::ZERO);
        if max <= Decimal::ZERO || value <= Decimal::ZERO {
            return 0.0;
        }
        (value / max).to_f64().unwrap_or(0.0) * width
    }
}

/// One chart per metric. Empty when there are no records.
pub fn build_charts<'a, I>(records: I) -> Vec<Chart>
where
    I: IntoIterator<Item = &'a Record> + Clone,
{
    let mut charts = Vec::new();
    for metric in Metric::ALL {
        let bars = aggregate(records.clone(), metric);
        if bars.is_empty() {
            return Vec::new();
        }
        charts.push(Chart { metric, bars });
    }
    charts
}

pub fn render_text(chart: &Chart, symbol: &str, width: usize) -> String {
    let name_w = chart
        .bars
        .iter()
        .map(|(s, _)| s.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("{}\n", chart.metric.title());
    for (supplier, value) in &chart.bars {
        let len = chart.scale(*value, width as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<name_w$} | {} {}",
            supplier,
            "#".repeat(len),
            chart.label(*value, symbol),
            name_w = name_w
        );
    }
    out
}

const SVG_W: f64 = 800.0;
const LABEL_W: f64 = 180.0;
const BAR_AREA: f64 = 480.0;
const ROW_H: f64 = 30.0;
const TOP: f64 = 50.0;

/// Horizontal bar chart as a standalone SVG document, lowest bar on top.
pub fn render_svg(chart: &Chart, symbol: &str) -> String {
    let height = TOP + ROW_H * chart.bars.len() as f64 + 20.0;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Arial, sans-serif">"#,
        w = SVG_W,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" font-size="16" font-weight="bold" text-anchor="middle">{}</text>"#,
        SVG_W / 2.0,
        encode_text(chart.metric.title())
    );
    for (i, (supplier, value)) in chart.bars.iter().enumerate() {
        let y = TOP + i as f64 * ROW_H;
        let w = chart.scale(*value, BAR_AREA);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-size="12" text-anchor="end">{}</text>"#,
            LABEL_W - 8.0,
            y + ROW_H / 2.0 + 4.0,
            encode_text(supplier)
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{:.1}" height="{}" fill="{}"/>"#,
            LABEL_W,
            y + 4.0,
            w,
            ROW_H - 8.0,
            chart.color()
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{}" font-size="10">{}</text>"#,
            LABEL_W + w + 4.0,
            y + ROW_H / 2.0 + 4.0,
            encode_text(&chart.label(*value, symbol))
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Write every chart to `dir` as `<metric>_<stamp>.svg`.
pub fn export_svgs(charts: &[Chart], dir: &Path, stamp: &str, symbol: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;
    let mut written = Vec::new();
    for chart in charts {
        let path = dir.join(format!("{}_{}.svg", chart.metric.slug(), stamp));
        fs::write(&path, render_svg(chart, symbol))
            .with_context(|| format!("Write chart {}", path.display()))?;
        written.push(path);
    }
    info!(dir = %dir.display(), count = written.len(), "charts exported");
    Ok(written)
}
