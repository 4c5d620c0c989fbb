//! Series Normalizer
//!
//! Converts heterogeneous asset records into one chart payload: a shared
//! date-label axis and per-asset price, moving-average and volume series.
//! Color assignment is deterministic: asset `i` of `K` gets hue `i*360/K`.

use crate::quote::AssetQuote;
use crate::symbols;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Moving-average window, periods
pub const MOVING_AVERAGE_WINDOW: usize = 15;

/// Fixed suffix of every chart title
pub const TITLE_SUFFIX: &str = " · price trend";

/// What a series plots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    /// Closing price
    Price,
    /// Derived moving average
    MovingAverage,
    /// Traded volume
    Volume,
}

/// One plottable series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Legend label
    pub label: String,
    /// What the series plots
    pub kind: SeriesKind,
    /// CSS color, deterministic per asset
    pub color: String,
    /// One value per label; `None` where the asset has no data for a date
    pub values: Vec<Option<f64>>,
}

/// The normalized chart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Chart title: joined symbols plus the fixed suffix
    pub title: String,
    /// Shared date axis, `YYYY-MM-DD`
    pub labels: Vec<String>,
    /// All series, grouped per asset in input order
    pub series: Vec<ChartSeries>,
}

/// Moving average with cumulative (shrinking-window) fill
///
/// Points before the window fills carry the average of everything seen so
/// far, so the output always has the same length as the input and is
/// plottable without null handling.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return values.to_vec();
    }

    let mut out = Vec::with_capacity(values.len());
    let mut running_sum = 0.0;

    for (i, value) in values.iter().enumerate() {
        running_sum += value;
        if i >= window {
            running_sum -= values[i - window];
        }
        let span = (i + 1).min(window);
        out.push(running_sum / span as f64);
    }

    out
}

/// Hue of asset `index` among `count` assets
pub fn series_hue(index: usize, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (index * 360 / count) as u32
}

fn series_color(index: usize, count: usize) -> String {
    format!("hsl({}, 70%, 50%)", series_hue(index, count))
}

/// Normalize asset records into one chart payload
///
/// Returns `None` when no record carries a history series. The first
/// history-bearing record's dates become the shared label axis; records
/// whose dates disagree are re-aligned by date lookup, with `None` filling
/// dates they lack.
pub fn normalize(records: &[AssetQuote]) -> Option<ChartPayload> {
    let labels: Vec<String> = records
        .iter()
        .find(|r| !r.history.is_empty())
        .map(|r| r.history.iter().map(|p| p.date.clone()).collect())?;

    let charted: Vec<&AssetQuote> = records.iter().filter(|r| !r.history.is_empty()).collect();
    let count = charted.len();

    let mut series = Vec::new();
    for (index, record) in charted.iter().enumerate() {
        let color = series_color(index, count);
        let display = symbols::display_symbol(&record.symbol).to_string();

        let by_date: HashMap<&str, (f64, Option<u64>)> = record
            .history
            .iter()
            .map(|p| (p.date.as_str(), (p.price, p.volume)))
            .collect();

        let prices: Vec<Option<f64>> = labels
            .iter()
            .map(|date| by_date.get(date.as_str()).map(|&(price, _)| price))
            .collect();

        series.push(ChartSeries {
            label: display.clone(),
            kind: SeriesKind::Price,
            color: color.clone(),
            values: prices,
        });

        // The moving average is computed over the asset's own history, then
        // aligned the same way, so its length always equals the price
        // series' length.
        let raw_prices: Vec<f64> = record.history.iter().map(|p| p.price).collect();
        let averaged = moving_average(&raw_prices, MOVING_AVERAGE_WINDOW);
        let ma_by_date: HashMap<&str, f64> = record
            .history
            .iter()
            .zip(averaged.iter())
            .map(|(p, &ma)| (p.date.as_str(), ma))
            .collect();

        series.push(ChartSeries {
            label: format!("{display} {MOVING_AVERAGE_WINDOW}-day MA"),
            kind: SeriesKind::MovingAverage,
            color: color.clone(),
            values: labels
                .iter()
                .map(|date| ma_by_date.get(date.as_str()).copied())
                .collect(),
        });

        if record.history.iter().any(|p| p.volume.is_some()) {
            series.push(ChartSeries {
                label: format!("{display} volume"),
                kind: SeriesKind::Volume,
                color,
                values: labels
                    .iter()
                    .map(|date| {
                        by_date
                            .get(date.as_str())
                            .and_then(|&(_, volume)| volume.map(|v| v as f64))
                    })
                    .collect(),
            });
        }
    }

    let title = format!(
        "{}{TITLE_SUFFIX}",
        charted
            .iter()
            .map(|r| symbols::display_symbol(&r.symbol))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Some(ChartPayload {
        title,
        labels,
        series,
    })
}
