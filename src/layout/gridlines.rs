use std::fmt::Write;

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};

use crate::config::LayoutConfig;
use crate::ir::Granularity;

use super::dates::{format_date, next_boundary};
use super::scale::TimeScale;
use super::types::{Bounds, Gridline, LabelLayout, ScaleTier, TextAnchor};

const EDGE_EPS: f32 = 1e-3;

/// Every period boundary after `frame_start` up to and including
/// `frame_end`, with its x position inside the band.
pub fn generate_gridlines(
    frame_start: NaiveDate,
    frame_end: NaiveDate,
    granularity: Granularity,
    band_x: f32,
    band_width: f32,
) -> Vec<Gridline> {
    let scale = TimeScale::new(frame_start, frame_end, band_x, band_width);
    let mut gridlines = Vec::new();
    let mut current = next_boundary(frame_start, granularity);
    while let Some(date) = current {
        if date > frame_end {
            break;
        }
        let x = scale.x_for(date);
        if x >= band_x - EDGE_EPS && x <= band_x + band_width + EDGE_EPS {
            gridlines.push(Gridline { date, x });
        }
        current = next_boundary(date, granularity);
    }
    gridlines
}

/// Indices of the positions that keep a label: the first one, then each
/// position more than `min_gap` past the last kept one.
pub fn declutter(positions: &[f32], min_gap: f32) -> Vec<usize> {
    let mut kept = Vec::new();
    let mut last: Option<f32> = None;
    for (idx, &x) in positions.iter().enumerate() {
        match last {
            Some(prev) if x - prev <= min_gap => {}
            _ => {
                kept.push(idx);
                last = Some(x);
            }
        }
    }
    kept
}

pub(super) fn build_tier(
    scale: &TimeScale,
    granularity: Granularity,
    strip: Bounds,
    draw_gridlines: bool,
    config: &LayoutConfig,
) -> ScaleTier {
    let gridlines = generate_gridlines(scale.start, scale.finish, granularity, scale.x, scale.width);
    let pattern = config.scale_label_formats.for_granularity(granularity);

    // One candidate per period, centred between its bounding gridlines.
    let mut candidates: Vec<(f32, String)> = Vec::with_capacity(gridlines.len() + 1);
    let mut prev_x = scale.x;
    for line in &gridlines {
        candidates.push(((prev_x + line.x) / 2.0, format_scale_label(line.date, pattern)));
        prev_x = line.x;
    }
    let tail_open = gridlines.last().is_none_or(|line| line.date < scale.finish);
    if tail_open {
        candidates.push((
            (prev_x + scale.right()) / 2.0,
            format_scale_label(scale.finish, pattern),
        ));
    }

    let positions: Vec<f32> = candidates.iter().map(|(x, _)| *x).collect();
    let baseline = strip.center_y() + config.scale_label_font_size * 0.35;
    let labels = declutter(&positions, config.label_min_gap)
        .into_iter()
        .map(|idx| {
            let (x, text) = &candidates[idx];
            LabelLayout {
                x: *x,
                y: baseline,
                text: text.clone(),
                anchor: TextAnchor::Middle,
                font_size: config.scale_label_font_size,
                color: None,
                rotation: 0.0,
            }
        })
        .collect();

    ScaleTier {
        granularity,
        strip,
        gridlines,
        labels,
        draw_gridlines,
    }
}

/// Formats with a user-supplied strftime pattern, falling back to the
/// canonical date when the pattern is unusable for a plain date.
fn format_scale_label(date: NaiveDate, pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return format_date(date);
    }
    let mut out = String::new();
    if write!(out, "{}", date.format_with_items(items.iter())).is_err() {
        return format_date(date);
    }
    out
}
