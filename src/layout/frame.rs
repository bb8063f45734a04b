use chrono::NaiveDate;
use tracing::warn;

use crate::config::LayoutConfig;
use crate::ir::{FrameConfig, Granularity, TimeFrame};

use super::dates::{format_date, parse_date};
use super::error::{EntityError, EntityKind, LayoutError};
use super::gridlines::build_tier;
use super::scale::TimeScale;
use super::types::{Bounds, TimeFrameLayout};

const PROPORTION_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ChartRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct FrameGeometry {
    pub outer: Bounds,
    pub header: Bounds,
    pub footer: Bounds,
    /// Area below the header and above the footer: scale strips plus rows.
    pub inner: Bounds,
}

/// A time frame that passed validation, with its derived start date.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlannedFrame {
    pub time_frame_id: i64,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub width_proportion: f32,
    pub upper: Granularity,
    pub lower: Granularity,
}

fn check(
    ok: bool,
    field: &'static str,
    expected: &'static str,
    value: f32,
) -> Result<(), LayoutError> {
    if ok {
        Ok(())
    } else {
        Err(LayoutError::InvalidDimension {
            field,
            expected,
            value,
        })
    }
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Rejects a frame config that cannot produce a coordinate system.
pub(super) fn validate_frame_config(config: &FrameConfig) -> Result<ChartRange, LayoutError> {
    check(
        positive(config.outer_width),
        "outer_width",
        "positive",
        config.outer_width,
    )?;
    check(
        positive(config.outer_height),
        "outer_height",
        "positive",
        config.outer_height,
    )?;
    for (field, value) in [
        ("header_height", config.header_height),
        ("footer_height", config.footer_height),
    ] {
        check(
            non_negative(value) && value < config.outer_height,
            field,
            "non-negative and below outer_height",
            value,
        )?;
    }
    let margins = &config.margins;
    for (field, value) in [
        ("margins.top", margins.top),
        ("margins.right", margins.right),
        ("margins.bottom", margins.bottom),
        ("margins.left", margins.left),
        ("upper_scale_height", config.upper_scale_height),
        ("lower_scale_height", config.lower_scale_height),
    ] {
        check(non_negative(value), field, "non-negative", value)?;
    }
    if margins.left + margins.right >= config.outer_width {
        return Err(LayoutError::InvalidMargins(format!(
            "left {} + right {} reach outer width {}",
            margins.left, margins.right, config.outer_width
        )));
    }
    if config.num_rows == 0 {
        return Err(LayoutError::NoRows);
    }
    let inner_height = config.inner_height();
    if inner_height <= 0.0 {
        return Err(LayoutError::InnerHeightNotPositive(inner_height));
    }

    let start = parse_date(&config.chart_start_date).map_err(|_| LayoutError::InvalidChartDate {
        field: "chart_start_date",
        value: config.chart_start_date.clone(),
    })?;
    let end = match config.chart_end_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            Some(parse_date(raw).map_err(|_| LayoutError::InvalidChartDate {
                field: "chart_end_date",
                value: raw.to_string(),
            })?)
        }
        _ => None,
    };
    if let Some(end) = end.filter(|end| *end < start) {
        return Err(LayoutError::ChartRangeInverted {
            start: format_date(start),
            end: format_date(end),
        });
    }
    Ok(ChartRange { start, end })
}

pub(super) fn frame_geometry(config: &FrameConfig) -> FrameGeometry {
    let m = &config.margins;
    let inner_width = config.inner_width();
    let outer = Bounds::new(0.0, 0.0, config.outer_width, config.outer_height);
    let header = Bounds::new(m.left, m.top, inner_width, config.header_height);
    let footer = Bounds::new(
        m.left,
        config.outer_height - m.bottom - config.footer_height,
        inner_width,
        config.footer_height,
    );
    let inner = Bounds::new(
        m.left,
        header.bottom(),
        inner_width,
        footer.y - header.bottom(),
    );
    FrameGeometry {
        outer,
        header,
        footer,
        inner,
    }
}

/// Resolves start dates and checks each frame, collecting errors for the
/// frames that cannot be laid out.
pub(super) fn plan_time_frames(
    frames: &[TimeFrame],
    range: &ChartRange,
    errors: &mut Vec<EntityError>,
) -> Vec<PlannedFrame> {
    if frames.is_empty() {
        return match range.end {
            Some(end) => vec![PlannedFrame {
                time_frame_id: 0,
                start: range.start,
                finish: end,
                width_proportion: 1.0,
                upper: Granularity::Months,
                lower: Granularity::Weeks,
            }],
            None => {
                warn!("no time frames and no chart end date; nothing to lay out on the timeline");
                Vec::new()
            }
        };
    }

    let mut planned = Vec::with_capacity(frames.len());
    let mut next_start = Some(range.start);
    let mut total = 0.0_f32;
    let mut overflowed = false;
    for frame in frames {
        let id = frame.time_frame_id;
        let mut reject = |reason: String| {
            warn!(time_frame_id = id, %reason, "skipping time frame");
            errors.push(EntityError::new(EntityKind::TimeFrame, id, reason));
        };

        let Some(start) = next_start else {
            reject("starts past the last representable date".to_string());
            continue;
        };
        let finish = match parse_date(&frame.finish_date) {
            Ok(date) => date,
            Err(err) => {
                reject(format!("finish_date: {err}"));
                continue;
            }
        };
        if finish < start {
            reject(format!(
                "finish_date {} is before its start {}",
                format_date(finish),
                format_date(start)
            ));
            continue;
        }
        // Later frames start after this one even if it is not drawn.
        next_start = finish.succ_opt();

        let proportion = frame.width_proportion;
        if !(proportion.is_finite() && proportion > 0.0 && proportion <= 1.0) {
            reject(format!("width_proportion {proportion} is outside (0, 1]"));
            continue;
        }
        if frame.lower_scale > frame.upper_scale {
            reject(format!(
                "lower scale {} is coarser than upper scale {}",
                frame.lower_scale.as_str(),
                frame.upper_scale.as_str()
            ));
            continue;
        }
        if overflowed || total + proportion > 1.0 + PROPORTION_EPS {
            overflowed = true;
            reject(format!(
                "width proportions exceed 1.0 (running total {:.3})",
                total + proportion
            ));
            continue;
        }
        total += proportion;
        planned.push(PlannedFrame {
            time_frame_id: id,
            start,
            finish,
            width_proportion: proportion,
            upper: frame.upper_scale,
            lower: frame.lower_scale,
        });
    }
    planned
}

/// Places planned frames left to right across the inner frame and splits
/// each band into scale strips and row bands.
pub(super) fn layout_time_frames(
    planned: &[PlannedFrame],
    inner: Bounds,
    frame_config: &FrameConfig,
    config: &LayoutConfig,
) -> Vec<TimeFrameLayout> {
    let upper_h = frame_config.upper_scale_height;
    let lower_h = frame_config.lower_scale_height;
    let rows_y = inner.y + upper_h + lower_h;
    let rows_h = frame_config.inner_height();
    let num_rows = frame_config.num_rows.max(1);
    let row_h = rows_h / num_rows as f32;

    let mut offset = inner.x;
    let mut layouts = Vec::with_capacity(planned.len());
    for frame in planned {
        let width = inner.width * frame.width_proportion;
        let band = Bounds::new(offset, inner.y, width, inner.height);
        let upper_strip = Bounds::new(offset, inner.y, width, upper_h);
        let lower_strip = Bounds::new(offset, inner.y + upper_h, width, lower_h);
        let row_frame = Bounds::new(offset, rows_y, width, rows_h);
        let rows = (0..num_rows)
            .map(|idx| Bounds::new(offset, rows_y + idx as f32 * row_h, width, row_h))
            .collect();

        let scale = TimeScale::new(frame.start, frame.finish, offset, width);
        let gridlines = &frame_config.vertical_gridlines;
        let upper = build_tier(
            &scale,
            frame.upper,
            upper_strip,
            gridlines.enabled_for(frame.upper),
            config,
        );
        let lower = build_tier(
            &scale,
            frame.lower,
            lower_strip,
            gridlines.enabled_for(frame.lower),
            config,
        );

        layouts.push(TimeFrameLayout {
            time_frame_id: frame.time_frame_id,
            start: frame.start,
            finish: frame.finish,
            band,
            row_frame,
            rows,
            upper,
            lower,
        });
        offset += width;
    }
    layouts
}
