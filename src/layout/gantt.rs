use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::ir::{
    Curtain, Document, LabelAlignment, LabelContent, LabelPlacement, Pipe, Swimlane, Task, TextBox,
};

use super::dates::{format_date, parse_date};
use super::error::{EntityError, EntityKind};
use super::scale::TimeScale;
use super::text::wrap_text;
use super::types::{
    Bounds, CurtainLayout, LabelLayout, LinkLayout, PipeLayout, SwimlaneLayout, TaskLayout,
    TextAnchor, TextBoxLayout, TimeFrameLayout,
};

const DEFAULT_MARKER_COLOUR: &str = "red";

/// Row bands shared by every time frame, plus the horizontal extent the
/// frames cover together.
#[derive(Debug, Clone, Copy)]
pub(super) struct RowGrid {
    pub x: f32,
    pub width: f32,
    pub y: f32,
    pub row_height: f32,
    pub count: u32,
}

impl RowGrid {
    fn band(&self, first_row: u32, row_count: u32) -> Bounds {
        Bounds::new(
            self.x,
            self.y + (first_row - 1) as f32 * self.row_height,
            self.width,
            row_count as f32 * self.row_height,
        )
    }
}

fn scale_of(frame: &TimeFrameLayout) -> TimeScale {
    TimeScale::new(frame.start, frame.finish, frame.band.x, frame.band.width)
}

fn baseline(center_y: f32, font_size: f32) -> f32 {
    center_y + font_size * 0.35
}

fn reject(errors: &mut Vec<EntityError>, entity: EntityKind, id: i64, reason: String) {
    warn!(%entity, id, %reason, "skipping entity");
    errors.push(EntityError::new(entity, id, reason));
}

struct TaskDates {
    start: NaiveDate,
    finish: NaiveDate,
}

fn task_dates(task: &Task) -> Result<TaskDates, String> {
    let start = parse_date(&task.start_date).map_err(|err| format!("start_date: {err}"))?;
    let finish = if task.finish_date.trim().is_empty() {
        start
    } else {
        parse_date(&task.finish_date).map_err(|err| format!("finish_date: {err}"))?
    };
    if finish < start {
        return Err(format!(
            "finish_date {} is before start_date {}",
            format_date(finish),
            format_date(start)
        ));
    }
    Ok(TaskDates { start, finish })
}

fn task_label_text(task: &Task, dates: &TaskDates) -> Option<String> {
    let date_text = if dates.start == dates.finish {
        format_date(dates.start)
    } else {
        format!("{} - {}", format_date(dates.start), format_date(dates.finish))
    };
    let name = task.task_name.trim();
    let text = match task.label_content {
        LabelContent::None => return None,
        LabelContent::NameOnly => name.to_string(),
        LabelContent::DateOnly => date_text,
        LabelContent::NameAndDate if name.is_empty() => date_text,
        LabelContent::NameAndDate => format!("{name} ({date_text})"),
    };
    (!text.is_empty()).then_some(text)
}

fn task_label(
    task: &Task,
    text: String,
    bar: Bounds,
    milestone: bool,
    config: &LayoutConfig,
) -> LabelLayout {
    let font_size = config.task_label_font_size;
    let pad = config.task_label_padding;
    let inside = task.label_placement == LabelPlacement::Inside && !milestone;
    let (x, anchor) = if inside {
        match task.label_alignment {
            LabelAlignment::Left => (bar.x + pad, TextAnchor::Start),
            LabelAlignment::Centre => (bar.center_x(), TextAnchor::Middle),
            LabelAlignment::Right => (bar.right() - pad, TextAnchor::End),
        }
    } else {
        (
            bar.right() + pad + task.label_horizontal_offset,
            TextAnchor::Start,
        )
    };
    LabelLayout {
        x,
        y: baseline(bar.center_y(), font_size),
        text,
        anchor,
        font_size,
        color: Some(task.label_text_colour.clone()),
        rotation: 0.0,
    }
}

/// Places each valid task in every time frame it overlaps, clipping at
/// frame edges.
pub(super) fn layout_tasks(
    tasks: &[Task],
    frames: &[TimeFrameLayout],
    num_rows: u32,
    config: &LayoutConfig,
    errors: &mut Vec<EntityError>,
) -> Vec<TaskLayout> {
    let mut seen = HashSet::new();
    let mut placed = Vec::new();
    for task in tasks {
        let id = task.task_id;
        if id <= 0 {
            reject(errors, EntityKind::Task, id, "task_id must be positive".to_string());
            continue;
        }
        if !seen.insert(id) {
            reject(errors, EntityKind::Task, id, "duplicate task_id".to_string());
            continue;
        }
        let dates = match task_dates(task) {
            Ok(dates) => dates,
            Err(reason) => {
                reject(errors, EntityKind::Task, id, reason);
                continue;
            }
        };

        let max_row = i64::from(num_rows.max(1));
        let row = task.row_number.clamp(1, max_row);
        if row != task.row_number {
            warn!(
                task_id = id,
                row_number = task.row_number,
                clamped = row,
                "task row out of range"
            );
        }
        let row_index = (row - 1) as usize;
        let milestone = task.is_milestone || dates.start == dates.finish;

        let mut any = false;
        for frame in frames {
            let scale = scale_of(frame);
            let Some((start, finish)) = scale.clip(dates.start, dates.finish) else {
                continue;
            };
            let Some(row_band) = frame.rows.get(row_index) else {
                continue;
            };
            any = true;

            let x1 = scale.x_for(start);
            let bar = if milestone {
                let radius = row_band.height * config.milestone_radius_ratio;
                Bounds::new(
                    x1 - radius,
                    row_band.center_y() - radius,
                    radius * 2.0,
                    radius * 2.0,
                )
            } else {
                let height = row_band.height * config.task_bar_height_ratio;
                Bounds::new(
                    x1,
                    row_band.y + (row_band.height - height) / 2.0,
                    scale.x_for(finish) - x1,
                    height,
                )
            };
            let clipped_start = dates.start < frame.start;
            let label = if clipped_start {
                None
            } else {
                task_label_text(task, &dates)
                    .map(|text| task_label(task, text, bar, milestone, config))
            };

            placed.push(TaskLayout {
                task_id: id,
                time_frame_id: frame.time_frame_id,
                row: row as u32,
                bar,
                milestone,
                clipped_start,
                clipped_end: dates.finish > frame.finish,
                fill: task.fill_colour.clone(),
                label,
            });
        }
        if !any {
            debug!(task_id = id, "task lies outside every time frame");
        }
    }
    placed
}

fn marker_colour(colour: &str) -> String {
    if colour.trim().is_empty() {
        DEFAULT_MARKER_COLOUR.to_string()
    } else {
        colour.to_string()
    }
}

/// Name label running up along a vertical marker line.
fn marker_label(name: &str, x: f32, top: f32, config: &LayoutConfig) -> Option<LabelLayout> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(LabelLayout {
        x: x - 2.0,
        y: top + config.task_label_padding,
        text: name.to_string(),
        anchor: TextAnchor::End,
        font_size: config.marker_label_font_size,
        color: None,
        rotation: -90.0,
    })
}

pub(super) fn layout_pipes(
    pipes: &[Pipe],
    frames: &[TimeFrameLayout],
    config: &LayoutConfig,
    errors: &mut Vec<EntityError>,
) -> Vec<PipeLayout> {
    let mut placed = Vec::new();
    for pipe in pipes {
        let date = match parse_date(&pipe.date) {
            Ok(date) => date,
            Err(err) => {
                reject(errors, EntityKind::Pipe, pipe.pipe_id, format!("date: {err}"));
                continue;
            }
        };
        let Some(frame) = frames.iter().find(|frame| scale_of(frame).contains(date)) else {
            debug!(pipe_id = pipe.pipe_id, "pipe lies outside every time frame");
            continue;
        };
        let x = scale_of(frame).x_for(date);
        let rows = frame.row_frame;
        placed.push(PipeLayout {
            pipe_id: pipe.pipe_id,
            time_frame_id: frame.time_frame_id,
            x,
            y1: rows.y,
            y2: rows.bottom(),
            color: marker_colour(&pipe.colour),
            label: marker_label(&pipe.name, x, rows.y, config),
        });
    }
    placed
}

pub(super) fn layout_curtains(
    curtains: &[Curtain],
    frames: &[TimeFrameLayout],
    config: &LayoutConfig,
    errors: &mut Vec<EntityError>,
) -> Vec<CurtainLayout> {
    let mut placed = Vec::new();
    for curtain in curtains {
        let id = curtain.curtain_id;
        let parsed = parse_date(&curtain.start_date)
            .map_err(|err| format!("start_date: {err}"))
            .and_then(|start| {
                parse_date(&curtain.end_date)
                    .map(|end| (start, end))
                    .map_err(|err| format!("end_date: {err}"))
            });
        let (start, end) = match parsed {
            Ok((start, end)) if end < start => {
                reject(
                    errors,
                    EntityKind::Curtain,
                    id,
                    format!(
                        "end_date {} is before start_date {}",
                        format_date(end),
                        format_date(start)
                    ),
                );
                continue;
            }
            Ok(range) => range,
            Err(reason) => {
                reject(errors, EntityKind::Curtain, id, reason);
                continue;
            }
        };

        for frame in frames {
            let scale = scale_of(frame);
            let Some((from, to)) = scale.clip(start, end) else {
                continue;
            };
            let x1 = scale.x_for(from);
            let x2 = scale.x_for(to);
            let rows = frame.row_frame;
            let starts_here = start >= frame.start;
            placed.push(CurtainLayout {
                curtain_id: id,
                time_frame_id: frame.time_frame_id,
                area: Bounds::new(x1, rows.y, x2 - x1, rows.height),
                left_edge: starts_here.then_some(x1),
                right_edge: (end <= frame.finish).then_some(x2),
                color: marker_colour(&curtain.colour),
                label: if starts_here {
                    marker_label(&curtain.name, x1, rows.y, config)
                } else {
                    None
                },
            });
        }
    }
    placed
}

/// Lays lanes out cumulatively: each lane takes the next `row_count` rows,
/// or starts at its pinned row. A pin on rows already taken rejects the lane.
pub(super) fn layout_swimlanes(
    swimlanes: &[Swimlane],
    grid: &RowGrid,
    config: &LayoutConfig,
    errors: &mut Vec<EntityError>,
) -> Vec<SwimlaneLayout> {
    let mut placed = Vec::new();
    let mut next_row: u32 = 1;
    for lane in swimlanes {
        let id = lane.swimlane_id;
        if lane.row_count == 0 {
            reject(errors, EntityKind::Swimlane, id, "row_count must be at least 1".to_string());
            continue;
        }
        let first_row = match lane.first_row {
            None => next_row,
            Some(0) => {
                reject(errors, EntityKind::Swimlane, id, "first_row must be at least 1".to_string());
                continue;
            }
            Some(first) if first < next_row => {
                reject(
                    errors,
                    EntityKind::Swimlane,
                    id,
                    format!(
                        "row {first} overlaps a previous lane (next free row is {next_row})"
                    ),
                );
                continue;
            }
            Some(first) => first,
        };
        let last_row = first_row.saturating_add(lane.row_count - 1);
        next_row = last_row.saturating_add(1);
        if last_row > grid.count {
            reject(
                errors,
                EntityKind::Swimlane,
                id,
                format!(
                    "rows {first_row}-{last_row} extend past num_rows {}",
                    grid.count
                ),
            );
            continue;
        }

        let band = grid.band(first_row, lane.row_count);
        placed.push(SwimlaneLayout {
            swimlane_id: id,
            first_row,
            last_row,
            band,
            tint: lane
                .background_colour
                .as_ref()
                .filter(|colour| !colour.trim().is_empty())
                .cloned(),
            label: swimlane_label(lane, band, config),
        });
    }
    placed
}

fn swimlane_label(lane: &Swimlane, band: Bounds, config: &LayoutConfig) -> Option<LabelLayout> {
    let name = lane.name.trim();
    if name.is_empty() {
        return None;
    }
    let font_size = config.swimlane_label_font_size;
    let pad = config.swimlane_label_padding;
    let position = lane.label_position;
    let (x, anchor) = if position.is_left() {
        (band.x + pad, TextAnchor::Start)
    } else {
        (band.right() - pad, TextAnchor::End)
    };
    let y = if position.is_top() {
        band.y + pad + font_size
    } else {
        band.bottom() - pad
    };
    Some(LabelLayout {
        x,
        y,
        text: name.to_string(),
        anchor,
        font_size,
        color: None,
        rotation: 0.0,
    })
}

/// Positions boxes relative to the inner-frame origin and wraps their text
/// to fit, dropping lines that overflow the box.
pub(super) fn layout_text_boxes(
    boxes: &[TextBox],
    origin: (f32, f32),
    config: &LayoutConfig,
    errors: &mut Vec<EntityError>,
) -> Vec<TextBoxLayout> {
    let font_size = config.text_box_font_size;
    let pad = config.text_box_padding;
    let line_height = font_size * config.label_line_height;
    let mut placed = Vec::new();
    for text_box in boxes {
        let id = text_box.textbox_id;
        if !(text_box.width.is_finite() && text_box.width > 0.0)
            || !(text_box.height.is_finite() && text_box.height > 0.0)
        {
            reject(
                errors,
                EntityKind::TextBox,
                id,
                format!(
                    "size {}x{} must be positive",
                    text_box.width, text_box.height
                ),
            );
            continue;
        }
        let bounds = Bounds::new(
            origin.0 + text_box.x,
            origin.1 + text_box.y,
            text_box.width,
            text_box.height,
        );
        let max_lines = ((bounds.height - pad * 2.0 - font_size) / line_height + 1.0)
            .floor()
            .max(0.0) as usize;
        let lines = wrap_text(&text_box.text, bounds.width - pad * 2.0, font_size)
            .into_iter()
            .take(max_lines)
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(idx, line)| LabelLayout {
                x: bounds.x + pad,
                y: bounds.y + pad + font_size + idx as f32 * line_height,
                text: line,
                anchor: TextAnchor::Start,
                font_size,
                color: None,
                rotation: 0.0,
            })
            .collect();
        placed.push(TextBoxLayout {
            textbox_id: id,
            bounds,
            lines,
        });
    }
    placed
}

pub(super) fn layout_links(document: &Document, errors: &mut Vec<EntityError>) -> Vec<LinkLayout> {
    document
        .links
        .iter()
        .map(|link| {
            for task_id in [link.from_task_id, link.to_task_id] {
                if document.task(task_id).is_none() {
                    reject(
                        errors,
                        EntityKind::Link,
                        link.link_id,
                        format!("unknown task {task_id}"),
                    );
                }
            }
            LinkLayout {
                link_id: link.link_id,
                from_task_id: link.from_task_id,
                to_task_id: link.to_task_id,
                valid: document.link_is_valid(link),
            }
        })
        .collect()
}
