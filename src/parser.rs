use crate::ir::{
    Curtain, Document, FrameConfig, Granularity, LabelAlignment, LabelContent, LabelPlacement,
    Link, Margins, Pipe, Swimlane, SwimlaneLabelPosition, Task, TextBox, TimeFrame,
    VerticalGridlines,
};
use crate::layout::dates::parse_date;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const DEFAULT_MARKER_COLOUR: &str = "red";
const DEFAULT_TEXT_BOX_WIDTH: f32 = 100.0;
const DEFAULT_TEXT_BOX_HEIGHT: f32 = 50.0;

/// A loaded document plus notes about anything that had to be migrated or
/// guessed while reading it.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub document: Document,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectFile {
    frame_config: FrameConfigFile,
    // Entity lists stay raw until `records` decodes them one entry at a time.
    time_frames: Vec<Value>,
    tasks: Vec<Value>,
    #[serde(alias = "connectors")]
    links: Vec<Value>,
    swimlanes: Vec<Value>,
    pipes: Vec<Value>,
    curtains: Vec<Value>,
    text_boxes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarginsEntry {
    List(Vec<f32>),
    Record {
        top: Option<f32>,
        right: Option<f32>,
        bottom: Option<f32>,
        left: Option<f32>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GridlineToggle {
    Flag(bool),
    PerScale {
        years: Option<bool>,
        months: Option<bool>,
        weeks: Option<bool>,
        days: Option<bool>,
    },
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FrameConfigFile {
    outer_width: Option<NumberOrString>,
    outer_height: Option<NumberOrString>,
    header_height: Option<NumberOrString>,
    footer_height: Option<NumberOrString>,
    margins: Option<MarginsEntry>,
    num_rows: Option<i64>,
    upper_scale_height: Option<NumberOrString>,
    lower_scale_height: Option<NumberOrString>,
    header_text: Option<String>,
    footer_text: Option<String>,
    horizontal_gridlines: Option<bool>,
    vertical_gridlines: Option<GridlineToggle>,
    vertical_gridline_years: Option<bool>,
    vertical_gridline_months: Option<bool>,
    vertical_gridline_weeks: Option<bool>,
    vertical_gridline_days: Option<bool>,
    chart_start_date: Option<String>,
    chart_end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeFrameFile {
    #[serde(default, alias = "id")]
    time_frame_id: Option<i64>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    finish_date: Option<String>,
    width_proportion: f32,
    #[serde(default, alias = "upper_scale_intervals")]
    upper_scale: Option<String>,
    #[serde(default, alias = "lower_scale_intervals")]
    lower_scale: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelHide {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(alias = "id")]
    task_id: i64,
    #[serde(default, alias = "name")]
    task_name: String,
    #[serde(default)]
    start_date: String,
    #[serde(default, alias = "end_date")]
    finish_date: String,
    #[serde(default = "default_row", alias = "row")]
    row_number: i64,
    #[serde(default)]
    is_milestone: bool,
    #[serde(default)]
    label_placement: Option<String>,
    #[serde(default)]
    label_content: Option<String>,
    #[serde(default)]
    label_hide: Option<LabelHide>,
    #[serde(default)]
    label_alignment: Option<String>,
    #[serde(default)]
    label_horizontal_offset: Option<f32>,
    #[serde(default, alias = "label_text_color")]
    label_text_colour: Option<String>,
    #[serde(default, alias = "fill_color", alias = "colour", alias = "color")]
    fill_colour: Option<String>,
}

fn default_row() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    Row(Vec<Value>),
    Record {
        #[serde(default, alias = "id")]
        link_id: Option<i64>,
        #[serde(alias = "from_task", alias = "from")]
        from_task_id: i64,
        #[serde(alias = "to_task", alias = "to")]
        to_task_id: i64,
    },
}

#[derive(Debug, Deserialize)]
struct SwimlaneFile {
    #[serde(default, alias = "id")]
    swimlane_id: Option<i64>,
    #[serde(default, alias = "title")]
    name: String,
    #[serde(default)]
    row_count: Option<u32>,
    #[serde(default, alias = "from_row_number")]
    first_row: Option<i64>,
    #[serde(default, alias = "to_row_number")]
    last_row: Option<i64>,
    #[serde(default)]
    label_position: Option<String>,
    #[serde(default, alias = "background_color")]
    background_colour: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PipeFile {
    #[serde(default, alias = "id")]
    pipe_id: Option<i64>,
    #[serde(alias = "pipe_date")]
    date: String,
    #[serde(default, alias = "color")]
    colour: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurtainFile {
    #[serde(default, alias = "id")]
    curtain_id: Option<i64>,
    #[serde(alias = "from_date")]
    start_date: String,
    #[serde(alias = "to_date")]
    end_date: String,
    #[serde(default, alias = "color")]
    colour: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextBoxEntry {
    Row(Vec<Value>),
    Record {
        #[serde(default, alias = "text_box_id", alias = "id")]
        textbox_id: Option<i64>,
        #[serde(default, alias = "x_coordinate")]
        x: f32,
        #[serde(default, alias = "y_coordinate")]
        y: f32,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        text: String,
    },
}

/// Reads a project document. Strict JSON first; hand-edited files with
/// comments or trailing commas fall back to JSON5.
pub fn parse_project(input: &str) -> Result<ParseOutput> {
    let file: ProjectFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(strict_err) => json5::from_str(input)
            .map_err(|_| anyhow!("Invalid project document: {strict_err}"))?,
    };

    let mut warnings = Vec::new();
    let mut frame_config = convert_frame_config(file.frame_config, &mut warnings)?;
    let time_frames = records(file.time_frames, "time_frames", &mut warnings);
    let time_frames = convert_time_frames(time_frames, &mut frame_config, &mut warnings);
    let num_rows = frame_config.num_rows;

    let tasks: Vec<TaskFile> = records(file.tasks, "tasks", &mut warnings);
    let links = records(file.links, "links", &mut warnings);
    let swimlanes = records(file.swimlanes, "swimlanes", &mut warnings);
    let pipes: Vec<PipeFile> = records(file.pipes, "pipes", &mut warnings);
    let curtains: Vec<CurtainFile> = records(file.curtains, "curtains", &mut warnings);
    let text_boxes = records(file.text_boxes, "text_boxes", &mut warnings);

    let document = Document {
        frame_config,
        time_frames,
        tasks: tasks
            .into_iter()
            .map(|task| convert_task(task, &mut warnings))
            .collect(),
        links: convert_links(links, &mut warnings),
        swimlanes: convert_swimlanes(swimlanes, num_rows, &mut warnings),
        pipes: pipes
            .into_iter()
            .enumerate()
            .map(|(idx, pipe)| Pipe {
                pipe_id: pipe.pipe_id.unwrap_or(idx as i64 + 1),
                date: pipe.date,
                colour: marker_colour(pipe.colour),
                name: pipe.name,
            })
            .collect(),
        curtains: curtains
            .into_iter()
            .enumerate()
            .map(|(idx, curtain)| Curtain {
                curtain_id: curtain.curtain_id.unwrap_or(idx as i64 + 1),
                start_date: curtain.start_date,
                end_date: curtain.end_date,
                colour: marker_colour(curtain.colour),
                name: curtain.name,
            })
            .collect(),
        text_boxes: convert_text_boxes(text_boxes, &mut warnings),
    };

    Ok(ParseOutput { document, warnings })
}

fn marker_colour(colour: Option<String>) -> String {
    colour
        .filter(|colour| !colour.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MARKER_COLOUR.to_string())
}

fn number(
    value: Option<NumberOrString>,
    field: &str,
    fallback: f32,
    warnings: &mut Vec<String>,
) -> f32 {
    match value {
        None => fallback,
        Some(raw) => raw.as_f32().unwrap_or_else(|| {
            warnings.push(format!("frame_config.{field}: not a number, using {fallback}"));
            fallback
        }),
    }
}

fn convert_frame_config(file: FrameConfigFile, warnings: &mut Vec<String>) -> Result<FrameConfig> {
    let defaults = FrameConfig::default();

    let margins = match file.margins {
        None => defaults.margins,
        Some(MarginsEntry::List(values)) => match values.as_slice() {
            [top, right, bottom, left] => Margins {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            },
            [all] => Margins::uniform(*all),
            other => {
                return Err(anyhow!(
                    "frame_config.margins: expected 4 values (top, right, bottom, left), got {}",
                    other.len()
                ));
            }
        },
        Some(MarginsEntry::Record {
            top,
            right,
            bottom,
            left,
        }) => {
            let base = defaults.margins;
            Margins {
                top: top.unwrap_or(base.top),
                right: right.unwrap_or(base.right),
                bottom: bottom.unwrap_or(base.bottom),
                left: left.unwrap_or(base.left),
            }
        }
    };

    let num_rows = match file.num_rows {
        None => defaults.num_rows,
        Some(rows) => u32::try_from(rows)
            .map_err(|_| anyhow!("frame_config.num_rows: {rows} is not a valid row count"))?,
    };

    let mut vertical = match file.vertical_gridlines {
        None => VerticalGridlines::default(),
        Some(GridlineToggle::Flag(enabled)) => VerticalGridlines::all(enabled),
        Some(GridlineToggle::PerScale {
            years,
            months,
            weeks,
            days,
        }) => VerticalGridlines {
            years: years.unwrap_or(true),
            months: months.unwrap_or(true),
            weeks: weeks.unwrap_or(true),
            days: days.unwrap_or(true),
        },
    };
    for (flag, slot) in [
        (file.vertical_gridline_years, &mut vertical.years),
        (file.vertical_gridline_months, &mut vertical.months),
        (file.vertical_gridline_weeks, &mut vertical.weeks),
        (file.vertical_gridline_days, &mut vertical.days),
    ] {
        if let Some(flag) = flag {
            *slot = flag;
        }
    }

    Ok(FrameConfig {
        outer_width: number(file.outer_width, "outer_width", defaults.outer_width, warnings),
        outer_height: number(file.outer_height, "outer_height", defaults.outer_height, warnings),
        header_height: number(file.header_height, "header_height", defaults.header_height, warnings),
        footer_height: number(file.footer_height, "footer_height", defaults.footer_height, warnings),
        margins,
        num_rows,
        upper_scale_height: number(
            file.upper_scale_height,
            "upper_scale_height",
            defaults.upper_scale_height,
            warnings,
        ),
        lower_scale_height: number(
            file.lower_scale_height,
            "lower_scale_height",
            defaults.lower_scale_height,
            warnings,
        ),
        header_text: file.header_text.unwrap_or_default(),
        footer_text: file.footer_text.unwrap_or_default(),
        horizontal_gridlines: file.horizontal_gridlines.unwrap_or(defaults.horizontal_gridlines),
        vertical_gridlines: vertical,
        chart_start_date: file
            .chart_start_date
            .filter(|date| !date.trim().is_empty())
            .unwrap_or_default(),
        chart_end_date: file.chart_end_date.filter(|date| !date.trim().is_empty()),
    })
}

fn granularity(
    token: Option<&str>,
    fallback: Granularity,
    frame_id: i64,
    warnings: &mut Vec<String>,
) -> Granularity {
    let Some(token) = token.filter(|token| !token.trim().is_empty()) else {
        return fallback;
    };
    Granularity::from_token(token).unwrap_or_else(|| {
        warnings.push(format!(
            "time frame {frame_id}: unknown scale {token:?}, using {}",
            fallback.as_str()
        ));
        fallback
    })
}

/// Frames are stored by finish date. An explicit start on the first frame
/// seeds the chart start when the frame config has none; any other explicit
/// start must match the derived one.
fn convert_time_frames(
    frames: Vec<TimeFrameFile>,
    frame_config: &mut FrameConfig,
    warnings: &mut Vec<String>,
) -> Vec<TimeFrame> {
    if frame_config.chart_start_date.is_empty() {
        frame_config.chart_start_date = frames
            .first()
            .and_then(|frame| frame.start_date.clone())
            .filter(|date| !date.trim().is_empty())
            .unwrap_or_else(|| FrameConfig::default().chart_start_date);
    }

    let mut expected_start = parse_date(&frame_config.chart_start_date).ok();
    let mut converted = Vec::with_capacity(frames.len());
    for (idx, frame) in frames.into_iter().enumerate() {
        let id = frame.time_frame_id.unwrap_or(idx as i64 + 1);
        let finish = frame.finish_date.unwrap_or_default();
        if let Some(start) = frame.start_date.as_deref().filter(|s| !s.trim().is_empty()) {
            if parse_date(start).ok() != expected_start {
                warnings.push(format!(
                    "time frame {id}: start_date {start} ignored; frames start the day after the previous finish"
                ));
            }
        }
        expected_start = parse_date(&finish).ok().and_then(|date| date.succ_opt());

        converted.push(TimeFrame {
            time_frame_id: id,
            upper_scale: granularity(
                frame.upper_scale.as_deref(),
                Granularity::Months,
                id,
                warnings,
            ),
            lower_scale: granularity(
                frame.lower_scale.as_deref(),
                Granularity::Weeks,
                id,
                warnings,
            ),
            finish_date: finish,
            width_proportion: frame.width_proportion,
        });
    }
    converted
}

fn placement(token: &str) -> Option<LabelPlacement> {
    match token.trim().to_ascii_lowercase().as_str() {
        "inside" => Some(LabelPlacement::Inside),
        "outside" | "to left" | "to right" => Some(LabelPlacement::Outside),
        _ => None,
    }
}

fn content(token: &str) -> Option<LabelContent> {
    match token.trim().to_ascii_lowercase().as_str() {
        "none" => Some(LabelContent::None),
        "name only" | "name" => Some(LabelContent::NameOnly),
        "date only" | "date" => Some(LabelContent::DateOnly),
        "name and date" => Some(LabelContent::NameAndDate),
        _ => None,
    }
}

fn alignment(token: &str) -> Option<LabelAlignment> {
    match token.trim().to_ascii_lowercase().as_str() {
        "left" => Some(LabelAlignment::Left),
        "centre" | "center" => Some(LabelAlignment::Centre),
        "right" => Some(LabelAlignment::Right),
        _ => None,
    }
}

fn enum_field<T: Default>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    what: &str,
    task_id: i64,
    warnings: &mut Vec<String>,
) -> T {
    match value {
        None => T::default(),
        Some(raw) => parse(raw).unwrap_or_else(|| {
            warnings.push(format!("task {task_id}: unknown {what} {raw:?}, using default"));
            T::default()
        }),
    }
}

fn convert_task(file: TaskFile, warnings: &mut Vec<String>) -> Task {
    let id = file.task_id;
    let label_content = match (file.label_content.as_deref(), file.label_hide) {
        (Some(raw), _) => enum_field(Some(raw), content, "label_content", id, warnings),
        (None, Some(LabelHide::Text(text))) if text.trim().eq_ignore_ascii_case("no") => {
            LabelContent::None
        }
        (None, Some(LabelHide::Flag(false))) => LabelContent::None,
        _ => LabelContent::NameOnly,
    };

    let mut task = Task::new(id, &file.task_name, &file.start_date, &file.finish_date, file.row_number);
    task.is_milestone = file.is_milestone;
    task.label_placement = enum_field(
        file.label_placement.as_deref(),
        placement,
        "label_placement",
        id,
        warnings,
    );
    task.label_content = label_content;
    task.label_alignment = enum_field(
        file.label_alignment.as_deref(),
        alignment,
        "label_alignment",
        id,
        warnings,
    );
    task.label_horizontal_offset = file.label_horizontal_offset.unwrap_or(0.0);
    if let Some(colour) = file.label_text_colour.filter(|c| !c.trim().is_empty()) {
        task.label_text_colour = colour;
    }
    if let Some(colour) = file.fill_colour.filter(|c| !c.trim().is_empty()) {
        task.fill_colour = colour;
    }
    task
}

fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(num) => num.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn value_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(num) => num.as_f64().map(|v| v as f32),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Links may be records or table rows `[id, from, to, valid]`,
/// `[from, to, valid]` or `[from, to]`. The stored validity column is
/// dropped; it is recomputed during layout.
fn convert_links(entries: Vec<LinkEntry>, warnings: &mut Vec<String>) -> Vec<Link> {
    let mut pending: Vec<(Option<i64>, i64, i64)> = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            LinkEntry::Record {
                link_id,
                from_task_id,
                to_task_id,
            } => pending.push((link_id, from_task_id, to_task_id)),
            LinkEntry::Row(row) => {
                let ids: Vec<Option<i64>> = row.iter().map(value_i64).collect();
                let parsed = match (row.len(), ids.as_slice()) {
                    (4, [id, Some(from), Some(to), _]) => Some((*id, *from, *to)),
                    (2 | 3, [Some(from), Some(to), ..]) => Some((None, *from, *to)),
                    _ => None,
                };
                match parsed {
                    Some(link) => pending.push(link),
                    None => warnings.push(format!("links[{idx}]: unreadable row {row:?}, skipped")),
                }
            }
        }
    }

    let mut next_id = pending.iter().filter_map(|(id, _, _)| *id).max().unwrap_or(0) + 1;
    pending
        .into_iter()
        .map(|(id, from_task_id, to_task_id)| {
            let link_id = id.unwrap_or_else(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            Link {
                link_id,
                from_task_id,
                to_task_id,
            }
        })
        .collect()
}

/// Decodes each entry on its own so a malformed record drops only itself.
fn records<T: DeserializeOwned>(
    entries: Vec<Value>,
    section: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warnings.push(format!("{section}[{idx}]: {err}, skipped"));
                None
            }
        })
        .collect()
}

/// Converts lanes to the cumulative row-count model. Lanes given as
/// explicit row spans keep their first row as a pin, so gaps survive.
/// Gaps and overlaps are reported here; layout rejects overlapping lanes.
fn convert_swimlanes(lanes: Vec<SwimlaneFile>, num_rows: u32, warnings: &mut Vec<String>) -> Vec<Swimlane> {
    // Last row taken by a lane that layout will keep.
    let mut claimed: i64 = 0;
    let mut converted = Vec::with_capacity(lanes.len());
    for (idx, lane) in lanes.into_iter().enumerate() {
        let id = lane.swimlane_id.unwrap_or(idx as i64 + 1);
        let (row_count, first_row) = match (lane.row_count, lane.first_row, lane.last_row) {
            (Some(count), _, _) => {
                claimed += i64::from(count);
                (i64::from(count), None)
            }
            (None, Some(first), Some(last)) => {
                if first < 1 || last < first {
                    warnings.push(format!("swimlane {id}: invalid row span {first}-{last}, skipped"));
                    continue;
                }
                if first <= claimed {
                    warnings.push(format!(
                        "swimlane {id}: rows {first}-{} overlap an earlier lane",
                        claimed.min(last)
                    ));
                } else {
                    if first > claimed + 1 {
                        warnings.push(format!(
                            "swimlane {id}: rows {}-{} belong to no lane",
                            claimed + 1,
                            first - 1
                        ));
                    }
                    claimed = last;
                }
                (last - first + 1, Some(u32::try_from(first).unwrap_or(u32::MAX)))
            }
            _ => {
                warnings.push(format!("swimlane {id}: no row_count or row span, assuming 1 row"));
                claimed += 1;
                (1, None)
            }
        };
        if row_count <= 0 {
            warnings.push(format!("swimlane {id}: no rows, skipped"));
            continue;
        }

        let label_position = match lane.label_position.as_deref() {
            None => SwimlaneLabelPosition::default(),
            Some(raw) => SwimlaneLabelPosition::from_token(raw).unwrap_or_else(|| {
                warnings.push(format!("swimlane {id}: unknown label_position {raw:?}"));
                SwimlaneLabelPosition::default()
            }),
        };
        converted.push(Swimlane {
            swimlane_id: id,
            row_count: u32::try_from(row_count).unwrap_or(u32::MAX),
            first_row,
            name: lane.name,
            label_position,
            background_colour: lane.background_colour.filter(|c| !c.trim().is_empty()),
        });
    }

    if !converted.is_empty() && claimed < i64::from(num_rows) {
        warnings.push(format!(
            "rows {}-{num_rows} belong to no lane",
            claimed + 1
        ));
    }
    converted
}

/// Text boxes may be records or legacy rows `[text, x, y, colour]`.
fn convert_text_boxes(entries: Vec<TextBoxEntry>, warnings: &mut Vec<String>) -> Vec<TextBox> {
    let mut converted = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let fallback_id = idx as i64 + 1;
        match entry {
            TextBoxEntry::Record {
                textbox_id,
                x,
                y,
                width,
                height,
                text,
            } => converted.push(TextBox {
                textbox_id: textbox_id.unwrap_or(fallback_id),
                x,
                y,
                width: width.unwrap_or(DEFAULT_TEXT_BOX_WIDTH),
                height: height.unwrap_or(DEFAULT_TEXT_BOX_HEIGHT),
                text,
            }),
            TextBoxEntry::Row(row) => {
                let text = row.first().and_then(Value::as_str).map(str::to_string);
                let x = row.get(1).and_then(value_f32);
                let y = row.get(2).and_then(value_f32);
                match (text, x, y) {
                    (Some(text), Some(x), Some(y)) => converted.push(TextBox {
                        textbox_id: fallback_id,
                        x,
                        y,
                        width: DEFAULT_TEXT_BOX_WIDTH,
                        height: DEFAULT_TEXT_BOX_HEIGHT,
                        text,
                    }),
                    _ => warnings.push(format!("text_boxes[{idx}]: unreadable row, skipped")),
                }
            }
        }
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_document() {
        let parsed = parse_project(
            r#"{
                "frame_config": {
                    "outer_width": 1000, "outer_height": 700, "num_rows": 3,
                    "margins": {"top": 5, "right": 5, "bottom": 5, "left": 5},
                    "header_text": "Plan", "chart_start_date": "2025-01-01"
                },
                "time_frames": [
                    {"time_frame_id": 1, "finish_date": "2025-03-31", "width_proportion": 0.6,
                     "upper_scale": "months", "lower_scale": "weeks"}
                ],
                "tasks": [
                    {"task_id": 1, "task_name": "Design", "start_date": "2025-01-06",
                     "finish_date": "2025-01-17", "row_number": 2, "label_placement": "Inside",
                     "label_alignment": "Left", "fill_colour": "green"}
                ],
                "links": [{"link_id": 1, "from_task_id": 1, "to_task_id": 1}],
                "pipes": [{"pipe_id": 1, "date": "2025-02-01"}]
            }"#,
        )
        .unwrap();
        let doc = parsed.document;
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert_eq!(doc.frame_config.outer_width, 1000.0);
        assert_eq!(doc.frame_config.margins, Margins::uniform(5.0));
        assert_eq!(doc.frame_config.num_rows, 3);
        assert_eq!(doc.time_frames[0].finish_date, "2025-03-31");
        let task = &doc.tasks[0];
        assert_eq!(task.row_number, 2);
        assert_eq!(task.label_placement, LabelPlacement::Inside);
        assert_eq!(task.label_alignment, LabelAlignment::Left);
        assert_eq!(task.fill_colour, "green");
        assert_eq!(task.label_text_colour, "black");
        assert_eq!(doc.pipes[0].colour, "red");
    }

    #[test]
    fn legacy_frame_config_shapes() {
        let parsed = parse_project(
            r#"{"frame_config": {"margins": [1, 2, 3, 4], "vertical_gridlines": false,
                "outer_width": "640px"}}"#,
        )
        .unwrap();
        let config = parsed.document.frame_config;
        assert_eq!(
            config.margins,
            Margins {
                top: 1.0,
                right: 2.0,
                bottom: 3.0,
                left: 4.0
            }
        );
        assert_eq!(config.vertical_gridlines, VerticalGridlines::all(false));
        assert_eq!(config.outer_width, 640.0);
        assert_eq!(config.chart_start_date, "2025-01-01");
    }

    #[test]
    fn per_scale_gridline_flags() {
        let parsed = parse_project(
            r#"{"frame_config": {"vertical_gridlines": {"days": false},
                "vertical_gridline_years": false}}"#,
        )
        .unwrap();
        let flags = parsed.document.frame_config.vertical_gridlines;
        assert!(!flags.days && !flags.years);
        assert!(flags.months && flags.weeks);
    }

    #[test]
    fn connector_rows_are_migrated() {
        let parsed = parse_project(
            r#"{"connectors": [["7", "1", "2", "Valid"], [3, 4, false], [5, 6],
                {"from_task_id": 8, "to_task_id": 9}, ["x"]]}"#,
        )
        .unwrap();
        let links = parsed.document.links;
        let triples: Vec<(i64, i64, i64)> = links
            .iter()
            .map(|l| (l.link_id, l.from_task_id, l.to_task_id))
            .collect();
        assert_eq!(triples, vec![(7, 1, 2), (8, 3, 4), (9, 5, 6), (10, 8, 9)]);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn explicit_swimlane_spans_keep_their_first_row() {
        let parsed = parse_project(
            r#"{"frame_config": {"num_rows": 8},
                "swimlanes": [
                    {"name": "A", "from_row_number": 1, "to_row_number": 3},
                    {"name": "B", "first_row": 5, "last_row": 6, "label_position": "Top Left"},
                    {"name": "C", "first_row": 6, "last_row": 7}
                ]}"#,
        )
        .unwrap();
        let lanes = &parsed.document.swimlanes;
        let spans: Vec<(Option<u32>, u32)> = lanes.iter().map(|l| (l.first_row, l.row_count)).collect();
        assert_eq!(spans, vec![(Some(1), 3), (Some(5), 2), (Some(6), 2)]);
        assert_eq!(lanes[1].label_position, SwimlaneLabelPosition::TopLeft);
        assert_eq!(
            parsed.warnings,
            vec![
                "swimlane 2: rows 4-4 belong to no lane".to_string(),
                "swimlane 3: rows 6-6 overlap an earlier lane".to_string(),
                "rows 7-8 belong to no lane".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_record_skips_only_itself() {
        let parsed = parse_project(
            r#"{"tasks": [
                    {"task_name": "No id", "start_date": "2025-01-01", "finish_date": "2025-01-02"},
                    {"task_id": 2, "task_name": "Kept", "start_date": "2025-01-03", "finish_date": "2025-01-04"}
                ],
                "time_frames": [{"finish_date": "2025-01-31", "width_proportion": 1.0}, {"finish_date": "2025-02-28"}],
                "pipes": [{"name": "dateless"}, {"date": "2025-01-10"}],
                "curtains": [{"start_date": "2025-01-05"}]}"#,
        )
        .unwrap();
        let document = &parsed.document;
        assert_eq!(document.tasks.len(), 1);
        assert_eq!(document.tasks[0].task_id, 2);
        assert_eq!(document.time_frames.len(), 1);
        assert_eq!(document.pipes.len(), 1);
        assert_eq!(document.pipes[0].date, "2025-01-10");
        assert!(document.curtains.is_empty());

        assert_eq!(parsed.warnings.len(), 4, "{:?}", parsed.warnings);
        assert!(parsed.warnings[0].starts_with("time_frames[1]:"));
        assert!(parsed.warnings[1].starts_with("tasks[0]:"));
        assert!(parsed.warnings[1].contains("task_id"));
        assert!(parsed.warnings.iter().any(|w| w.starts_with("pipes[0]:")));
        assert!(parsed.warnings.iter().any(|w| w.starts_with("curtains[0]:")));
    }

    #[test]
    fn legacy_task_fields() {
        let parsed = parse_project(
            r#"{"tasks": [
                {"task_id": 1, "task_name": "A", "start_date": "2025-01-01",
                 "finish_date": "2025-01-02", "label_hide": "No", "label_placement": "To left"},
                {"task_id": 2, "task_name": "B", "start_date": "2025-01-01",
                 "finish_date": "2025-01-02", "label_hide": "Yes", "color": "purple"},
                {"task_id": 3, "task_name": "C", "start_date": "2025-01-01",
                 "finish_date": "2025-01-02", "label_content": "Name and Date",
                 "label_hide": "No"}
            ]}"#,
        )
        .unwrap();
        let tasks = &parsed.document.tasks;
        assert_eq!(tasks[0].label_content, LabelContent::None);
        assert_eq!(tasks[0].label_placement, LabelPlacement::Outside);
        assert_eq!(tasks[1].label_content, LabelContent::NameOnly);
        assert_eq!(tasks[1].fill_colour, "purple");
        assert_eq!(tasks[2].label_content, LabelContent::NameAndDate);
    }

    #[test]
    fn legacy_time_frames_seed_chart_start() {
        let parsed = parse_project(
            r#"{"time_frames": [
                {"start_date": "2024-11-01", "end_date": "2024-12-31", "width_proportion": 0.5,
                 "upper_scale_intervals": "Years", "lower_scale_intervals": "Months"},
                {"start_date": "2025-01-01", "end_date": "2025-06-30", "width_proportion": 0.5,
                 "lower_scale_intervals": "fortnights"}
            ]}"#,
        )
        .unwrap();
        let doc = &parsed.document;
        assert_eq!(doc.frame_config.chart_start_date, "2024-11-01");
        assert_eq!(doc.time_frames[0].upper_scale, Granularity::Years);
        assert_eq!(doc.time_frames[0].lower_scale, Granularity::Months);
        assert_eq!(doc.time_frames[1].time_frame_id, 2);
        assert_eq!(doc.time_frames[1].lower_scale, Granularity::Weeks);
        assert_eq!(parsed.warnings.len(), 1, "{:?}", parsed.warnings);
    }

    #[test]
    fn mismatched_frame_start_warns() {
        let parsed = parse_project(
            r#"{"frame_config": {"chart_start_date": "2025-01-01"},
                "time_frames": [
                {"finish_date": "2025-01-31", "width_proportion": 0.5},
                {"start_date": "2025-02-10", "finish_date": "2025-02-28", "width_proportion": 0.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("start_date 2025-02-10 ignored"));
    }

    #[test]
    fn text_box_rows_and_records() {
        let parsed = parse_project(
            r#"{"text_boxes": [
                ["Note", 10, "20", "black"],
                {"text_box_id": 5, "x_coordinate": 1, "y_coordinate": 2, "text": "Hi", "width": 80}
            ]}"#,
        )
        .unwrap();
        let boxes = &parsed.document.text_boxes;
        assert_eq!(boxes[0].text, "Note");
        assert_eq!((boxes[0].x, boxes[0].y), (10.0, 20.0));
        assert_eq!((boxes[0].width, boxes[0].height), (100.0, 50.0));
        assert_eq!(boxes[1].textbox_id, 5);
        assert_eq!(boxes[1].width, 80.0);
        assert_eq!(boxes[1].height, 50.0);
    }

    #[test]
    fn curtain_aliases_and_colour_default() {
        let parsed = parse_project(
            r#"{"curtains": [{"from_date": "2025-01-01", "to_date": "2025-01-05", "color": ""}]}"#,
        )
        .unwrap();
        let curtain = &parsed.document.curtains[0];
        assert_eq!(curtain.curtain_id, 1);
        assert_eq!(curtain.end_date, "2025-01-05");
        assert_eq!(curtain.colour, "red");
    }

    #[test]
    fn lenient_json5_fallback() {
        let parsed = parse_project(
            "{ // hand edited\n tasks: [{task_id: 1, task_name: 'A', start_date: '2025-01-01', finish_date: '2025-01-02',},],\n}",
        )
        .unwrap();
        assert_eq!(parsed.document.tasks.len(), 1);
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(parse_project("{ tasks: [").is_err());
        assert!(parse_project(r#"{"frame_config": {"num_rows": -2}}"#).is_err());
        assert!(parse_project(r#"{"frame_config": {"margins": [1, 2]}}"#).is_err());
    }
}
