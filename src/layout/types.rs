use chrono::NaiveDate;
use serde::Serialize;

use crate::ir::Granularity;

use super::error::EntityError;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// A positioned piece of text; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub anchor: TextAnchor,
    pub font_size: f32,
    pub color: Option<String>,
    /// Degrees, clockwise, around `(x, y)`.
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gridline {
    pub date: NaiveDate,
    pub x: f32,
}

#[derive(Debug, Clone)]
pub struct ScaleTier {
    pub granularity: Granularity,
    pub strip: Bounds,
    pub gridlines: Vec<Gridline>,
    pub labels: Vec<LabelLayout>,
    /// Whether vertical gridlines for this tier are switched on.
    pub draw_gridlines: bool,
}

#[derive(Debug, Clone)]
pub struct TimeFrameLayout {
    pub time_frame_id: i64,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub band: Bounds,
    pub row_frame: Bounds,
    pub rows: Vec<Bounds>,
    pub upper: ScaleTier,
    pub lower: ScaleTier,
}

#[derive(Debug, Clone)]
pub struct TaskLayout {
    pub task_id: i64,
    pub time_frame_id: i64,
    /// Row after clamping into range.
    pub row: u32,
    pub bar: Bounds,
    pub milestone: bool,
    pub clipped_start: bool,
    pub clipped_end: bool,
    pub fill: String,
    pub label: Option<LabelLayout>,
}

#[derive(Debug, Clone)]
pub struct PipeLayout {
    pub pipe_id: i64,
    pub time_frame_id: i64,
    pub x: f32,
    pub y1: f32,
    pub y2: f32,
    pub color: String,
    pub label: Option<LabelLayout>,
}

#[derive(Debug, Clone)]
pub struct CurtainLayout {
    pub curtain_id: i64,
    pub time_frame_id: i64,
    pub area: Bounds,
    /// Edge lines drawn only where the curtain actually starts/ends inside
    /// this frame.
    pub left_edge: Option<f32>,
    pub right_edge: Option<f32>,
    pub color: String,
    pub label: Option<LabelLayout>,
}

#[derive(Debug, Clone)]
pub struct SwimlaneLayout {
    pub swimlane_id: i64,
    pub first_row: u32,
    pub last_row: u32,
    pub band: Bounds,
    pub tint: Option<String>,
    pub label: Option<LabelLayout>,
}

#[derive(Debug, Clone)]
pub struct TextBoxLayout {
    pub textbox_id: i64,
    pub bounds: Bounds,
    pub lines: Vec<LabelLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub link_id: i64,
    pub from_task_id: i64,
    pub to_task_id: i64,
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub outer: Bounds,
    pub header: Bounds,
    pub footer: Bounds,
    pub inner: Bounds,
    pub header_text: Option<LabelLayout>,
    pub footer_text: Option<LabelLayout>,
    pub horizontal_gridlines: bool,
    pub row_count: u32,
    pub row_height: f32,
    pub frames: Vec<TimeFrameLayout>,
    pub tasks: Vec<TaskLayout>,
    pub pipes: Vec<PipeLayout>,
    pub curtains: Vec<CurtainLayout>,
    pub swimlanes: Vec<SwimlaneLayout>,
    pub text_boxes: Vec<TextBoxLayout>,
    pub links: Vec<LinkLayout>,
    pub errors: Vec<EntityError>,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

impl Layout {
    pub fn frame(&self, time_frame_id: i64) -> Option<&TimeFrameLayout> {
        self.frames
            .iter()
            .find(|frame| frame.time_frame_id == time_frame_id)
    }

    pub fn task_segments(&self, task_id: i64) -> impl Iterator<Item = &TaskLayout> {
        self.tasks.iter().filter(move |task| task.task_id == task_id)
    }
}
