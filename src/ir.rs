//! Canonical, strongly-typed project document.
//!
//! Dates stay in their canonical `YYYY-MM-DD` string form; the layout engine
//! parses them per entity so one bad date only costs that entity.

use crate::layout::dates::parse_date;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// Gridline/label step size. Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    Days,
    Weeks,
    Months,
    Years,
}

impl Granularity {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Some(Self::Days),
            "week" | "weeks" => Some(Self::Weeks),
            "month" | "months" => Some(Self::Months),
            "year" | "years" => Some(Self::Years),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalGridlines {
    pub years: bool,
    pub months: bool,
    pub weeks: bool,
    pub days: bool,
}

impl VerticalGridlines {
    pub fn all(enabled: bool) -> Self {
        Self {
            years: enabled,
            months: enabled,
            weeks: enabled,
            days: enabled,
        }
    }

    pub fn enabled_for(&self, granularity: Granularity) -> bool {
        match granularity {
            Granularity::Years => self.years,
            Granularity::Months => self.months,
            Granularity::Weeks => self.weeks,
            Granularity::Days => self.days,
        }
    }
}

impl Default for VerticalGridlines {
    fn default() -> Self {
        Self::all(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameConfig {
    pub outer_width: f32,
    pub outer_height: f32,
    pub header_height: f32,
    pub footer_height: f32,
    pub margins: Margins,
    pub num_rows: u32,
    pub upper_scale_height: f32,
    pub lower_scale_height: f32,
    pub header_text: String,
    pub footer_text: String,
    pub horizontal_gridlines: bool,
    pub vertical_gridlines: VerticalGridlines,
    pub chart_start_date: String,
    pub chart_end_date: Option<String>,
}

impl FrameConfig {
    /// Height left for the row bands once margins, header, footer and both
    /// scale strips are taken out.
    pub fn inner_height(&self) -> f32 {
        self.outer_height
            - self.header_height
            - self.footer_height
            - self.margins.top
            - self.margins.bottom
            - self.upper_scale_height
            - self.lower_scale_height
    }

    pub fn inner_width(&self) -> f32 {
        self.outer_width - self.margins.left - self.margins.right
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            outer_width: 800.0,
            outer_height: 600.0,
            header_height: 50.0,
            footer_height: 50.0,
            margins: Margins::default(),
            num_rows: 1,
            upper_scale_height: 20.0,
            lower_scale_height: 20.0,
            header_text: String::new(),
            footer_text: String::new(),
            horizontal_gridlines: true,
            vertical_gridlines: VerticalGridlines::default(),
            chart_start_date: "2025-01-01".to_string(),
            chart_end_date: None,
        }
    }
}

/// A horizontal slice of the timeline. Its start is implied by document
/// order: the chart start for the first frame, the previous finish + 1 day
/// for the others.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame {
    pub time_frame_id: i64,
    pub finish_date: String,
    pub width_proportion: f32,
    pub upper_scale: Granularity,
    pub lower_scale: Granularity,
}

impl TimeFrame {
    pub fn new(time_frame_id: i64, finish_date: &str, width_proportion: f32) -> Self {
        Self {
            time_frame_id,
            finish_date: finish_date.to_string(),
            width_proportion,
            upper_scale: Granularity::Months,
            lower_scale: Granularity::Weeks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPlacement {
    Inside,
    #[default]
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelContent {
    None,
    #[default]
    NameOnly,
    DateOnly,
    NameAndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelAlignment {
    Left,
    #[default]
    Centre,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: i64,
    pub task_name: String,
    pub start_date: String,
    pub finish_date: String,
    /// 1-based; clamped into `[1, num_rows]` during layout.
    pub row_number: i64,
    pub is_milestone: bool,
    pub label_placement: LabelPlacement,
    pub label_content: LabelContent,
    pub label_alignment: LabelAlignment,
    pub label_horizontal_offset: f32,
    pub label_text_colour: String,
    pub fill_colour: String,
}

impl Task {
    pub fn new(task_id: i64, name: &str, start: &str, finish: &str, row_number: i64) -> Self {
        Self {
            task_id,
            task_name: name.to_string(),
            start_date: start.to_string(),
            finish_date: finish.to_string(),
            row_number,
            is_milestone: false,
            label_placement: LabelPlacement::default(),
            label_content: LabelContent::default(),
            label_alignment: LabelAlignment::default(),
            label_horizontal_offset: 0.0,
            label_text_colour: "black".to_string(),
            fill_colour: "blue".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub link_id: i64,
    pub from_task_id: i64,
    pub to_task_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwimlaneLabelPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopLeft,
    TopRight,
}

impl SwimlaneLabelPosition {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "bottom right" => Some(Self::BottomRight),
            "bottom left" => Some(Self::BottomLeft),
            "top left" => Some(Self::TopLeft),
            "top right" => Some(Self::TopRight),
            _ => None,
        }
    }

    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

/// Swimlanes are cumulative: each lane owns the next `row_count` rows
/// after the lanes before it, unless `first_row` pins where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Swimlane {
    pub swimlane_id: i64,
    pub row_count: u32,
    /// Pinned start row (1-based). Rows between the previous lane and this
    /// one stay unlaned.
    pub first_row: Option<u32>,
    pub name: String,
    pub label_position: SwimlaneLabelPosition,
    pub background_colour: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub pipe_id: i64,
    pub date: String,
    pub colour: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curtain {
    pub curtain_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub colour: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub textbox_id: i64,
    /// Offset from the inner-frame origin.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub frame_config: FrameConfig,
    pub time_frames: Vec<TimeFrame>,
    pub tasks: Vec<Task>,
    pub links: Vec<Link>,
    pub swimlanes: Vec<Swimlane>,
    pub pipes: Vec<Pipe>,
    pub curtains: Vec<Curtain>,
    pub text_boxes: Vec<TextBox>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.task_id == task_id)
    }

    /// Finish-to-Start check: both tasks exist and the successor starts on or
    /// after the predecessor finishes.
    pub fn link_is_valid(&self, link: &Link) -> bool {
        let (Some(from), Some(to)) = (self.task(link.from_task_id), self.task(link.to_task_id))
        else {
            return false;
        };
        let from_finish = if from.finish_date.trim().is_empty() {
            &from.start_date
        } else {
            &from.finish_date
        };
        let to_start = if to.start_date.trim().is_empty() {
            &to.finish_date
        } else {
            &to.start_date
        };
        match (parse_date(from_finish), parse_date(to_start)) {
            (Ok(finish), Ok(start)) => start >= finish,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_tasks() -> Document {
        let mut doc = Document::new();
        doc.tasks.push(Task::new(1, "Design", "2025-01-01", "2025-01-10", 1));
        doc.tasks.push(Task::new(2, "Build", "2025-01-10", "2025-01-20", 1));
        doc.tasks.push(Task::new(3, "Early", "2025-01-05", "2025-01-06", 1));
        doc
    }

    #[test]
    fn inner_height_subtracts_everything() {
        let config = FrameConfig::default();
        // 600 - 50 - 50 - 10 - 10 - 20 - 20
        assert_eq!(config.inner_height(), 440.0);
        assert_eq!(config.inner_width(), 780.0);
    }

    #[test]
    fn link_validity_follows_finish_to_start() {
        let doc = doc_with_tasks();
        let ok = Link {
            link_id: 1,
            from_task_id: 1,
            to_task_id: 2,
        };
        let backwards = Link {
            link_id: 2,
            from_task_id: 1,
            to_task_id: 3,
        };
        let dangling = Link {
            link_id: 3,
            from_task_id: 1,
            to_task_id: 99,
        };
        assert!(doc.link_is_valid(&ok));
        assert!(!doc.link_is_valid(&backwards));
        assert!(!doc.link_is_valid(&dangling));
    }

    #[test]
    fn granularity_tokens_and_order() {
        assert_eq!(Granularity::from_token("Weeks"), Some(Granularity::Weeks));
        assert_eq!(Granularity::from_token("month"), Some(Granularity::Months));
        assert_eq!(Granularity::from_token("fortnight"), None);
        assert!(Granularity::Days < Granularity::Years);
    }

    #[test]
    fn swimlane_label_position_tokens() {
        assert_eq!(
            SwimlaneLabelPosition::from_token("Top Left"),
            Some(SwimlaneLabelPosition::TopLeft)
        );
        assert_eq!(
            SwimlaneLabelPosition::from_token("bottom_right"),
            Some(SwimlaneLabelPosition::BottomRight)
        );
        assert!(SwimlaneLabelPosition::TopRight.is_top());
        assert!(!SwimlaneLabelPosition::TopRight.is_left());
    }
}
