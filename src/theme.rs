use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub header_font_size: f32,
    pub text_color: String,
    pub background: String,
    pub frame_stroke: String,
    pub header_fill: String,
    pub header_stroke: String,
    pub inner_frame_stroke: String,
    pub time_frame_stroke: String,
    pub upper_scale_fill: String,
    pub lower_scale_fill: String,
    pub scale_stroke: String,
    pub upper_gridline_color: String,
    pub lower_gridline_color: String,
    pub row_gridline_color: String,
    pub milestone_stroke: String,
    pub swimlane_divider_color: String,
    pub swimlane_label_color: String,
    pub text_box_fill: String,
    pub text_box_stroke: String,
}

impl Theme {
    /// Greys and black outlines, close to a printed plan.
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 10.0,
            header_font_size: 14.0,
            text_color: "black".to_string(),
            background: "white".to_string(),
            frame_stroke: "black".to_string(),
            header_fill: "lightgray".to_string(),
            header_stroke: "black".to_string(),
            inner_frame_stroke: "gray".to_string(),
            time_frame_stroke: "black".to_string(),
            upper_scale_fill: "#F2F2F2".to_string(),
            lower_scale_fill: "#FAFAFA".to_string(),
            scale_stroke: "gray".to_string(),
            upper_gridline_color: "black".to_string(),
            lower_gridline_color: "gray".to_string(),
            row_gridline_color: "lightgray".to_string(),
            milestone_stroke: "black".to_string(),
            swimlane_divider_color: "black".to_string(),
            swimlane_label_color: "black".to_string(),
            text_box_fill: "white".to_string(),
            text_box_stroke: "black".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            header_font_size: 15.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            frame_stroke: "#C7D2E5".to_string(),
            header_fill: "#EEF2F8".to_string(),
            header_stroke: "#C7D2E5".to_string(),
            inner_frame_stroke: "#D7E0F0".to_string(),
            time_frame_stroke: "#7A8AA6".to_string(),
            upper_scale_fill: "#F7FAFF".to_string(),
            lower_scale_fill: "#FFFFFF".to_string(),
            scale_stroke: "#D7E0F0".to_string(),
            upper_gridline_color: "#7A8AA6".to_string(),
            lower_gridline_color: "#D7E0F0".to_string(),
            row_gridline_color: "#EEF2F8".to_string(),
            milestone_stroke: "#1C2430".to_string(),
            swimlane_divider_color: "#7A8AA6".to_string(),
            swimlane_label_color: "#3A4A66".to_string(),
            text_box_fill: "#FFFFFF".to_string(),
            text_box_stroke: "#C7D2E5".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
