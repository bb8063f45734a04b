use crate::ir::Granularity;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// strftime patterns used for scale labels, one per granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleLabelFormats {
    pub years: String,
    pub months: String,
    pub weeks: String,
    pub days: String,
}

impl ScaleLabelFormats {
    pub fn for_granularity(&self, granularity: Granularity) -> &str {
        match granularity {
            Granularity::Years => &self.years,
            Granularity::Months => &self.months,
            Granularity::Weeks => &self.weeks,
            Granularity::Days => &self.days,
        }
    }
}

impl Default for ScaleLabelFormats {
    fn default() -> Self {
        Self {
            years: "%Y".to_string(),
            months: "%b".to_string(),
            weeks: "%d".to_string(),
            days: "%d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Scale labels closer than this to the previous label are dropped.
    pub label_min_gap: f32,
    pub task_bar_height_ratio: f32,
    pub milestone_radius_ratio: f32,
    pub task_label_font_size: f32,
    pub task_label_padding: f32,
    pub scale_label_font_size: f32,
    pub upper_gridline_width: f32,
    pub lower_gridline_width: f32,
    pub row_gridline_width: f32,
    pub frame_stroke_width: f32,
    pub pipe_width: f32,
    pub curtain_edge_width: f32,
    pub curtain_opacity: f32,
    pub swimlane_tint_opacity: f32,
    pub swimlane_label_font_size: f32,
    pub swimlane_label_padding: f32,
    pub marker_label_font_size: f32,
    pub text_box_font_size: f32,
    pub text_box_padding: f32,
    pub label_line_height: f32,
    pub scale_label_formats: ScaleLabelFormats,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_min_gap: 50.0,
            task_bar_height_ratio: 0.8,
            milestone_radius_ratio: 0.35,
            task_label_font_size: 10.0,
            task_label_padding: 4.0,
            scale_label_font_size: 10.0,
            upper_gridline_width: 2.0,
            lower_gridline_width: 1.0,
            row_gridline_width: 0.5,
            frame_stroke_width: 1.0,
            pipe_width: 2.0,
            curtain_edge_width: 1.0,
            curtain_opacity: 0.25,
            swimlane_tint_opacity: 0.15,
            swimlane_label_font_size: 10.0,
            swimlane_label_padding: 4.0,
            marker_label_font_size: 9.0,
            text_box_font_size: 10.0,
            text_box_padding: 4.0,
            label_line_height: 1.2,
            scale_label_formats: ScaleLabelFormats::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pixel multiplier for raster output.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    header_font_size: Option<NumberOrString>,
    text_color: Option<String>,
    background: Option<String>,
    frame_stroke: Option<String>,
    header_fill: Option<String>,
    header_stroke: Option<String>,
    inner_frame_stroke: Option<String>,
    time_frame_stroke: Option<String>,
    upper_scale_fill: Option<String>,
    lower_scale_fill: Option<String>,
    scale_stroke: Option<String>,
    upper_gridline_color: Option<String>,
    lower_gridline_color: Option<String>,
    row_gridline_color: Option<String>,
    milestone_stroke: Option<String>,
    swimlane_divider_color: Option<String>,
    swimlane_label_color: Option<String>,
    text_box_fill: Option<String>,
    text_box_stroke: Option<String>,
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
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    label_min_gap: Option<f32>,
    task_bar_height_ratio: Option<f32>,
    milestone_radius_ratio: Option<f32>,
    task_label_font_size: Option<f32>,
    task_label_padding: Option<f32>,
    scale_label_font_size: Option<f32>,
    upper_gridline_width: Option<f32>,
    lower_gridline_width: Option<f32>,
    row_gridline_width: Option<f32>,
    frame_stroke_width: Option<f32>,
    pipe_width: Option<f32>,
    curtain_edge_width: Option<f32>,
    curtain_opacity: Option<f32>,
    swimlane_tint_opacity: Option<f32>,
    swimlane_label_font_size: Option<f32>,
    swimlane_label_padding: Option<f32>,
    marker_label_font_size: Option<f32>,
    text_box_font_size: Option<f32>,
    text_box_padding: Option<f32>,
    label_line_height: Option<f32>,
    scale_label_formats: Option<ScaleLabelFormatsFile>,
}

#[derive(Debug, Deserialize)]
struct ScaleLabelFormatsFile {
    years: Option<String>,
    months: Option<String>,
    weeks: Option<String>,
    days: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RenderConfigFile {
    scale: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(strict_err) => json5::from_str(contents).map_err(|_| strict_err)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme {theme_name:?}"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(layout) = parsed.layout {
        apply_layout_overrides(&mut config.layout, layout);
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v.max(0.1);
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
        theme.font_size = v;
    }
    if let Some(v) = vars.header_font_size.as_ref().and_then(NumberOrString::as_f32) {
        theme.header_font_size = v;
    }
    let colors = [
        (vars.text_color, &mut theme.text_color),
        (vars.background, &mut theme.background),
        (vars.frame_stroke, &mut theme.frame_stroke),
        (vars.header_fill, &mut theme.header_fill),
        (vars.header_stroke, &mut theme.header_stroke),
        (vars.inner_frame_stroke, &mut theme.inner_frame_stroke),
        (vars.time_frame_stroke, &mut theme.time_frame_stroke),
        (vars.upper_scale_fill, &mut theme.upper_scale_fill),
        (vars.lower_scale_fill, &mut theme.lower_scale_fill),
        (vars.scale_stroke, &mut theme.scale_stroke),
        (vars.upper_gridline_color, &mut theme.upper_gridline_color),
        (vars.lower_gridline_color, &mut theme.lower_gridline_color),
        (vars.row_gridline_color, &mut theme.row_gridline_color),
        (vars.milestone_stroke, &mut theme.milestone_stroke),
        (vars.swimlane_divider_color, &mut theme.swimlane_divider_color),
        (vars.swimlane_label_color, &mut theme.swimlane_label_color),
        (vars.text_box_fill, &mut theme.text_box_fill),
        (vars.text_box_stroke, &mut theme.text_box_stroke),
    ];
    for (value, slot) in colors {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn apply_layout_overrides(layout: &mut LayoutConfig, file: LayoutConfigFile) {
    let numbers = [
        (file.label_min_gap, &mut layout.label_min_gap),
        (file.task_bar_height_ratio, &mut layout.task_bar_height_ratio),
        (file.milestone_radius_ratio, &mut layout.milestone_radius_ratio),
        (file.task_label_font_size, &mut layout.task_label_font_size),
        (file.task_label_padding, &mut layout.task_label_padding),
        (file.scale_label_font_size, &mut layout.scale_label_font_size),
        (file.upper_gridline_width, &mut layout.upper_gridline_width),
        (file.lower_gridline_width, &mut layout.lower_gridline_width),
        (file.row_gridline_width, &mut layout.row_gridline_width),
        (file.frame_stroke_width, &mut layout.frame_stroke_width),
        (file.pipe_width, &mut layout.pipe_width),
        (file.curtain_edge_width, &mut layout.curtain_edge_width),
        (file.curtain_opacity, &mut layout.curtain_opacity),
        (file.swimlane_tint_opacity, &mut layout.swimlane_tint_opacity),
        (file.swimlane_label_font_size, &mut layout.swimlane_label_font_size),
        (file.swimlane_label_padding, &mut layout.swimlane_label_padding),
        (file.marker_label_font_size, &mut layout.marker_label_font_size),
        (file.text_box_font_size, &mut layout.text_box_font_size),
        (file.text_box_padding, &mut layout.text_box_padding),
        (file.label_line_height, &mut layout.label_line_height),
    ];
    for (value, slot) in numbers {
        if let Some(value) = value {
            *slot = value;
        }
    }
    layout.task_bar_height_ratio = layout.task_bar_height_ratio.clamp(0.05, 1.0);

    if let Some(formats) = file.scale_label_formats {
        let slots = [
            (formats.years, &mut layout.scale_label_formats.years),
            (formats.months, &mut layout.scale_label_formats.months),
            (formats.weeks, &mut layout.scale_label_formats.weeks),
            (formats.days, &mut layout.scale_label_formats.days),
        ];
        for (value, slot) in slots {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.label_min_gap, 50.0);
        assert_eq!(config.theme.header_fill, "lightgray");
    }

    #[test]
    fn theme_name_and_variables_apply() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "fontSize": "12px", "headerFill": "#123456" },
                "layout": { "labelMinGap": 30, "scaleLabelFormats": { "months": "%B" } },
                "render": { "scale": 2 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.theme.header_fill, "#123456");
        assert_eq!(config.theme.text_color, Theme::modern().text_color);
        assert_eq!(config.layout.label_min_gap, 30.0);
        assert_eq!(config.layout.scale_label_formats.months, "%B");
        assert_eq!(config.layout.scale_label_formats.years, "%Y");
        assert_eq!(config.render.scale, 2.0);
    }

    #[test]
    fn lenient_json_is_accepted() {
        let config = parse_config("{ layout: { pipeWidth: 3, }, // thick pipes\n }").unwrap();
        assert_eq!(config.layout.pipe_width, 3.0);
    }

    #[test]
    fn unknown_theme_is_an_error() {
        assert!(parse_config(r#"{ "theme": "neon" }"#).is_err());
    }
}
