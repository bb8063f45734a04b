use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Document;
use crate::layout::{
    Bounds, EntityError, LabelLayout, Layout, LayoutError, ScaleTier, TextAnchor, compute_layout,
};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// One self-contained drawing instruction. Renderers paint them in order,
/// later primitives over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f32,
        opacity: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: String,
        width: f32,
    },
    /// Milestone marker.
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<String>,
        stroke: Option<String>,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        anchor: TextAnchor,
        size: f32,
        weight: FontWeight,
        colour: String,
        /// Degrees around `(x, y)`.
        rotation: f32,
    },
}

/// Output of a full pass: primitives plus the entities that were skipped.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
    pub errors: Vec<EntityError>,
}

/// Lays out `document` and flattens the result into primitives.
pub fn draw(
    document: &Document,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Drawing, LayoutError> {
    let layout = compute_layout(document, theme, config)?;
    let primitives = emit_primitives(&layout, theme, config);
    Ok(Drawing {
        width: layout.width,
        height: layout.height,
        primitives,
        errors: layout.errors,
    })
}

struct Emitter<'a> {
    theme: &'a Theme,
    config: &'a LayoutConfig,
    out: Vec<Primitive>,
}

impl Emitter<'_> {
    fn rect(
        &mut self,
        bounds: Bounds,
        fill: Option<&str>,
        stroke: Option<&str>,
        stroke_width: f32,
        opacity: f32,
    ) {
        self.out.push(Primitive::Rect {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            fill: fill.map(str::to_string),
            stroke: stroke.map(str::to_string),
            stroke_width,
            opacity,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: &str, width: f32) {
        self.out.push(Primitive::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            stroke: stroke.to_string(),
            width,
        });
    }

    fn text(&mut self, label: &LabelLayout, fallback_colour: &str, weight: FontWeight) {
        self.out.push(Primitive::Text {
            x: label.x,
            y: label.y,
            content: label.text.clone(),
            anchor: label.anchor,
            size: label.font_size,
            weight,
            colour: label
                .color
                .clone()
                .unwrap_or_else(|| fallback_colour.to_string()),
            rotation: label.rotation,
        });
    }

    fn scale_strip(&mut self, tier: &ScaleTier, fill: &str) {
        if tier.strip.height <= 0.0 {
            return;
        }
        let theme = self.theme;
        self.rect(
            tier.strip,
            Some(fill),
            Some(&theme.scale_stroke),
            self.config.frame_stroke_width,
            1.0,
        );
        for label in &tier.labels {
            self.text(label, &theme.text_color, FontWeight::Normal);
        }
    }

    /// Vertical lines over the row frame only; the scale strips stay clear.
    fn gridlines(&mut self, tier: &ScaleTier, rows: Bounds, colour: &str, width: f32) {
        if !tier.draw_gridlines {
            return;
        }
        for line in &tier.gridlines {
            self.line((line.x, rows.y), (line.x, rows.bottom()), colour, width);
        }
    }
}

/// Flattens a layout into primitives, one phase at a time across all
/// frames: canvas, scales, gridlines, then entities, with text boxes last.
pub fn emit_primitives(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> Vec<Primitive> {
    let mut em = Emitter {
        theme,
        config,
        out: Vec::new(),
    };
    let stroke_width = config.frame_stroke_width;

    em.rect(
        layout.outer,
        Some(&theme.background),
        Some(&theme.frame_stroke),
        stroke_width,
        1.0,
    );

    for (band, text) in [
        (layout.header, &layout.header_text),
        (layout.footer, &layout.footer_text),
    ] {
        if band.height <= 0.0 {
            continue;
        }
        em.rect(
            band,
            Some(&theme.header_fill),
            Some(&theme.header_stroke),
            stroke_width,
            1.0,
        );
        if let Some(label) = text {
            em.text(label, &theme.text_color, FontWeight::Bold);
        }
    }

    em.rect(layout.inner, None, Some(&theme.inner_frame_stroke), stroke_width, 1.0);

    for frame in &layout.frames {
        em.rect(frame.band, None, Some(&theme.time_frame_stroke), stroke_width, 1.0);
    }

    for frame in &layout.frames {
        em.scale_strip(&frame.upper, &theme.upper_scale_fill);
        em.scale_strip(&frame.lower, &theme.lower_scale_fill);
    }

    // Upper tier first so the finer lines sit on top.
    for frame in &layout.frames {
        em.gridlines(
            &frame.upper,
            frame.row_frame,
            &theme.upper_gridline_color,
            config.upper_gridline_width,
        );
    }
    for frame in &layout.frames {
        em.gridlines(
            &frame.lower,
            frame.row_frame,
            &theme.lower_gridline_color,
            config.lower_gridline_width,
        );
    }

    if layout.horizontal_gridlines {
        for frame in &layout.frames {
            for row in frame.rows.iter().skip(1) {
                em.line(
                    (row.x, row.y),
                    (row.right(), row.y),
                    &theme.row_gridline_color,
                    config.row_gridline_width,
                );
            }
        }
    }

    for task in &layout.tasks {
        if task.milestone {
            em.out.push(Primitive::Circle {
                cx: task.bar.center_x(),
                cy: task.bar.center_y(),
                r: task.bar.width / 2.0,
                fill: Some(task.fill.clone()),
                stroke: Some(theme.milestone_stroke.clone()),
            });
        } else {
            em.rect(task.bar, Some(&task.fill), None, 0.0, 1.0);
        }
        if let Some(label) = &task.label {
            em.text(label, &theme.text_color, FontWeight::Normal);
        }
    }

    for pipe in &layout.pipes {
        em.line((pipe.x, pipe.y1), (pipe.x, pipe.y2), &pipe.color, config.pipe_width);
        if let Some(label) = &pipe.label {
            em.text(label, &pipe.color, FontWeight::Normal);
        }
    }

    for curtain in &layout.curtains {
        let area = curtain.area;
        em.rect(area, Some(&curtain.color), None, 0.0, config.curtain_opacity);
        for x in [curtain.left_edge, curtain.right_edge].into_iter().flatten() {
            em.line(
                (x, area.y),
                (x, area.bottom()),
                &curtain.color,
                config.curtain_edge_width,
            );
        }
        if let Some(label) = &curtain.label {
            em.text(label, &curtain.color, FontWeight::Normal);
        }
    }

    for lane in &layout.swimlanes {
        let band = lane.band;
        if let Some(tint) = &lane.tint {
            em.rect(band, Some(tint), None, 0.0, config.swimlane_tint_opacity);
        }
        em.line(
            (band.x, band.bottom()),
            (band.right(), band.bottom()),
            &theme.swimlane_divider_color,
            config.frame_stroke_width,
        );
        if let Some(label) = &lane.label {
            em.text(label, &theme.swimlane_label_color, FontWeight::Bold);
        }
    }

    for text_box in &layout.text_boxes {
        em.rect(
            text_box.bounds,
            Some(&theme.text_box_fill),
            Some(&theme.text_box_stroke),
            stroke_width,
            1.0,
        );
        for line in &text_box.lines {
            em.text(line, &theme.text_color, FontWeight::Normal);
        }
    }

    debug!(primitives = em.out.len(), "primitives emitted");
    em.out
}
