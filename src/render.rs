use crate::config::RenderConfig;
use crate::draw::{FontWeight, Primitive};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Writes primitives, in order, into a standalone SVG document.
pub fn render_svg(primitives: &[Primitive], width: f32, height: f32, theme: &Theme) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    for primitive in primitives {
        match primitive {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                stroke_width,
                opacity,
            } => {
                svg.push_str(&format!(
                    "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}",
                    width.max(0.0),
                    height.max(0.0),
                    paint(fill.as_deref()),
                    stroke_attrs(stroke.as_deref(), *stroke_width),
                ));
                if *opacity < 1.0 {
                    svg.push_str(&format!(" fill-opacity=\"{opacity:.2}\""));
                }
                svg.push_str("/>");
            }
            Primitive::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
                width,
            } => {
                svg.push_str(&format!(
                    "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"{width}\"/>",
                    escape_xml(stroke)
                ));
            }
            Primitive::Circle {
                cx,
                cy,
                r,
                fill,
                stroke,
            } => {
                svg.push_str(&format!(
                    "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\"{}/>",
                    paint(fill.as_deref()),
                    stroke_attrs(stroke.as_deref(), 1.0),
                ));
            }
            Primitive::Text {
                x,
                y,
                content,
                anchor,
                size,
                weight,
                colour,
                rotation,
            } => {
                svg.push_str(&format!(
                    "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{}\"",
                    anchor.as_svg(),
                    escape_xml(&theme.font_family),
                    escape_xml(colour),
                ));
                if *weight == FontWeight::Bold {
                    svg.push_str(" font-weight=\"bold\"");
                }
                if *rotation != 0.0 {
                    svg.push_str(&format!(" transform=\"rotate({rotation} {x:.2} {y:.2})\""));
                }
                svg.push_str(&format!(">{}</text>", escape_xml(content)));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn paint(colour: Option<&str>) -> String {
    colour.map_or_else(|| "none".to_string(), escape_xml)
}

fn stroke_attrs(stroke: Option<&str>, width: f32) -> String {
    match stroke {
        Some(stroke) if width > 0.0 => {
            format!(" stroke=\"{}\" stroke-width=\"{width}\"", escape_xml(stroke))
        }
        _ => String::new(),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.scale.max(0.1);
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature (rebuild with --features png)"
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::draw::draw;
    use crate::ir::{Document, Task, TimeFrame};
    use crate::layout::TextAnchor;

    #[test]
    fn render_svg_basic() {
        let mut document = Document::new();
        document.time_frames.push(TimeFrame::new(1, "2025-01-31", 1.0));
        document
            .tasks
            .push(Task::new(1, "Design & build", "2025-01-05", "2025-01-10", 1));
        let theme = Theme::classic();
        let drawing = draw(&document, &theme, &LayoutConfig::default()).unwrap();
        let svg = render_svg(&drawing.primitives, drawing.width, drawing.height, &theme);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Design &amp; build"));
        assert!(svg.contains("fill=\"blue\""));
    }

    #[test]
    fn rotated_text_gets_transform() {
        let text = Primitive::Text {
            x: 10.0,
            y: 20.0,
            content: "Freeze".to_string(),
            anchor: TextAnchor::End,
            size: 9.0,
            weight: FontWeight::Normal,
            colour: "red".to_string(),
            rotation: -90.0,
        };
        let svg = render_svg(&[text], 100.0, 100.0, &Theme::classic());
        assert!(svg.contains("transform=\"rotate(-90 10.00 20.00)\""));
        assert!(svg.contains("text-anchor=\"end\""));
    }

    #[test]
    fn translucent_rect_without_stroke() {
        let rect = Primitive::Rect {
            x: 0.0,
            y: 0.0,
            width: 5.0,
            height: 5.0,
            fill: Some("orange".to_string()),
            stroke: None,
            stroke_width: 0.0,
            opacity: 0.25,
        };
        let svg = render_svg(&[rect], 10.0, 10.0, &Theme::classic());
        assert!(svg.contains("fill-opacity=\"0.25\""));
        assert!(!svg.contains("stroke=\"orange\""));
    }
}
