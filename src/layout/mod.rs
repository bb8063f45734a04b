pub mod dates;
pub mod error;
mod frame;
mod gantt;
pub mod gridlines;
pub mod scale;
mod text;
pub mod types;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Document;
use crate::theme::Theme;

pub use error::{EntityError, EntityKind, LayoutError};
pub use types::*;

use gantt::RowGrid;

fn banner_text(text: &str, band: Bounds, font_size: f32) -> Option<LabelLayout> {
    let text = text.trim();
    if text.is_empty() || band.height <= 0.0 {
        return None;
    }
    Some(LabelLayout {
        x: band.center_x(),
        y: band.center_y() + font_size * 0.35,
        text: text.to_string(),
        anchor: TextAnchor::Middle,
        font_size,
        color: None,
        rotation: 0.0,
    })
}

/// Computes the full geometry for `document`.
///
/// Fails only when the frame config cannot produce a coordinate system.
/// Problems with individual entities are collected in [`Layout::errors`]
/// and the entity is left out.
pub fn compute_layout(
    document: &Document,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    let frame_config = &document.frame_config;
    let range = frame::validate_frame_config(frame_config)?;
    let geometry = frame::frame_geometry(frame_config);

    let mut errors = Vec::new();
    let planned = frame::plan_time_frames(&document.time_frames, &range, &mut errors);
    let frames = frame::layout_time_frames(&planned, geometry.inner, frame_config, config);

    let row_count = frame_config.num_rows;
    let row_height = frame_config.inner_height() / row_count as f32;
    let (grid_x, grid_right) = match (frames.first(), frames.last()) {
        (Some(first), Some(last)) => (first.band.x, last.band.right()),
        _ => (geometry.inner.x, geometry.inner.right()),
    };
    let grid = RowGrid {
        x: grid_x,
        width: grid_right - grid_x,
        y: geometry.inner.y + frame_config.upper_scale_height + frame_config.lower_scale_height,
        row_height,
        count: row_count,
    };

    let tasks = gantt::layout_tasks(&document.tasks, &frames, row_count, config, &mut errors);
    let links = gantt::layout_links(document, &mut errors);
    let pipes = gantt::layout_pipes(&document.pipes, &frames, config, &mut errors);
    let curtains = gantt::layout_curtains(&document.curtains, &frames, config, &mut errors);
    let swimlanes = gantt::layout_swimlanes(&document.swimlanes, &grid, config, &mut errors);
    let text_boxes = gantt::layout_text_boxes(
        &document.text_boxes,
        (geometry.inner.x, geometry.inner.y),
        config,
        &mut errors,
    );

    debug!(
        frames = frames.len(),
        tasks = tasks.len(),
        errors = errors.len(),
        "layout computed"
    );

    Ok(Layout {
        width: frame_config.outer_width,
        height: frame_config.outer_height,
        outer: geometry.outer,
        header: geometry.header,
        footer: geometry.footer,
        inner: geometry.inner,
        header_text: banner_text(
            &frame_config.header_text,
            geometry.header,
            theme.header_font_size,
        ),
        footer_text: banner_text(
            &frame_config.footer_text,
            geometry.footer,
            theme.header_font_size,
        ),
        horizontal_gridlines: frame_config.horizontal_gridlines,
        row_count,
        row_height,
        frames,
        tasks,
        pipes,
        curtains,
        swimlanes,
        text_boxes,
        links,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FrameConfig, Link, Swimlane, SwimlaneLabelPosition, Task, TimeFrame};

    fn layout(document: &Document) -> Layout {
        compute_layout(document, &Theme::classic(), &LayoutConfig::default()).unwrap()
    }

    fn january_document() -> Document {
        Document {
            time_frames: vec![TimeFrame::new(1, "2025-01-31", 1.0)],
            tasks: vec![Task::new(1, "Design", "2025-01-05", "2025-01-10", 1)],
            ..Document::default()
        }
    }

    #[test]
    fn single_task_lands_inside_its_row_band() {
        let result = layout(&january_document());
        assert!(result.errors.is_empty());
        let frame = &result.frames[0];
        let row = frame.rows[0];
        let task = &result.tasks[0];
        assert!(row.contains(&task.bar));
        assert!(task.bar.x > frame.band.x && task.bar.right() < frame.band.right());

        // Days 4..9 of a 30-day range across a 780px band.
        let expected_x = frame.band.x + 780.0 * 4.0 / 30.0;
        let expected_right = frame.band.x + 780.0 * 9.0 / 30.0;
        assert!((task.bar.x - expected_x).abs() < 1e-3);
        assert!((task.bar.right() - expected_right).abs() < 1e-3);
    }

    #[test]
    fn frame_tree_is_nested() {
        let result = layout(&january_document());
        assert!(result.outer.contains(&result.header));
        assert!(result.outer.contains(&result.footer));
        assert!(result.outer.contains(&result.inner));
        for frame in &result.frames {
            assert!(result.inner.contains(&frame.band));
            assert!(frame.band.contains(&frame.upper.strip));
            assert!(frame.band.contains(&frame.lower.strip));
            assert!(frame.band.contains(&frame.row_frame));
        }
        assert!((result.row_height - 440.0).abs() < 1e-3);
    }

    #[test]
    fn fatal_config_aborts() {
        let document = Document {
            frame_config: FrameConfig {
                outer_height: -1.0,
                ..FrameConfig::default()
            },
            ..january_document()
        };
        let err = compute_layout(&document, &Theme::classic(), &LayoutConfig::default());
        assert!(matches!(err, Err(LayoutError::InvalidDimension { .. })));
    }

    #[test]
    fn entity_errors_do_not_stop_the_rest() {
        let mut document = january_document();
        document
            .tasks
            .push(Task::new(2, "Broken", "2025-1-5", "2025-01-10", 1));
        document.links.push(Link {
            link_id: 1,
            from_task_id: 1,
            to_task_id: 42,
        });
        let result = layout(&document);
        assert_eq!(result.tasks.len(), 1);
        let kinds: Vec<EntityKind> = result.errors.iter().map(|e| e.entity).collect();
        assert_eq!(kinds, vec![EntityKind::Task, EntityKind::Link]);
        assert!(!result.links[0].valid);
    }

    #[test]
    fn overflowing_proportions_keep_valid_frames() {
        let document = Document {
            time_frames: vec![
                TimeFrame::new(1, "2025-01-31", 0.7),
                TimeFrame::new(2, "2025-02-28", 0.7),
            ],
            ..Document::default()
        };
        let result = layout(&document);
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].entity, EntityKind::TimeFrame);
    }

    #[test]
    fn swimlanes_span_laid_out_frames() {
        let document = Document {
            frame_config: FrameConfig {
                num_rows: 4,
                ..FrameConfig::default()
            },
            time_frames: vec![
                TimeFrame::new(1, "2025-01-31", 0.4),
                TimeFrame::new(2, "2025-03-31", 0.4),
            ],
            swimlanes: vec![Swimlane {
                swimlane_id: 1,
                row_count: 4,
                first_row: None,
                name: "Build".to_string(),
                label_position: SwimlaneLabelPosition::BottomRight,
                background_colour: Some("#eef".to_string()),
            }],
            ..Document::default()
        };
        let result = layout(&document);
        let lane = &result.swimlanes[0];
        assert!((lane.band.x - result.frames[0].band.x).abs() < 1e-3);
        assert!((lane.band.right() - result.frames[1].band.right()).abs() < 1e-3);
        assert!((lane.band.bottom() - result.inner.bottom()).abs() < 1e-3);
    }

    #[test]
    fn header_and_footer_text_are_centred() {
        let mut document = january_document();
        document.frame_config.header_text = "Release plan".to_string();
        let result = layout(&document);
        let header = result.header_text.unwrap();
        assert_eq!(header.anchor, TextAnchor::Middle);
        assert!((header.x - result.header.center_x()).abs() < 1e-3);
        assert!(result.footer_text.is_none());
    }
}
