use crate::layout::dates::format_date;
use crate::layout::{Bounds, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub header: Bounds,
    pub footer: Bounds,
    pub inner: Bounds,
    pub row_height: f32,
    pub frames: Vec<FrameDump>,
    pub tasks: Vec<TaskDump>,
    pub pipes: Vec<MarkerDump>,
    pub curtains: Vec<MarkerDump>,
    pub swimlanes: Vec<SwimlaneDump>,
    pub text_boxes: Vec<TextBoxDump>,
    pub links: Vec<LinkDump>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub id: i64,
    pub start: String,
    pub finish: String,
    pub band: Bounds,
    pub upper: TierDump,
    pub lower: TierDump,
}

#[derive(Debug, Serialize)]
pub struct TierDump {
    pub granularity: String,
    pub gridlines: Vec<(String, f32)>,
    pub labels: Vec<(f32, String)>,
    pub drawn: bool,
}

#[derive(Debug, Serialize)]
pub struct TaskDump {
    pub id: i64,
    pub frame: i64,
    pub row: u32,
    pub bar: Bounds,
    pub milestone: bool,
    pub clipped: [bool; 2],
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkerDump {
    pub id: i64,
    pub frame: i64,
    pub x1: f32,
    pub x2: f32,
}

#[derive(Debug, Serialize)]
pub struct SwimlaneDump {
    pub id: i64,
    pub rows: [u32; 2],
    pub band: Bounds,
}

#[derive(Debug, Serialize)]
pub struct TextBoxDump {
    pub id: i64,
    pub bounds: Bounds,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub valid: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let frames = layout
            .frames
            .iter()
            .map(|frame| {
                let tier = |tier: &crate::layout::ScaleTier| TierDump {
                    granularity: tier.granularity.as_str().to_string(),
                    gridlines: tier
                        .gridlines
                        .iter()
                        .map(|line| (format_date(line.date), line.x))
                        .collect(),
                    labels: tier
                        .labels
                        .iter()
                        .map(|label| (label.x, label.text.clone()))
                        .collect(),
                    drawn: tier.draw_gridlines,
                };
                FrameDump {
                    id: frame.time_frame_id,
                    start: format_date(frame.start),
                    finish: format_date(frame.finish),
                    band: frame.band,
                    upper: tier(&frame.upper),
                    lower: tier(&frame.lower),
                }
            })
            .collect();

        let tasks = layout
            .tasks
            .iter()
            .map(|task| TaskDump {
                id: task.task_id,
                frame: task.time_frame_id,
                row: task.row,
                bar: task.bar,
                milestone: task.milestone,
                clipped: [task.clipped_start, task.clipped_end],
                label: task.label.as_ref().map(|label| label.text.clone()),
            })
            .collect();

        let pipes = layout
            .pipes
            .iter()
            .map(|pipe| MarkerDump {
                id: pipe.pipe_id,
                frame: pipe.time_frame_id,
                x1: pipe.x,
                x2: pipe.x,
            })
            .collect();

        let curtains = layout
            .curtains
            .iter()
            .map(|curtain| MarkerDump {
                id: curtain.curtain_id,
                frame: curtain.time_frame_id,
                x1: curtain.area.x,
                x2: curtain.area.right(),
            })
            .collect();

        let swimlanes = layout
            .swimlanes
            .iter()
            .map(|lane| SwimlaneDump {
                id: lane.swimlane_id,
                rows: [lane.first_row, lane.last_row],
                band: lane.band,
            })
            .collect();

        let text_boxes = layout
            .text_boxes
            .iter()
            .map(|text_box| TextBoxDump {
                id: text_box.textbox_id,
                bounds: text_box.bounds,
                lines: text_box.lines.iter().map(|line| line.text.clone()).collect(),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                id: link.link_id,
                from: link.from_task_id,
                to: link.to_task_id,
                valid: link.valid,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            header: layout.header,
            footer: layout.footer,
            inner: layout.inner,
            row_height: layout.row_height,
            frames,
            tasks,
            pipes,
            curtains,
            swimlanes,
            text_boxes,
            links,
            errors: layout.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Document, Task, TimeFrame};
    use crate::layout::compute_layout;
    use crate::theme::Theme;

    #[test]
    fn dump_lists_frames_and_tasks() {
        let mut document = Document::new();
        document.time_frames.push(TimeFrame::new(3, "2025-02-28", 1.0));
        document
            .tasks
            .push(Task::new(1, "Design", "2025-01-05", "2025-01-10", 1));
        let layout = compute_layout(&document, &Theme::classic(), &LayoutConfig::default()).unwrap();
        let value = serde_json::to_value(LayoutDump::from_layout(&layout)).unwrap();
        assert_eq!(value["frames"][0]["id"], 3);
        assert_eq!(value["frames"][0]["finish"], "2025-02-28");
        assert_eq!(value["tasks"][0]["label"], "Design");
        assert!(value["frames"][0]["upper"]["gridlines"].is_array());
    }
}
