use std::fmt;

/// Configuration problems that leave no usable coordinate system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("frame_config.{field} must be {expected}, got {value}")]
    InvalidDimension {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("margins leave no room: {0}")]
    InvalidMargins(String),
    #[error("frame_config.num_rows must be at least 1")]
    NoRows,
    #[error("no height left for rows (inner height {0})")]
    InnerHeightNotPositive(f32),
    #[error("frame_config.{field}: invalid date {value:?} (expected YYYY-MM-DD)")]
    InvalidChartDate { field: &'static str, value: String },
    #[error("chart end {end} is before chart start {start}")]
    ChartRangeInverted { start: String, end: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    TimeFrame,
    Task,
    Link,
    Swimlane,
    Pipe,
    Curtain,
    TextBox,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::TimeFrame => "time_frame",
            EntityKind::Task => "task",
            EntityKind::Link => "link",
            EntityKind::Swimlane => "swimlane",
            EntityKind::Pipe => "pipe",
            EntityKind::Curtain => "curtain",
            EntityKind::TextBox => "text_box",
        };
        f.write_str(name)
    }
}

/// One skipped entity. Layout carries on without it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {entity_id}: {reason}")]
pub struct EntityError {
    pub entity: EntityKind,
    pub entity_id: i64,
    pub reason: String,
}

impl EntityError {
    pub fn new(entity: EntityKind, entity_id: i64, reason: impl Into<String>) -> Self {
        Self {
            entity,
            entity_id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_error_display_names_the_entity() {
        let err = EntityError::new(EntityKind::TextBox, 4, "width must be positive");
        assert_eq!(err.to_string(), "text_box 4: width must be positive");
    }

    #[test]
    fn fatal_errors_describe_the_field() {
        let err = LayoutError::InvalidChartDate {
            field: "chart_start_date",
            value: "2025/01/01".to_string(),
        };
        assert!(err.to_string().contains("chart_start_date"));
    }
}
