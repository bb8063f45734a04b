use chrono::NaiveDate;

use super::dates::days_between;

/// Maps `date` linearly onto `[band_x, band_x + band_width]`, with
/// `frame_start` at the left edge and `frame_end` at the right edge.
///
/// A zero-length (or inverted) range pins every date to `band_x`.
pub fn date_to_x(
    date: NaiveDate,
    frame_start: NaiveDate,
    frame_end: NaiveDate,
    band_x: f32,
    band_width: f32,
) -> f32 {
    let span = days_between(frame_start, frame_end);
    if span <= 0 {
        return band_x;
    }
    let offset = days_between(frame_start, date) as f32;
    band_x + band_width * offset / span as f32
}

/// Date-to-pixel mapping for a single time-frame band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub x: f32,
    pub width: f32,
}

impl TimeScale {
    pub fn new(start: NaiveDate, finish: NaiveDate, x: f32, width: f32) -> Self {
        Self {
            start,
            finish,
            x,
            width,
        }
    }

    pub fn x_for(&self, date: NaiveDate) -> f32 {
        date_to_x(date, self.start, self.finish, self.x, self.width)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.finish
    }

    /// Portion of `[start, finish]` visible in this frame, if any.
    pub fn clip(&self, start: NaiveDate, finish: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        if finish < self.start || start > self.finish {
            return None;
        }
        Some((start.max(self.start), finish.min(self.finish)))
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::dates::parse_date;

    fn d(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn frame_start_maps_to_band_x() {
        let x = date_to_x(d("2025-01-01"), d("2025-01-01"), d("2025-01-31"), 42.0, 300.0);
        assert_eq!(x, 42.0);
        let end = date_to_x(d("2025-01-31"), d("2025-01-01"), d("2025-01-31"), 42.0, 300.0);
        assert!((end - 342.0).abs() < 1e-4);
    }

    #[test]
    fn mapping_is_monotonic() {
        let start = d("2025-01-01");
        let end = d("2025-03-01");
        let mut date = d("2024-12-20");
        let mut last = f32::MIN;
        while date <= d("2025-03-10") {
            let x = date_to_x(date, start, end, 10.0, 500.0);
            assert!(x >= last);
            last = x;
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn zero_length_range_pins_to_band_x() {
        let day = d("2025-05-05");
        assert_eq!(date_to_x(day, day, day, 7.0, 100.0), 7.0);
        assert_eq!(date_to_x(d("2025-05-09"), day, day, 7.0, 100.0), 7.0);
    }

    #[test]
    fn full_week_spans_full_band() {
        let scale = TimeScale::new(d("2025-01-01"), d("2025-01-08"), 20.0, 700.0);
        let left = scale.x_for(d("2025-01-01"));
        let right = scale.x_for(d("2025-01-08"));
        assert_eq!(left, 20.0);
        assert!((right - left - 700.0).abs() < 1e-3);
    }

    #[test]
    fn clip_keeps_overlap_only() {
        let scale = TimeScale::new(d("2025-01-01"), d("2025-01-31"), 0.0, 100.0);
        assert_eq!(
            scale.clip(d("2024-12-20"), d("2025-01-10")),
            Some((d("2025-01-01"), d("2025-01-10")))
        );
        assert_eq!(scale.clip(d("2025-02-01"), d("2025-02-10")), None);
        assert!(scale.contains(d("2025-01-31")));
        assert!(!scale.contains(d("2025-02-01")));
    }
}
