use anyhow::{Result, anyhow};
use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const CUSTOM_FALLBACK_DAYS: i64 = 7;

/// Floor used for `all_time`, wide enough to cover every realistic row.
pub fn all_time_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Last3Months,
    Last6Months,
    ThisYear,
    AllTime,
    Custom,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 9] = [
        TimeFrame::ThisWeek,
        TimeFrame::LastWeek,
        TimeFrame::ThisMonth,
        TimeFrame::LastMonth,
        TimeFrame::Last3Months,
        TimeFrame::Last6Months,
        TimeFrame::ThisYear,
        TimeFrame::AllTime,
        TimeFrame::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::Last3Months => "last_3_months",
            Self::Last6Months => "last_6_months",
            Self::ThisYear => "this_year",
            Self::AllTime => "all_time",
            Self::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::Last3Months => "Last 3 Months",
            Self::Last6Months => "Last 6 Months",
            Self::ThisYear => "This Year",
            Self::AllTime => "All Time",
            Self::Custom => "Custom Range",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        TimeFrame::ALL
            .into_iter()
            .find(|frame| frame.as_str() == normalized)
            .ok_or_else(|| {
                anyhow!(
                    "Unsupported time frame: {value}. Supported: {}",
                    TimeFrame::ALL.map(TimeFrame::as_str).join(", ")
                )
            })
    }
}

/// Inclusive calendar interval. Rows are matched by comparing their ISO date
/// strings against the zero-padded `YYYY-MM-DD` bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: String,
    pub end: String,
    #[serde(skip)]
    start_date: NaiveDate,
    #[serde(skip)]
    end_date: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.format(DATE_FORMAT).to_string(),
            end: end.format(DATE_FORMAT).to_string(),
            start_date: start,
            end_date: end,
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && date <= self.end.as_str()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Calendar days spanned inclusively; zero for a misordered window.
    pub fn day_count(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }

    /// Interval of equal span ending the day before `start`.
    pub fn preceding(&self) -> Self {
        let span = (self.end_date - self.start_date).num_days().max(0);
        let previous_end = self.start_date - Duration::days(1);
        let previous_start = previous_end - Duration::days(span);

        Self::new(previous_start, previous_end)
    }
}

/// Every input the resolved interval depends on. Doubles as the summary cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRequest {
    pub frame: TimeFrame,
    pub custom_start: Option<NaiveDate>,
    pub custom_end: Option<NaiveDate>,
    pub today: NaiveDate,
    pub week_start: Weekday,
}

impl RangeRequest {
    pub fn new(frame: TimeFrame, today: NaiveDate, week_start: Weekday) -> Self {
        Self {
            frame,
            custom_start: None,
            custom_end: None,
            today,
            week_start,
        }
    }

    pub fn custom(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
        week_start: Weekday,
    ) -> Self {
        Self {
            frame: TimeFrame::Custom,
            custom_start: start,
            custom_end: end,
            today,
            week_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    #[serde(skip)]
    pub frame: TimeFrame,
    pub current: Window,
    pub previous: Window,
}

impl ResolvedRange {
    pub fn label(&self) -> String {
        format!(
            "{}: {} to {}",
            self.frame.label(),
            self.current.start,
            self.current.end
        )
    }
}

pub fn resolve(request: &RangeRequest) -> ResolvedRange {
    let today = request.today;

    let (start, end) = match request.frame {
        TimeFrame::ThisWeek => (week_start_of(today, request.week_start), today),
        TimeFrame::LastWeek => {
            let this_week = week_start_of(today, request.week_start);
            (
                this_week - Duration::days(7),
                this_week - Duration::days(1),
            )
        }
        TimeFrame::ThisMonth => (first_of_month(today), today),
        TimeFrame::LastMonth => {
            let last_day = first_of_month(today) - Duration::days(1);
            (first_of_month(last_day), last_day)
        }
        TimeFrame::Last3Months => (months_before(today, 3), today),
        TimeFrame::Last6Months => (months_before(today, 6), today),
        TimeFrame::ThisYear => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
            today,
        ),
        TimeFrame::AllTime => (all_time_floor(), today),
        TimeFrame::Custom => (
            request
                .custom_start
                .unwrap_or(today - Duration::days(CUSTOM_FALLBACK_DAYS)),
            request.custom_end.unwrap_or(today),
        ),
    };

    let current = Window::new(start, end);
    let previous = current.preceding();

    ResolvedRange {
        frame: request.frame,
        current,
        previous,
    }
}

/// Builds a request from raw selector inputs. Custom bounds are dropped for
/// symbolic frames so equivalent requests share one cache entry.
pub fn request_from_inputs(
    frame: TimeFrame,
    start: Option<&str>,
    end: Option<&str>,
    today: Option<&str>,
    week_start: Weekday,
) -> Result<RangeRequest> {
    let today = today
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| Local::now().date_naive());

    if frame != TimeFrame::Custom {
        return Ok(RangeRequest::new(frame, today, week_start));
    }

    Ok(RangeRequest::custom(
        start.map(parse_date).transpose()?,
        end.map(parse_date).transpose()?,
        today,
        week_start,
    ))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| anyhow!("Invalid date format: {input}. Example: 2026-02-18"))
}

fn week_start_of(today: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + today.weekday().num_days_from_sunday() - week_start.num_days_from_sunday()) % 7;
    today - Duration::days(i64::from(offset))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::{RangeRequest, TimeFrame, Window, parse_date, request_from_inputs, resolve};
    use chrono::{Duration, NaiveDate, Weekday};

    fn date(value: &str) -> NaiveDate {
        parse_date(value).expect("valid date")
    }

    fn resolve_frame(frame: TimeFrame, today: &str) -> (String, String) {
        let resolved = resolve(&RangeRequest::new(frame, date(today), Weekday::Sun));
        (resolved.current.start, resolved.current.end)
    }

    #[test]
    fn this_week_starts_on_configured_first_day() {
        // 2026-10-21 is a Wednesday.
        assert_eq!(
            resolve_frame(TimeFrame::ThisWeek, "2026-10-21"),
            ("2026-10-18".to_string(), "2026-10-21".to_string())
        );

        let monday_based = resolve(&RangeRequest::new(
            TimeFrame::ThisWeek,
            date("2026-10-21"),
            Weekday::Mon,
        ));
        assert_eq!(monday_based.current.start, "2026-10-19");
    }

    #[test]
    fn this_week_on_first_day_is_single_day() {
        assert_eq!(
            resolve_frame(TimeFrame::ThisWeek, "2026-10-18"),
            ("2026-10-18".to_string(), "2026-10-18".to_string())
        );
    }

    #[test]
    fn last_week_abuts_this_week_without_gap_or_overlap() {
        for today in ["2026-10-18", "2026-10-21", "2026-10-24", "2026-03-01"] {
            let this_week = resolve(&RangeRequest::new(TimeFrame::ThisWeek, date(today), Weekday::Sun));
            let last_week = resolve(&RangeRequest::new(TimeFrame::LastWeek, date(today), Weekday::Sun));

            assert_eq!(last_week.current.day_count(), 7);
            assert_eq!(
                last_week.current.end_date() + Duration::days(1),
                this_week.current.start_date()
            );
        }
    }

    #[test]
    fn month_frames_use_calendar_boundaries() {
        assert_eq!(
            resolve_frame(TimeFrame::ThisMonth, "2026-10-19"),
            ("2026-10-01".to_string(), "2026-10-19".to_string())
        );
        assert_eq!(
            resolve_frame(TimeFrame::LastMonth, "2026-03-15"),
            ("2026-02-01".to_string(), "2026-02-28".to_string())
        );
        assert_eq!(
            resolve_frame(TimeFrame::LastMonth, "2026-01-10"),
            ("2025-12-01".to_string(), "2025-12-31".to_string())
        );
    }

    #[test]
    fn trailing_month_frames_subtract_calendar_months() {
        assert_eq!(
            resolve_frame(TimeFrame::Last3Months, "2026-10-19"),
            ("2026-07-19".to_string(), "2026-10-19".to_string())
        );
        assert_eq!(
            resolve_frame(TimeFrame::Last6Months, "2026-08-31"),
            ("2026-02-28".to_string(), "2026-08-31".to_string())
        );
    }

    #[test]
    fn year_and_all_time_frames() {
        assert_eq!(
            resolve_frame(TimeFrame::ThisYear, "2026-10-19"),
            ("2026-01-01".to_string(), "2026-10-19".to_string())
        );
        assert_eq!(
            resolve_frame(TimeFrame::AllTime, "2026-10-19"),
            ("2020-01-01".to_string(), "2026-10-19".to_string())
        );
    }

    #[test]
    fn custom_range_defaults_to_trailing_week() {
        let resolved = resolve(&RangeRequest::custom(None, None, date("2026-10-19"), Weekday::Sun));
        assert_eq!(resolved.current.start, "2026-10-12");
        assert_eq!(resolved.current.end, "2026-10-19");

        let explicit = resolve(&RangeRequest::custom(
            Some(date("2026-09-01")),
            Some(date("2026-09-30")),
            date("2026-10-19"),
            Weekday::Sun,
        ));
        assert_eq!(explicit.current.start, "2026-09-01");
        assert_eq!(explicit.current.end, "2026-09-30");
    }

    #[test]
    fn comparison_window_has_equal_span_and_ends_before_start() {
        let resolved = resolve(&RangeRequest::new(
            TimeFrame::ThisWeek,
            date("2026-10-24"),
            Weekday::Sun,
        ));

        assert_eq!(resolved.previous.start, "2026-10-11");
        assert_eq!(resolved.previous.end, "2026-10-17");
        assert_eq!(resolved.previous.day_count(), resolved.current.day_count());
    }

    #[test]
    fn misordered_custom_range_degenerates_without_panicking() {
        let resolved = resolve(&RangeRequest::custom(
            Some(date("2026-10-10")),
            Some(date("2026-10-01")),
            date("2026-10-19"),
            Weekday::Sun,
        ));

        assert_eq!(resolved.current.day_count(), 0);
        assert!(!resolved.current.contains("2026-10-05"));
        assert_eq!(resolved.previous.start, "2026-10-09");
        assert_eq!(resolved.previous.end, "2026-10-09");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = Window::new(date("2026-10-11"), date("2026-10-17"));

        assert!(window.contains("2026-10-11"));
        assert!(window.contains("2026-10-17"));
        assert!(!window.contains("2026-10-10"));
        assert!(!window.contains("2026-10-18"));
    }

    #[test]
    fn request_inputs_ignore_bounds_for_symbolic_frames() {
        let symbolic = request_from_inputs(
            TimeFrame::ThisMonth,
            Some("2026-01-01"),
            None,
            Some("2026-10-19"),
            Weekday::Sun,
        )
        .expect("request");
        assert_eq!(symbolic.custom_start, None);

        let custom = request_from_inputs(
            TimeFrame::Custom,
            Some("2026-01-01"),
            Some("2026-01-31"),
            Some("2026-10-19"),
            Weekday::Sun,
        )
        .expect("request");
        assert_eq!(custom.custom_start, Some(date("2026-01-01")));

        assert!(
            request_from_inputs(TimeFrame::Custom, Some("01/02/2026"), None, None, Weekday::Sun)
                .is_err()
        );
    }

    #[test]
    fn time_frame_parses_selector_names() {
        assert_eq!("last_3_months".parse::<TimeFrame>().expect("parses"), TimeFrame::Last3Months);
        assert_eq!("This-Week".parse::<TimeFrame>().expect("parses"), TimeFrame::ThisWeek);
        assert!("fortnight".parse::<TimeFrame>().is_err());
    }
}
