use crate::dataset::{Metric, Platform, WeeklyRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// Weekly reach per tracked platform, aligned by index with `weeks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalTrends {
    pub weeks: Vec<String>,
    pub youtube_reach: Vec<f64>,
    pub instagram_reach: Vec<f64>,
    pub tiktok_reach: Vec<f64>,
    pub x_reach: Vec<f64>,
    pub total_reach: Vec<f64>,
}

/// Built from every weekly reach row regardless of the selected window.
pub fn build(rows: &[WeeklyRow]) -> HistoricalTrends {
    let by_week = rows
        .iter()
        .filter(|row| row.metric == Metric::ReachViews)
        .filter_map(|row| {
            Platform::TRACKED
                .iter()
                .position(|platform| *platform == row.platform)
                .map(|slot| (row.week_date.as_str(), slot, row.value))
        })
        .fold(
            BTreeMap::<&str, [f64; 4]>::new(),
            |mut acc, (week, slot, value)| {
                acc.entry(week).or_default()[slot] += value;
                acc
            },
        );

    by_week
        .into_iter()
        .fold(HistoricalTrends::default(), |mut trends, (week, reach)| {
            trends.weeks.push(week.to_string());
            trends.youtube_reach.push(reach[0]);
            trends.instagram_reach.push(reach[1]);
            trends.tiktok_reach.push(reach[2]);
            trends.x_reach.push(reach[3]);
            trends.total_reach.push(reach.iter().sum());
            trends
        })
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::dataset::{Metric, Platform, WeeklyRow};

    fn reach(week: &str, platform: Platform, value: f64) -> WeeklyRow {
        WeeklyRow {
            week_date: week.to_string(),
            platform,
            metric: Metric::ReachViews,
            value,
        }
    }

    #[test]
    fn groups_reach_by_week_in_ascending_order() {
        let rows = vec![
            reach("2026-10-11", Platform::Youtube, 150.0),
            reach("2026-10-04", Platform::Youtube, 100.0),
            reach("2026-10-04", Platform::X, 20.0),
            reach("2026-10-11", Platform::Tiktok, 70.0),
            reach("2026-10-11", Platform::Linkedin, 500.0),
            WeeklyRow {
                week_date: "2026-09-27".to_string(),
                platform: Platform::Youtube,
                metric: Metric::NewFollowers,
                value: 9.0,
            },
        ];

        let trends = build(&rows);

        assert_eq!(trends.weeks, vec!["2026-10-04", "2026-10-11"]);
        assert_eq!(trends.youtube_reach, vec![100.0, 150.0]);
        assert_eq!(trends.instagram_reach, vec![0.0, 0.0]);
        assert_eq!(trends.tiktok_reach, vec![0.0, 70.0]);
        assert_eq!(trends.x_reach, vec![20.0, 0.0]);
        assert_eq!(trends.total_reach, vec![120.0, 220.0]);
    }

    #[test]
    fn empty_table_yields_empty_series() {
        let trends = build(&[]);

        assert!(trends.weeks.is_empty());
        assert!(trends.total_reach.is_empty());
    }
}
