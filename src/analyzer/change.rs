/// Sentinel for growth from a zero baseline. Not a numeric percentage.
pub const INFINITE_CHANGE: &str = "+inf%";
pub const NO_CHANGE: &str = "0%";

/// Period-over-period change, signed with one decimal place.
pub fn pct_change(previous: f64, current: f64) -> String {
    if previous == 0.0 {
        return if current > 0.0 {
            INFINITE_CHANGE.to_string()
        } else {
            NO_CHANGE.to_string()
        };
    }

    format!("{:+.1}%", (current - previous) / previous * 100.0)
}

/// Division that yields zero instead of NaN or infinity.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Unweighted arithmetic mean; zero for an empty input.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));

    ratio(sum, count as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTone {
    Positive,
    Negative,
    Neutral,
}

pub fn change_tone(change: &str) -> ChangeTone {
    if change.starts_with('+') && change != "+0.0%" && change != "+0%" {
        ChangeTone::Positive
    } else if change.starts_with('-') {
        ChangeTone::Negative
    } else {
        ChangeTone::Neutral
    }
}
