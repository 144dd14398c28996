use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Platforms that appear in the weekly summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Instagram,
    Tiktok,
    X,
    Linkedin,
    MetaAds,
}

impl Platform {
    /// Platforms compared period-over-period and charted in the trend series.
    pub const TRACKED: [Platform; 4] = [
        Platform::Youtube,
        Platform::Instagram,
        Platform::Tiktok,
        Platform::X,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "youtube" | "yt" => Some(Self::Youtube),
            "instagram" | "ig" => Some(Self::Instagram),
            "tiktok" | "tik_tok" => Some(Self::Tiktok),
            "x" | "twitter" | "x_(twitter)" => Some(Self::X),
            "linkedin" => Some(Self::Linkedin),
            "meta_ads" | "meta" | "facebook_ads" => Some(Self::MetaAds),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::X => "x",
            Self::Linkedin => "linkedin",
            Self::MetaAds => "meta_ads",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Instagram => "Instagram",
            Self::Tiktok => "TikTok",
            Self::X => "X",
            Self::Linkedin => "LinkedIn",
            Self::MetaAds => "Meta Ads",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Closed set of weekly summary metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ReachViews,
    EngagementRate,
    NewFollowers,
    ClientInquiries,
    NewClients,
}

impl Metric {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_label(raw).as_str() {
            "reach/views" | "reach_/_views" | "reach_views" | "reach" | "views" => {
                Some(Self::ReachViews)
            }
            "engagement_rate" | "engagement" => Some(Self::EngagementRate),
            "new_followers" | "followers" => Some(Self::NewFollowers),
            "client_inquiries" | "inquiries" => Some(Self::ClientInquiries),
            "new_clients" | "clients" => Some(Self::NewClients),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ReachViews => "Reach/Views",
            Self::EngagementRate => "Engagement Rate",
            Self::NewFollowers => "New Followers",
            Self::ClientInquiries => "Client Inquiries",
            Self::NewClients => "New Clients",
        }
    }
}

/// One platform-metric-week fact from the tidy weekly summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRow {
    pub week_date: String,
    pub platform: Platform,
    pub metric: Metric,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeHint {
    #[serde(default, deserialize_with = "lenient_text")]
    pub earliest: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub latest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TikTokDay {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub views: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub likes: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub comments: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub shares: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XDay {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub impressions: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub engagements: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub likes: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub reposts: f64,
    #[serde(default, alias = "new_followers", deserialize_with = "lenient_number")]
    pub new_follows: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YouTubeVideo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, alias = "week", deserialize_with = "lenient_text")]
    pub week_start: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub views: f64,
    #[serde(default, alias = "subscribers", deserialize_with = "lenient_number")]
    pub subs: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ctr: f64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_short: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, alias = "date", deserialize_with = "lenient_text")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub results: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub reach: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub impressions: f64,
    #[serde(default, alias = "amount_spent", deserialize_with = "lenient_number")]
    pub spent: f64,
    #[serde(default, alias = "cost_per_result", deserialize_with = "lenient_number")]
    pub cpr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedInPost {
    #[serde(default, alias = "post_url", deserialize_with = "lenient_text")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub impressions: f64,
    #[serde(default, alias = "members_reached", deserialize_with = "lenient_number")]
    pub reached: f64,
    #[serde(default, alias = "followers_gained", deserialize_with = "lenient_number")]
    pub followers: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub reactions: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub comments: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub saves: f64,
}

/// One demographic bucket measured on one LinkedIn post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicRow {
    #[serde(default, alias = "url", deserialize_with = "lenient_text")]
    pub post_url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(default, alias = "name", deserialize_with = "lenient_text")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerWin {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub customer: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub platform: String,
    #[serde(default, alias = "content_description", deserialize_with = "lenient_text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
}

/// The raw historical document. Every table is optional in the source JSON
/// and decodes to an empty list when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalReport {
    #[serde(deserialize_with = "lenient_text")]
    pub generated_at: String,
    pub date_range: Option<DateRangeHint>,
    #[serde(alias = "weekly", deserialize_with = "typed_weekly_rows")]
    pub weekly_summary: Vec<WeeklyRow>,
    #[serde(alias = "tiktok", deserialize_with = "null_as_empty")]
    pub tiktok_daily: Vec<TikTokDay>,
    #[serde(alias = "x", deserialize_with = "null_as_empty")]
    pub x_daily: Vec<XDay>,
    #[serde(alias = "youtube", deserialize_with = "null_as_empty")]
    pub youtube_videos: Vec<YouTubeVideo>,
    #[serde(alias = "meta_ads", deserialize_with = "null_as_empty")]
    pub meta_campaigns: Vec<Campaign>,
    #[serde(alias = "linkedin", deserialize_with = "null_as_empty")]
    pub linkedin_posts: Vec<LinkedInPost>,
    #[serde(deserialize_with = "null_as_empty")]
    pub linkedin_demographics: Vec<DemographicRow>,
    #[serde(deserialize_with = "null_as_empty")]
    pub customer_wins: Vec<CustomerWin>,
}

impl HistoricalReport {
    pub fn row_count(&self) -> usize {
        self.weekly_summary.len()
            + self.tiktok_daily.len()
            + self.x_daily.len()
            + self.youtube_videos.len()
            + self.meta_campaigns.len()
            + self.linkedin_posts.len()
            + self.linkedin_demographics.len()
            + self.customer_wins.len()
    }
}

#[derive(Debug, Deserialize)]
struct RawWeeklyRow {
    #[serde(default, alias = "week", alias = "week_start", deserialize_with = "lenient_text")]
    week_date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    platform: String,
    #[serde(default, alias = "metric_name", deserialize_with = "lenient_text")]
    metric: String,
    #[serde(default, deserialize_with = "lenient_number")]
    value: f64,
}

fn typed_weekly_rows<'de, D>(deserializer: D) -> Result<Vec<WeeklyRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<RawWeeklyRow>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|row| {
            let platform = Platform::parse(&row.platform);
            let metric = Metric::parse(&row.metric);

            match (platform, metric) {
                (Some(platform), Some(metric)) => Some(WeeklyRow {
                    week_date: row.week_date,
                    platform,
                    metric,
                    value: row.value,
                }),
                _ => {
                    debug!(
                        platform = %row.platform,
                        metric = %row.metric,
                        week = %row.week_date,
                        "skipping weekly row with unknown platform or metric"
                    );
                    None
                }
            }
        })
        .collect())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().replace(',', "").parse::<f64>().ok(),
        Some(Value::Bool(flag)) => Some(f64::from(u8::from(flag))),
        _ => None,
    };

    // "NaN" and "inf" parse as f64 but are not measurements.
    Ok(number.filter(|n| n.is_finite()).unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => {
            matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "1")
        }
        _ => false,
    })
}

fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}
