use crate::analyzer::change::{ChangeTone, change_tone};
use crate::analyzer::demographics::{CATEGORIES, DemographicShare};
use crate::analyzer::platforms::{
    self, CrossPlatform, LinkedInDetail, MetaDetail, PlatformSummary, TikTokDetail, XDetail,
    YouTubeDetail,
};
use crate::analyzer::range::ResolvedRange;
use crate::analyzer::trends::{self, HistoricalTrends};
use crate::dataset::{CustomerWin, HistoricalReport, Platform};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start: String,
    pub end: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedReport {
    pub generated_at: String,
    pub time_frame: String,
    pub period: Period,
    pub previous_period: PreviousPeriod,
    pub cross_platform: CrossPlatform,
    pub youtube_detail: YouTubeDetail,
    pub tiktok_detail: TikTokDetail,
    pub x_detail: XDetail,
    pub linkedin_detail: LinkedInDetail,
    pub meta_detail: MetaDetail,
    pub customer_wins: Vec<CustomerWin>,
    pub historical_trends: HistoricalTrends,
}

#[derive(Debug)]
pub struct SavedReport {
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

/// Recomputes the full summary for one resolved range. Deterministic: the
/// output depends only on `raw` and `range`.
pub fn build_aggregated_report(raw: &HistoricalReport, range: &ResolvedRange) -> AggregatedReport {
    let current = &range.current;

    let mut cross_platform = platforms::cross_platform(&raw.weekly_summary, current, &range.previous);
    let youtube_detail = platforms::youtube_detail(&raw.youtube_videos, current);
    let tiktok_detail = platforms::tiktok_detail(&raw.tiktok_daily, current);
    let x_detail = platforms::x_detail(&raw.x_daily, current);
    let linkedin_detail =
        platforms::linkedin_detail(&raw.linkedin_posts, &raw.linkedin_demographics, current);
    let meta_detail = platforms::meta_detail(&raw.meta_campaigns, current);

    cross_platform.linkedin = linkedin_detail.summary();
    cross_platform.meta_ads = meta_detail.summary();

    let customer_wins = raw
        .customer_wins
        .iter()
        .filter(|win| current.contains(&win.date))
        .cloned()
        .collect::<Vec<_>>();

    AggregatedReport {
        generated_at: raw.generated_at.clone(),
        time_frame: range.frame.as_str().to_string(),
        period: Period {
            start: current.start.clone(),
            end: current.end.clone(),
            label: range.label(),
        },
        previous_period: PreviousPeriod {
            start: range.previous.start.clone(),
            end: range.previous.end.clone(),
        },
        cross_platform,
        youtube_detail,
        tiktok_detail,
        x_detail,
        linkedin_detail,
        meta_detail,
        customer_wins,
        historical_trends: trends::build(&raw.weekly_summary),
    }
}

pub fn render_markdown(report: &AggregatedReport) -> String {
    let cross = &report.cross_platform;
    let platform_rows = [
        (Platform::Youtube, &cross.youtube),
        (Platform::Instagram, &cross.instagram),
        (Platform::Tiktok, &cross.tiktok),
        (Platform::X, &cross.x),
    ]
    .iter()
    .map(|(platform, summary)| platform_row(platform.display_name(), summary))
    .collect::<Vec<_>>()
    .join("\n");

    let video_rows = if report.youtube_detail.top_videos.is_empty() {
        "- No data".to_string()
    } else {
        report
            .youtube_detail
            .top_videos
            .iter()
            .enumerate()
            .map(|(index, video)| {
                let kind = if video.is_short { " (Short)" } else { "" };
                format!(
                    "{}. {}{} - {} views, CTR {}",
                    index + 1,
                    video.title,
                    kind,
                    format_number(video.views),
                    format_percent(video.ctr)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let demographic_sections = CATEGORIES
        .iter()
        .map(|category| {
            format!(
                "### {}\n{}",
                category_title(category),
                list_shares(report.linkedin_detail.demographics.category(category))
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let win_rows = if report.customer_wins.is_empty() {
        "- No customer wins in this period".to_string()
    } else {
        report
            .customer_wins
            .iter()
            .map(|win| {
                format!(
                    "- {} {} via {}: {} ({}, {})",
                    win.date, win.customer, win.platform, win.content, win.value, win.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let tiktok = &report.tiktok_detail.totals;
    let x = &report.x_detail.totals;
    let youtube = &report.youtube_detail.totals;
    let meta = &report.meta_detail.totals;
    let linkedin = &report.linkedin_detail.totals;

    format!(
        "# Social Media Performance - {}\n\nComparison period: {} to {}\n\n## Summary\n- Total reach: {} ({})\n- New followers: {} ({})\n- Meta Ads reach: {} ({} spent)\n- LinkedIn impressions: {} ({} posts)\n\n## Cross-Platform\n| Platform | Reach/Views | Change | Engagement | New Followers |\n|----------|-------------|--------|------------|---------------|\n{}\n\n## YouTube\n- Views: {}, subscribers: {}, revenue: {}\n- Average CTR: {} across {} videos ({} shorts)\n\n### Top Videos (10)\n{}\n\n## TikTok\n- Views: {}, likes: {}, comments: {}, shares: {}\n- Engagement rate: {}\n\n## X\n- Impressions: {}, engagements: {}, likes: {}, new follows: {}\n- Engagement rate: {}\n\n## LinkedIn\n- Impressions: {}, reached: {}, reactions: {}, comments: {}, saves: {}\n- Followers gained: {}\n\n{}\n\n## Meta Ads\n- Reach: {}, impressions: {}, results: {}\n- Spent: {}, average cost per result: {}\n\n## Customer Wins\n{}\n",
        report.period.label,
        report.previous_period.start,
        report.previous_period.end,
        format_number(cross.totals.total_reach),
        annotate_change(&cross.totals.total_reach_change),
        format_number(cross.totals.total_followers),
        annotate_change(&cross.totals.total_followers_change),
        format_number(cross.meta_ads.reach),
        format_currency(cross.meta_ads.amount_spent),
        format_number(cross.linkedin.impressions),
        cross.linkedin.post_count,
        platform_rows,
        format_number(youtube.views),
        format_number(youtube.subscribers),
        format_currency(youtube.revenue),
        format_percent(youtube.avg_ctr),
        youtube.video_count,
        youtube.shorts_count,
        video_rows,
        format_number(tiktok.views),
        format_number(tiktok.likes),
        format_number(tiktok.comments),
        format_number(tiktok.shares),
        format_percent(tiktok.eng_rate),
        format_number(x.impressions),
        format_number(x.engagements),
        format_number(x.likes),
        format_number(x.new_follows),
        format_percent(x.eng_rate),
        format_number(linkedin.impressions),
        format_number(linkedin.reached),
        format_number(linkedin.reactions),
        format_number(linkedin.comments),
        format_number(linkedin.saves),
        format_number(linkedin.followers),
        demographic_sections,
        format_number(meta.reach),
        format_number(meta.impressions),
        format_number(meta.results),
        format_currency(meta.spent),
        format_currency(meta.avg_cpr),
        win_rows
    )
}

pub fn save_report_files(report: &AggregatedReport, report_dir: &Path) -> Result<SavedReport> {
    fs::create_dir_all(report_dir).with_context(|| {
        format!(
            "Failed to create report directory: {}",
            report_dir.display()
        )
    })?;

    let stem = format!("{}_{}", report.period.start, report.time_frame);
    let markdown_path = report_dir.join(format!("{stem}.md"));
    let json_path = report_dir.join(format!("{stem}.json"));

    fs::write(&markdown_path, render_markdown(report)).with_context(|| {
        format!(
            "Failed to write Markdown summary: {}",
            markdown_path.display()
        )
    })?;

    let json_content =
        serde_json::to_string_pretty(report).context("Failed to serialize summary JSON")?;
    fs::write(&json_path, json_content)
        .with_context(|| format!("Failed to write JSON summary: {}", json_path.display()))?;

    Ok(SavedReport {
        markdown_path,
        json_path,
    })
}

fn platform_row(name: &str, summary: &PlatformSummary) -> String {
    format!(
        "| {} | {} | {} | {} | {} |",
        name,
        format_number(summary.reach_views),
        annotate_change(&summary.reach_change),
        format_percent(summary.engagement_rate),
        format_number(summary.new_followers)
    )
}

fn annotate_change(change: &str) -> String {
    match change_tone(change) {
        ChangeTone::Positive => format!("▲ {change}"),
        ChangeTone::Negative => format!("▼ {change}"),
        ChangeTone::Neutral => change.to_string(),
    }
}

fn list_shares(shares: &[DemographicShare]) -> String {
    if shares.is_empty() {
        return "- No data".to_string();
    }

    shares
        .iter()
        .enumerate()
        .map(|(index, share)| format!("{}. {} - {}", index + 1, share.name, format_percent(share.pct)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn category_title(category: &str) -> &'static str {
    match category {
        "industry" => "Industry",
        "seniority" => "Seniority",
        "company_size" => "Company Size",
        "location" => "Location",
        _ => "Other",
    }
}

pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_currency(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${value:.2}")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}
