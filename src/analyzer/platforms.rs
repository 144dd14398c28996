use crate::analyzer::change::{mean, pct_change, percentage, ratio};
use crate::analyzer::demographics::{self, Demographics};
use crate::analyzer::range::Window;
use crate::dataset::{
    Campaign, DemographicRow, LinkedInPost, Metric, Platform, TikTokDay, WeeklyRow, XDay,
    YouTubeVideo,
};
use serde::Serialize;

const TOP_VIDEOS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub reach_views: f64,
    pub reach_change: String,
    pub engagement_rate: f64,
    pub engagement_change: String,
    pub new_followers: f64,
    pub followers_change: String,
    pub client_inquiries: f64,
    pub new_clients: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossPlatformTotals {
    pub total_reach: f64,
    pub total_reach_change: String,
    pub total_followers: f64,
    pub total_followers_change: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedInSummary {
    pub impressions: f64,
    pub members_reached: f64,
    pub reactions: f64,
    pub comments: f64,
    pub saves: f64,
    pub followers_gained: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaAdsSummary {
    pub reach: f64,
    pub impressions: f64,
    pub results: f64,
    pub amount_spent: f64,
    pub cost_per_result: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossPlatform {
    pub youtube: PlatformSummary,
    pub instagram: PlatformSummary,
    pub tiktok: PlatformSummary,
    pub x: PlatformSummary,
    pub linkedin: LinkedInSummary,
    pub meta_ads: MetaAdsSummary,
    pub totals: CrossPlatformTotals,
}

#[derive(Debug, Default)]
struct MetricTotals {
    reach_views: f64,
    new_followers: f64,
    client_inquiries: f64,
    new_clients: f64,
    engagement_rates: Vec<f64>,
}

impl MetricTotals {
    fn collect(rows: &[WeeklyRow], platform: Platform, window: &Window) -> Self {
        rows.iter()
            .filter(|row| row.platform == platform && window.contains(&row.week_date))
            .fold(Self::default(), |mut acc, row| {
                match row.metric {
                    Metric::ReachViews => acc.reach_views += row.value,
                    Metric::NewFollowers => acc.new_followers += row.value,
                    Metric::ClientInquiries => acc.client_inquiries += row.value,
                    Metric::NewClients => acc.new_clients += row.value,
                    Metric::EngagementRate => acc.engagement_rates.push(row.value),
                }
                acc
            })
    }

    fn engagement_rate(&self) -> f64 {
        mean(self.engagement_rates.iter().copied())
    }
}

/// Weekly-summary comparison for the four tracked platforms plus their totals.
/// LinkedIn and Meta Ads summaries are left at their defaults for the caller
/// to fill from the detail reducers.
pub fn cross_platform(rows: &[WeeklyRow], current: &Window, previous: &Window) -> CrossPlatform {
    let per_platform = Platform::TRACKED.map(|platform| {
        (
            MetricTotals::collect(rows, platform, current),
            MetricTotals::collect(rows, platform, previous),
        )
    });

    let summaries = per_platform.each_ref().map(|(now, before)| PlatformSummary {
        reach_views: now.reach_views,
        reach_change: pct_change(before.reach_views, now.reach_views),
        engagement_rate: now.engagement_rate(),
        engagement_change: pct_change(before.engagement_rate(), now.engagement_rate()),
        new_followers: now.new_followers,
        followers_change: pct_change(before.new_followers, now.new_followers),
        client_inquiries: now.client_inquiries,
        new_clients: now.new_clients,
    });

    let total_reach = per_platform.iter().map(|(now, _)| now.reach_views).sum::<f64>();
    let previous_reach = per_platform.iter().map(|(_, before)| before.reach_views).sum::<f64>();
    let total_followers = per_platform.iter().map(|(now, _)| now.new_followers).sum::<f64>();
    let previous_followers = per_platform
        .iter()
        .map(|(_, before)| before.new_followers)
        .sum::<f64>();

    let [youtube, instagram, tiktok, x] = summaries;

    CrossPlatform {
        youtube,
        instagram,
        tiktok,
        x,
        linkedin: LinkedInSummary::default(),
        meta_ads: MetaAdsSummary::default(),
        totals: CrossPlatformTotals {
            total_reach,
            total_reach_change: pct_change(previous_reach, total_reach),
            total_followers,
            total_followers_change: pct_change(previous_followers, total_followers),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TikTokTotals {
    pub views: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub eng_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TikTokDetail {
    pub daily: Vec<TikTokDay>,
    pub totals: TikTokTotals,
}

pub fn tiktok_detail(days: &[TikTokDay], window: &Window) -> TikTokDetail {
    let daily = days
        .iter()
        .filter(|day| window.contains(&day.date))
        .cloned()
        .collect::<Vec<_>>();

    let mut totals = daily.iter().fold(TikTokTotals::default(), |mut acc, day| {
        acc.views += day.views;
        acc.likes += day.likes;
        acc.comments += day.comments;
        acc.shares += day.shares;
        acc
    });
    totals.eng_rate = percentage(totals.likes + totals.comments + totals.shares, totals.views);

    TikTokDetail { daily, totals }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XTotals {
    pub impressions: f64,
    pub engagements: f64,
    pub likes: f64,
    pub new_follows: f64,
    pub eng_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XDetail {
    pub daily: Vec<XDay>,
    pub totals: XTotals,
}

pub fn x_detail(days: &[XDay], window: &Window) -> XDetail {
    let daily = days
        .iter()
        .filter(|day| window.contains(&day.date))
        .cloned()
        .collect::<Vec<_>>();

    let mut totals = daily.iter().fold(XTotals::default(), |mut acc, day| {
        acc.impressions += day.impressions;
        acc.engagements += day.engagements;
        acc.likes += day.likes;
        acc.new_follows += day.new_follows;
        acc
    });
    totals.eng_rate = percentage(totals.engagements, totals.impressions);

    XDetail { daily, totals }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YouTubeTotals {
    pub views: f64,
    pub subscribers: f64,
    pub revenue: f64,
    pub avg_ctr: f64,
    pub video_count: usize,
    pub shorts_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YouTubeDetail {
    pub top_videos: Vec<YouTubeVideo>,
    pub totals: YouTubeTotals,
}

pub fn youtube_detail(videos: &[YouTubeVideo], window: &Window) -> YouTubeDetail {
    let mut selected = videos
        .iter()
        .filter(|video| window.contains(&video.week_start))
        .cloned()
        .collect::<Vec<_>>();

    let totals = YouTubeTotals {
        views: selected.iter().map(|video| video.views).sum(),
        subscribers: selected.iter().map(|video| video.subs).sum(),
        revenue: selected.iter().map(|video| video.revenue).sum(),
        avg_ctr: mean(selected.iter().map(|video| video.ctr)),
        video_count: selected.len(),
        shorts_count: selected.iter().filter(|video| video.is_short).count(),
    };

    // Stable sort: equal view counts keep their document order.
    selected.sort_by(|left, right| right.views.total_cmp(&left.views));
    selected.truncate(TOP_VIDEOS);

    YouTubeDetail {
        top_videos: selected,
        totals,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaTotals {
    pub reach: f64,
    pub impressions: f64,
    pub results: f64,
    pub spent: f64,
    pub avg_cpr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaDetail {
    pub campaigns: Vec<Campaign>,
    pub totals: MetaTotals,
}

impl MetaDetail {
    pub fn summary(&self) -> MetaAdsSummary {
        MetaAdsSummary {
            reach: self.totals.reach,
            impressions: self.totals.impressions,
            results: self.totals.results,
            amount_spent: self.totals.spent,
            cost_per_result: self.totals.avg_cpr,
        }
    }
}

pub fn meta_detail(campaigns: &[Campaign], window: &Window) -> MetaDetail {
    let campaigns = campaigns
        .iter()
        .filter(|campaign| window.contains(&campaign.start_date))
        .cloned()
        .collect::<Vec<_>>();

    let mut totals = campaigns.iter().fold(MetaTotals::default(), |mut acc, campaign| {
        acc.reach += campaign.reach;
        acc.impressions += campaign.impressions;
        acc.results += campaign.results;
        acc.spent += campaign.spent;
        acc
    });
    totals.avg_cpr = ratio(totals.spent, totals.results);

    MetaDetail { campaigns, totals }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedInTotals {
    pub impressions: f64,
    pub reached: f64,
    pub reactions: f64,
    pub comments: f64,
    pub saves: f64,
    pub followers: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedInDetail {
    pub posts: Vec<LinkedInPost>,
    pub demographics: Demographics,
    pub totals: LinkedInTotals,
}

impl LinkedInDetail {
    pub fn summary(&self) -> LinkedInSummary {
        LinkedInSummary {
            impressions: self.totals.impressions,
            members_reached: self.totals.reached,
            reactions: self.totals.reactions,
            comments: self.totals.comments,
            saves: self.totals.saves,
            followers_gained: self.totals.followers,
            post_count: self.totals.post_count,
        }
    }
}

pub fn linkedin_detail(
    posts: &[LinkedInPost],
    demographic_rows: &[DemographicRow],
    window: &Window,
) -> LinkedInDetail {
    let posts = posts
        .iter()
        .filter(|post| window.contains(&post.date))
        .cloned()
        .collect::<Vec<_>>();

    let mut totals = posts.iter().fold(LinkedInTotals::default(), |mut acc, post| {
        acc.impressions += post.impressions;
        acc.reached += post.reached;
        acc.reactions += post.reactions;
        acc.comments += post.comments;
        acc.saves += post.saves;
        acc.followers += post.followers;
        acc
    });
    totals.post_count = posts.len();

    let demographics = demographics::summarize(demographic_rows, &posts);

    LinkedInDetail {
        posts,
        demographics,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::{cross_platform, linkedin_detail, meta_detail, tiktok_detail, x_detail, youtube_detail};
    use crate::analyzer::range::{Window, parse_date};
    use crate::dataset::{Campaign, Metric, Platform, TikTokDay, WeeklyRow, XDay, YouTubeVideo};

    fn window(start: &str, end: &str) -> Window {
        Window::new(
            parse_date(start).expect("start"),
            parse_date(end).expect("end"),
        )
    }

    fn weekly(week: &str, platform: Platform, metric: Metric, value: f64) -> WeeklyRow {
        WeeklyRow {
            week_date: week.to_string(),
            platform,
            metric,
            value,
        }
    }

    #[test]
    fn cross_platform_sums_reach_and_averages_engagement() {
        let rows = vec![
            weekly("2026-10-04", Platform::Youtube, Metric::ReachViews, 100.0),
            weekly("2026-10-11", Platform::Youtube, Metric::ReachViews, 150.0),
            weekly("2026-10-11", Platform::Youtube, Metric::ReachViews, 50.0),
            weekly("2026-10-11", Platform::Youtube, Metric::EngagementRate, 2.0),
            weekly("2026-10-11", Platform::Youtube, Metric::EngagementRate, 6.0),
            weekly("2026-10-11", Platform::Youtube, Metric::NewFollowers, 10.0),
            weekly("2026-10-11", Platform::Instagram, Metric::ReachViews, 40.0),
            weekly("2026-10-11", Platform::Instagram, Metric::ClientInquiries, 3.0),
            weekly("2026-10-11", Platform::Linkedin, Metric::ReachViews, 999.0),
        ];

        let summary = cross_platform(
            &rows,
            &window("2026-10-11", "2026-10-17"),
            &window("2026-10-04", "2026-10-10"),
        );

        assert_eq!(summary.youtube.reach_views, 200.0);
        assert_eq!(summary.youtube.reach_change, "+100.0%");
        assert_eq!(summary.youtube.engagement_rate, 4.0);
        assert_eq!(summary.youtube.engagement_change, "+inf%");
        assert_eq!(summary.youtube.followers_change, "+inf%");
        assert_eq!(summary.instagram.client_inquiries, 3.0);
        assert_eq!(summary.tiktok.reach_views, 0.0);
        assert_eq!(summary.tiktok.reach_change, "0%");
        assert_eq!(summary.totals.total_reach, 240.0);
        assert_eq!(summary.totals.total_reach_change, "+140.0%");
        assert_eq!(summary.totals.total_followers, 10.0);
    }

    #[test]
    fn tiktok_and_x_engagement_rates_are_guarded() {
        let current = window("2026-10-11", "2026-10-17");

        let empty_tiktok = tiktok_detail(&[], &current);
        assert_eq!(empty_tiktok.totals.eng_rate, 0.0);
        assert!(empty_tiktok.daily.is_empty());

        let days = vec![
            TikTokDay {
                date: "2026-10-11".to_string(),
                views: 1000.0,
                likes: 50.0,
                comments: 20.0,
                shares: 30.0,
            },
            TikTokDay {
                date: "2026-10-18".to_string(),
                views: 5000.0,
                ..TikTokDay::default()
            },
        ];
        let detail = tiktok_detail(&days, &current);
        assert_eq!(detail.daily.len(), 1);
        assert_eq!(detail.totals.eng_rate, 10.0);

        let x_days = vec![XDay {
            date: "2026-10-17".to_string(),
            impressions: 0.0,
            engagements: 12.0,
            ..XDay::default()
        }];
        let x = x_detail(&x_days, &current);
        assert_eq!(x.totals.engagements, 12.0);
        assert_eq!(x.totals.eng_rate, 0.0);
    }

    #[test]
    fn youtube_keeps_ten_highest_viewed_videos() {
        let videos = (0..15)
            .map(|index| YouTubeVideo {
                id: format!("v{index}"),
                week_start: "2026-10-11".to_string(),
                views: f64::from((index * 7) % 15) * 100.0,
                ctr: 4.0,
                is_short: index % 3 == 0,
                ..YouTubeVideo::default()
            })
            .collect::<Vec<_>>();

        let detail = youtube_detail(&videos, &window("2026-10-11", "2026-10-17"));
        let views = detail.top_videos.iter().map(|video| video.views).collect::<Vec<_>>();

        assert_eq!(detail.top_videos.len(), 10);
        assert_eq!(
            views,
            vec![1400.0, 1300.0, 1200.0, 1100.0, 1000.0, 900.0, 800.0, 700.0, 600.0, 500.0]
        );
        assert_eq!(detail.totals.video_count, 15);
        assert_eq!(detail.totals.shorts_count, 5);
        assert_eq!(detail.totals.avg_ctr, 4.0);
    }

    #[test]
    fn youtube_ties_keep_document_order_and_ctr_is_unweighted() {
        let videos = vec![
            YouTubeVideo {
                id: "first".to_string(),
                week_start: "2026-10-11".to_string(),
                views: 10.0,
                ctr: 2.0,
                ..YouTubeVideo::default()
            },
            YouTubeVideo {
                id: "second".to_string(),
                week_start: "2026-10-11".to_string(),
                views: 10_000.0,
                ctr: 8.0,
                ..YouTubeVideo::default()
            },
            YouTubeVideo {
                id: "third".to_string(),
                week_start: "2026-10-12".to_string(),
                views: 10.0,
                ctr: 5.0,
                ..YouTubeVideo::default()
            },
        ];

        let detail = youtube_detail(&videos, &window("2026-10-11", "2026-10-17"));
        let ids = detail.top_videos.iter().map(|video| video.id.as_str()).collect::<Vec<_>>();

        assert_eq!(ids, vec!["second", "first", "third"]);
        assert_eq!(detail.totals.avg_ctr, 5.0);

        let empty = youtube_detail(&[], &window("2026-10-11", "2026-10-17"));
        assert_eq!(empty.totals.avg_ctr, 0.0);
    }

    #[test]
    fn meta_cost_per_result_is_zero_without_results() {
        let campaigns = vec![
            Campaign {
                name: "Awareness".to_string(),
                start_date: "2026-10-12".to_string(),
                reach: 800.0,
                spent: 40.0,
                results: 0.0,
                ..Campaign::default()
            },
            Campaign {
                name: "Old".to_string(),
                start_date: "2026-09-01".to_string(),
                results: 100.0,
                spent: 100.0,
                ..Campaign::default()
            },
        ];

        let detail = meta_detail(&campaigns, &window("2026-10-11", "2026-10-17"));

        assert_eq!(detail.campaigns.len(), 1);
        assert_eq!(detail.totals.spent, 40.0);
        assert_eq!(detail.totals.avg_cpr, 0.0);
        assert_eq!(detail.summary().amount_spent, 40.0);
    }

    #[test]
    fn linkedin_detail_counts_posts_in_window() {
        let detail = linkedin_detail(&[], &[], &window("2026-10-11", "2026-10-17"));

        assert_eq!(detail.totals.post_count, 0);
        assert!(detail.demographics.industry.is_empty());
        assert_eq!(detail.summary().impressions, 0.0);
    }
}
