use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramMetric {
    pub name: String,
    pub value: u64,
    pub target: Option<u64>,
    pub color: String,
}

/// One slice of the registrant population. The last bucket of a partition is
/// the remainder and is never authored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsCampaign {
    pub name: String,
    pub delivered: u64,
    pub clicked: u64,
    /// Click-through percentage, one decimal. Derived from `clicked`/`delivered`.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub visitors: u64,
    pub sessions: u64,
    pub pageviews: u64,
    pub bounce_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadsSnapshot {
    pub downloads: u64,
    pub target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KpiStatus {
    Achieved,
    Behind,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl KpiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Achieved => "Achieved",
            Self::Behind => "Behind",
            Self::AtRisk => "At Risk",
        }
    }

    /// CSS-friendly slug, e.g. `at-risk`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Achieved => "achieved",
            Self::Behind => "behind",
            Self::AtRisk => "at-risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiProgress {
    pub name: String,
    pub current: u64,
    pub target: u64,
    pub percentage: u64,
    pub status: KpiStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekCount {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgesSnapshot {
    pub weeks: Vec<WeekCount>,
    /// Sum of `weeks`.
    pub total_claimed: u64,
    pub unique_users: u64,
    /// Weekly claim target.
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoriesSnapshot {
    pub submitted: u64,
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSnapshot {
    pub clicks_to_site: u64,
    pub unique_users_reached: u64,
    pub impressions_delivered: u64,
    /// Reactions + comments + shares + saves + page likes.
    pub direct_engagements: u64,
    pub video_views: u64,
    pub page_likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
    pub reactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastEpisode {
    pub week: u32,
    pub day: u32,
    pub title: String,
    pub plays: u64,
}

/// An audio series and its episodes, grouped by program week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastSeries {
    pub name: String,
    pub episodes: Vec<PodcastEpisode>,
}

/// Full snapshot of the dashboard, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub program_metrics: Vec<ProgramMetric>,
    pub age_buckets: Vec<AgeBucket>,
    pub sms_campaigns: Vec<SmsCampaign>,
    pub traffic: TrafficSnapshot,
    pub downloads: DownloadsSnapshot,
    pub social: SocialSnapshot,
    pub badges: BadgesSnapshot,
    pub stories: StoriesSnapshot,
    #[serde(default)]
    pub podcasts: Vec<PodcastSeries>,
    pub kpis: Vec<KpiProgress>,
    pub last_updated: DateTime<Utc>,
}

impl DashboardState {
    pub fn program_metric(&self, name: &str) -> Option<&ProgramMetric> {
        self.program_metrics.iter().find(|metric| metric.name == name)
    }

    pub fn program_value(&self, name: &str) -> u64 {
        self.program_metric(name).map(|metric| metric.value).unwrap_or(0)
    }

    pub fn age_bucket(&self, label: &str) -> Option<&AgeBucket> {
        self.age_buckets.iter().find(|bucket| bucket.label == label)
    }

    pub fn kpi(&self, name: &str) -> Option<&KpiProgress> {
        self.kpis.iter().find(|kpi| kpi.name == name)
    }

    pub fn sms_campaign(&self, name: &str) -> Option<&SmsCampaign> {
        self.sms_campaigns.iter().find(|campaign| campaign.name == name)
    }

    pub fn podcast(&self, name: &str) -> Option<&PodcastSeries> {
        self.podcasts.iter().find(|series| series.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: String,
    pub value: u64,
    pub percent_of_previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeShare {
    pub label: String,
    pub value: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastWeekSummary {
    pub week: u32,
    pub episodes: u64,
    pub total_plays: u64,
    pub average_plays: u64,
    pub most_played: Option<PodcastEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastSummary {
    pub name: String,
    pub total_plays: u64,
    pub total_episodes: u64,
    pub average_plays: u64,
    pub weeks: Vec<PodcastWeekSummary>,
    /// Highest play counts first, at most ten.
    pub top_episodes: Vec<PodcastEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub engagement_rate: f64,
    pub badge_target_share: f64,
    pub badge_user_share: f64,
    pub average_weekly_badges: u64,
    pub stories_achievement: f64,
    pub download_share: f64,
    pub age_shares: Vec<AgeShare>,
    pub podcasts: Vec<PodcastSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramUpdate {
    #[serde(default)]
    pub values: BTreeMap<String, u64>,
    #[serde(default)]
    pub targets: BTreeMap<String, Option<u64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KpiUpdate {
    #[serde(default)]
    pub targets: BTreeMap<String, u64>,
    #[serde(default)]
    pub current: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemographicsUpdate {
    #[serde(default)]
    pub buckets: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrafficUpdate {
    pub visitors: Option<u64>,
    pub sessions: Option<u64>,
    pub pageviews: Option<u64>,
    pub bounce_rate: Option<f64>,
    pub downloads: Option<u64>,
    pub downloads_target: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsUpdate {
    pub name: String,
    pub delivered: Option<u64>,
    pub clicked: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub clicked: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialUpdate {
    pub clicks_to_site: Option<u64>,
    pub unique_users_reached: Option<u64>,
    pub impressions_delivered: Option<u64>,
    pub video_views: Option<u64>,
    pub page_likes: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
    pub saves: Option<u64>,
    pub reactions: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngagementUpdate {
    #[serde(default)]
    pub badge_weeks: BTreeMap<String, u64>,
    pub unique_users: Option<u64>,
    pub badge_target: Option<u64>,
    pub stories_submitted: Option<u64>,
    pub stories_target: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodcastPlaysUpdate {
    pub series: String,
    pub week: u32,
    pub day: u32,
    pub plays: u64,
}
