use crate::models::{
    AgeBucket, BadgesSnapshot, DashboardState, DownloadsSnapshot, KpiProgress, KpiStatus,
    PodcastEpisode, PodcastSeries, ProgramMetric, SmsCampaign, SocialSnapshot, StoriesSnapshot,
    TrafficSnapshot, WeekCount,
};
use chrono::{DateTime, Utc};

/// 2025-04-25T00:00:00Z, the date the built-in figures were collected.
const DEFAULT_SNAPSHOT_TIMESTAMP: i64 = 1_745_539_200;

/// Built-in snapshot used whenever no readable state file exists.
/// Derived fields are already consistent with their primaries.
pub fn default_state() -> DashboardState {
    DashboardState {
        program_metrics: vec![
            program("Registrants", 10_595, Some(10_000), "#8884d8"),
            program("Contacts", 4_808, None, "#82ca9d"),
            program("NEW Contacts", 4_808, None, "#ffc658"),
            program("Completed Week 0", 3_089, None, "#ff8042"),
        ],
        age_buckets: vec![
            AgeBucket {
                label: "18-25".to_string(),
                value: 98,
            },
            AgeBucket {
                label: "Other Ages".to_string(),
                value: 10_497,
            },
        ],
        sms_campaigns: vec![
            SmsCampaign {
                name: "Week 1 Reminder".to_string(),
                delivered: 82_337,
                clicked: 7_285,
                rate: 8.8,
            },
            SmsCampaign {
                name: "Technical Issue".to_string(),
                delivered: 82_144,
                clicked: 8_152,
                rate: 9.9,
            },
        ],
        traffic: TrafficSnapshot {
            visitors: 29_500,
            sessions: 55_100,
            pageviews: 101_200,
            bounce_rate: 30.3,
        },
        downloads: DownloadsSnapshot {
            downloads: 22_186,
            target: 100_000,
        },
        social: SocialSnapshot {
            clicks_to_site: 39_000,
            unique_users_reached: 101_900,
            impressions_delivered: 338_000,
            direct_engagements: 3_624,
            video_views: 70_700,
            page_likes: 67,
            comments: 74,
            shares: 217,
            saves: 66,
            reactions: 3_200,
        },
        badges: BadgesSnapshot {
            weeks: vec![week("Week 0", 3_089), week("Week 1", 2_061), week("Week 2", 2_197)],
            total_claimed: 7_347,
            unique_users: 4_788,
            target: 5_000,
        },
        stories: StoriesSnapshot {
            submitted: 234,
            target: 100,
        },
        podcasts: vec![
            PodcastSeries {
                name: "Self-Care School Podcast".to_string(),
                episodes: vec![
                    episode(0, 1, "Welcome to Self-Care School", 3_120),
                    episode(0, 2, "Setting Your Intentions", 2_145),
                    episode(0, 3, "Building a Routine", 1_692),
                    episode(1, 1, "Rest and Recovery", 2_410),
                    episode(1, 2, "Mindful Mornings", 1_702),
                    episode(1, 3, "Boundaries at Work", 1_388),
                    episode(2, 1, "Nourishing Your Body", 1_985),
                    episode(2, 2, "Movement as Medicine", 1_320),
                    episode(2, 3, "Digital Detox", 1_095),
                    episode(3, 1, "Community Care", 520),
                    episode(3, 2, "Reflecting on Growth", 380),
                    episode(3, 3, "Carrying It Forward", 290),
                ],
            },
            PodcastSeries {
                name: "Black History Bootcamp".to_string(),
                episodes: vec![
                    episode(1, 1, "Self-Care as Resistance", 1_840),
                    episode(1, 2, "Healing Traditions", 1_215),
                    episode(2, 1, "Voices of the Movement", 1_460),
                    episode(2, 2, "Joy as Practice", 985),
                ],
            },
        ],
        kpis: vec![
            kpi("Enrollment", 10_595, 10_000, 106, KpiStatus::Achieved),
            kpi("18-25 Enrollment", 98, 5_000, 2, KpiStatus::AtRisk),
            kpi("Week 0 Completion", 3_089, 10_000, 31, KpiStatus::Behind),
            kpi("Average Weekly Badges", 2_449, 5_000, 49, KpiStatus::Behind),
            kpi("Site Traffic", 29_500, 250_000, 12, KpiStatus::AtRisk),
            kpi("Downloads", 22_186, 100_000, 22, KpiStatus::AtRisk),
            kpi("Stories Submitted", 234, 100, 234, KpiStatus::Achieved),
        ],
        last_updated: DateTime::<Utc>::from_timestamp(DEFAULT_SNAPSHOT_TIMESTAMP, 0)
            .unwrap_or_default(),
    }
}

fn program(name: &str, value: u64, target: Option<u64>, color: &str) -> ProgramMetric {
    ProgramMetric {
        name: name.to_string(),
        value,
        target,
        color: color.to_string(),
    }
}

fn week(label: &str, value: u64) -> WeekCount {
    WeekCount {
        label: label.to_string(),
        value,
    }
}

fn episode(week: u32, day: u32, title: &str, plays: u64) -> PodcastEpisode {
    PodcastEpisode {
        week,
        day,
        title: title.to_string(),
        plays,
    }
}

fn kpi(name: &str, current: u64, target: u64, percentage: u64, status: KpiStatus) -> KpiProgress {
    KpiProgress {
        name: name.to_string(),
        current,
        target,
        percentage,
        status,
    }
}
