use crate::models::{
    AgeShare, BadgesSnapshot, DashboardState, DashboardSummary, FunnelStage, KpiProgress,
    KpiStatus, PodcastEpisode, PodcastSeries, PodcastSummary, PodcastWeekSummary, SmsCampaign,
};

pub const REGISTRANTS: &str = "Registrants";
pub const COMPLETED_WEEK_0: &str = "Completed Week 0";
pub const YOUNG_ADULT_BUCKET: &str = "18-25";
pub const ENROLLMENT_KPI: &str = "Enrollment";
/// How many episodes a series summary lists as its top performers.
pub const TOP_EPISODE_COUNT: usize = 10;

/// Percentage at or above which a KPI counts as achieved.
pub const ACHIEVED_THRESHOLD: u64 = 100;
/// Percentage at or above which an unfinished KPI is merely behind rather than at risk.
pub const BEHIND_THRESHOLD: u64 = 25;

/// KPIs whose `current` mirrors a primary metric elsewhere in the snapshot.
pub const LINKED_KPIS: [&str; 7] = [
    "Enrollment",
    "18-25 Enrollment",
    "Week 0 Completion",
    "Average Weekly Badges",
    "Site Traffic",
    "Downloads",
    "Stories Submitted",
];

pub fn is_linked_kpi(name: &str) -> bool {
    LINKED_KPIS.contains(&name)
}

/// Counter total that pins at `u64::MAX` instead of overflowing.
pub fn saturating_total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

/// Rounded completion percentage. A zero target has nothing left to achieve.
pub fn kpi_percentage(current: u64, target: u64) -> u64 {
    if target == 0 {
        return ACHIEVED_THRESHOLD;
    }
    (current as f64 / target as f64 * 100.0).round() as u64
}

pub fn kpi_status(percentage: u64) -> KpiStatus {
    if percentage >= ACHIEVED_THRESHOLD {
        KpiStatus::Achieved
    } else if percentage >= BEHIND_THRESHOLD {
        KpiStatus::Behind
    } else {
        KpiStatus::AtRisk
    }
}

fn refresh_kpi(kpi: &mut KpiProgress) {
    kpi.percentage = kpi_percentage(kpi.current, kpi.target);
    kpi.status = kpi_status(kpi.percentage);
}

/// Recomputes percentage and status for one KPI. Returns `false` if no KPI has that name.
pub fn recompute_kpi(state: &mut DashboardState, kpi_name: &str) -> bool {
    match state.kpis.iter_mut().find(|kpi| kpi.name == kpi_name) {
        Some(kpi) => {
            refresh_kpi(kpi);
            true
        }
        None => false,
    }
}

/// Click-through rate in percent, one decimal place.
pub fn sms_rate(clicked: u64, delivered: u64) -> f64 {
    if delivered == 0 {
        return 0.0;
    }
    (clicked as f64 / delivered as f64 * 1000.0).round() / 10.0
}

pub fn recompute_sms_rate(campaign: &mut SmsCampaign) {
    campaign.rate = sms_rate(campaign.clicked, campaign.delivered);
}

pub fn average_weekly_badges(badges: &BadgesSnapshot) -> u64 {
    if badges.weeks.is_empty() {
        return 0;
    }
    badges.total_claimed / badges.weeks.len() as u64
}

/// Value a linked KPI tracks, or `None` for free-standing KPIs.
pub fn linked_current(state: &DashboardState, kpi_name: &str) -> Option<u64> {
    let value = match kpi_name {
        ENROLLMENT_KPI => state.program_value(REGISTRANTS),
        "18-25 Enrollment" => state
            .age_bucket(YOUNG_ADULT_BUCKET)
            .map(|bucket| bucket.value)
            .unwrap_or(0),
        "Week 0 Completion" => state.program_value(COMPLETED_WEEK_0),
        "Average Weekly Badges" => average_weekly_badges(&state.badges),
        "Site Traffic" => state.traffic.visitors,
        "Downloads" => state.downloads.downloads,
        "Stories Submitted" => state.stories.submitted,
        _ => return None,
    };
    Some(value)
}

/// Sets the remainder bucket to whatever part of the registrant population
/// the authored buckets leave uncovered.
pub fn recompute_age_remainder(state: &mut DashboardState) {
    let registrants = state.program_value(REGISTRANTS);
    if let Some((remainder, authored)) = state.age_buckets.split_last_mut() {
        let covered = saturating_total(authored.iter().map(|bucket| bucket.value));
        remainder.value = registrants.saturating_sub(covered);
    }
}

/// Restores every derived field from the primaries. Idempotent.
pub fn recompute_all(mut state: DashboardState) -> DashboardState {
    recompute_age_remainder(&mut state);

    for campaign in state.sms_campaigns.iter_mut() {
        recompute_sms_rate(campaign);
    }

    state.badges.total_claimed =
        saturating_total(state.badges.weeks.iter().map(|week| week.value));

    let social = &mut state.social;
    social.direct_engagements = saturating_total([
        social.reactions,
        social.comments,
        social.shares,
        social.saves,
        social.page_likes,
    ]);

    let enrollment_target = state.program_metric(REGISTRANTS).and_then(|metric| metric.target);

    let linked: Vec<Option<u64>> = state
        .kpis
        .iter()
        .map(|kpi| linked_current(&state, &kpi.name))
        .collect();
    for (kpi, current) in state.kpis.iter_mut().zip(linked) {
        if let Some(current) = current {
            kpi.current = current;
        }
        if kpi.name == ENROLLMENT_KPI {
            if let Some(target) = enrollment_target {
                kpi.target = target;
            }
        }
        refresh_kpi(kpi);
    }

    state
}

/// Ratio in percent with a `0` sentinel for an empty denominator.
pub fn percent_of(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Acquisition funnel from ad impressions down to week-0 completions.
pub fn derive_funnel(state: &DashboardState) -> Vec<FunnelStage> {
    funnel_from_values(&[
        ("Impressions (Ads)", state.social.impressions_delivered),
        ("Visitors", state.traffic.visitors),
        ("Registrants", state.program_value(REGISTRANTS)),
        ("Downloads", state.downloads.downloads),
        ("Week 0 Complete", state.program_value(COMPLETED_WEEK_0)),
    ])
}

/// Each stage relative to the one before it; the first stage is 100% of itself.
/// Later stages may exceed 100.
pub fn funnel_from_values(stages: &[(&str, u64)]) -> Vec<FunnelStage> {
    let mut funnel = Vec::with_capacity(stages.len());
    let mut previous: Option<u64> = None;
    for &(stage, value) in stages {
        let percent_of_previous = match previous {
            None => 100.0,
            Some(prev) => percent_of(value, prev),
        };
        funnel.push(FunnelStage {
            stage: stage.to_string(),
            value,
            percent_of_previous,
        });
        previous = Some(value);
    }
    funnel
}

pub fn summarize(state: &DashboardState) -> DashboardSummary {
    let badges = &state.badges;
    let weekly_target_total = badges.target.saturating_mul(badges.weeks.len() as u64);
    let population = saturating_total(state.age_buckets.iter().map(|bucket| bucket.value));

    DashboardSummary {
        engagement_rate: round1(percent_of(
            state.social.direct_engagements,
            state.social.impressions_delivered,
        )),
        badge_target_share: round1(percent_of(badges.total_claimed, weekly_target_total)),
        badge_user_share: round1(percent_of(
            badges.unique_users,
            state.program_value(REGISTRANTS),
        )),
        average_weekly_badges: average_weekly_badges(badges),
        stories_achievement: percent_of(state.stories.submitted, state.stories.target).round(),
        download_share: round1(percent_of(state.downloads.downloads, state.downloads.target)),
        age_shares: state
            .age_buckets
            .iter()
            .map(|bucket| AgeShare {
                label: bucket.label.clone(),
                value: bucket.value,
                percent: round1(percent_of(bucket.value, population)),
            })
            .collect(),
        podcasts: state.podcasts.iter().map(summarize_podcast).collect(),
    }
}

fn average_plays(total: u64, episodes: usize) -> u64 {
    if episodes == 0 {
        return 0;
    }
    total / episodes as u64
}

/// First episode with the highest play count.
fn most_played<'a>(
    episodes: impl IntoIterator<Item = &'a PodcastEpisode>,
) -> Option<&'a PodcastEpisode> {
    episodes
        .into_iter()
        .fold(None::<&'a PodcastEpisode>, |best, episode| match best {
            Some(current) if current.plays >= episode.plays => Some(current),
            _ => Some(episode),
        })
}

/// Totals, per-week breakdown and top episodes for one series.
pub fn summarize_podcast(series: &PodcastSeries) -> PodcastSummary {
    let total_plays = saturating_total(series.episodes.iter().map(|episode| episode.plays));

    let mut week_numbers: Vec<u32> = series.episodes.iter().map(|episode| episode.week).collect();
    week_numbers.sort_unstable();
    week_numbers.dedup();

    let weeks = week_numbers
        .into_iter()
        .map(|week| {
            let mut in_week: Vec<&PodcastEpisode> = series
                .episodes
                .iter()
                .filter(|episode| episode.week == week)
                .collect();
            in_week.sort_by_key(|episode| episode.day);
            let week_total = saturating_total(in_week.iter().map(|episode| episode.plays));
            PodcastWeekSummary {
                week,
                episodes: in_week.len() as u64,
                total_plays: week_total,
                average_plays: average_plays(week_total, in_week.len()),
                most_played: most_played(in_week.iter().copied()).cloned(),
            }
        })
        .collect();

    let mut top_episodes = series.episodes.clone();
    top_episodes.sort_by(|a, b| b.plays.cmp(&a.plays));
    top_episodes.truncate(TOP_EPISODE_COUNT);

    PodcastSummary {
        name: series.name.clone(),
        total_plays,
        total_episodes: series.episodes.len() as u64,
        average_plays: average_plays(total_plays, series.episodes.len()),
        weeks,
        top_episodes,
    }
}
