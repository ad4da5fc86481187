//! One pure update per form category. Each takes the current snapshot by value,
//! applies the request, and hands back a fully recomputed snapshot. On error the
//! partially edited copy is dropped, so callers keep their original untouched.

use crate::errors::UpdateError;
use crate::metrics::{
    is_linked_kpi, recompute_all, saturating_total, ENROLLMENT_KPI, REGISTRANTS,
};
use crate::models::{
    DashboardState, DemographicsUpdate, EngagementUpdate, KpiProgress, KpiUpdate,
    NewCampaignRequest, PodcastPlaysUpdate, ProgramMetric, ProgramUpdate, SmsCampaign, SmsUpdate,
    SocialUpdate, TrafficUpdate,
};

pub fn apply_program_update(
    mut state: DashboardState,
    update: &ProgramUpdate,
) -> Result<DashboardState, UpdateError> {
    for (name, value) in &update.values {
        program_metric_mut(&mut state, name)?.value = *value;
    }
    for (name, target) in &update.targets {
        program_metric_mut(&mut state, name)?.target = *target;
    }
    check_population(&state)?;
    Ok(recompute_all(state))
}

pub fn apply_kpi_targets(
    mut state: DashboardState,
    update: &KpiUpdate,
) -> Result<DashboardState, UpdateError> {
    for (name, target) in &update.targets {
        kpi_mut(&mut state, name)?.target = *target;
        if name == ENROLLMENT_KPI {
            program_metric_mut(&mut state, REGISTRANTS)?.target = Some(*target);
        }
    }
    for (name, current) in &update.current {
        if is_linked_kpi(name) {
            return Err(UpdateError::DerivedField {
                field: name.clone(),
            });
        }
        kpi_mut(&mut state, name)?.current = *current;
    }
    Ok(recompute_all(state))
}

pub fn apply_demographics(
    mut state: DashboardState,
    update: &DemographicsUpdate,
) -> Result<DashboardState, UpdateError> {
    let remainder = state.age_buckets.last().map(|bucket| bucket.label.clone());
    for (label, value) in &update.buckets {
        if remainder.as_deref() == Some(label.as_str()) {
            return Err(UpdateError::DerivedField {
                field: label.clone(),
            });
        }
        let bucket = state
            .age_buckets
            .iter_mut()
            .find(|bucket| &bucket.label == label)
            .ok_or_else(|| UpdateError::UnknownField {
                group: "age bucket",
                name: label.clone(),
            })?;
        bucket.value = *value;
    }
    check_population(&state)?;
    Ok(recompute_all(state))
}

pub fn apply_traffic(
    mut state: DashboardState,
    update: &TrafficUpdate,
) -> Result<DashboardState, UpdateError> {
    let traffic = &mut state.traffic;
    set_if_some(&mut traffic.visitors, update.visitors);
    set_if_some(&mut traffic.sessions, update.sessions);
    set_if_some(&mut traffic.pageviews, update.pageviews);
    if let Some(bounce_rate) = update.bounce_rate {
        check_bounce_rate(bounce_rate)?;
        traffic.bounce_rate = bounce_rate;
    }
    set_if_some(&mut state.downloads.downloads, update.downloads);
    set_if_some(&mut state.downloads.target, update.downloads_target);
    Ok(recompute_all(state))
}

pub fn apply_sms_update(
    mut state: DashboardState,
    update: &SmsUpdate,
) -> Result<DashboardState, UpdateError> {
    let name = update.name.trim();
    let campaign = state
        .sms_campaigns
        .iter_mut()
        .find(|campaign| campaign.name == name)
        .ok_or_else(|| UpdateError::UnknownCampaign(name.to_string()))?;
    set_if_some(&mut campaign.delivered, update.delivered);
    set_if_some(&mut campaign.clicked, update.clicked);
    check_clicks(campaign.clicked, campaign.delivered)?;
    Ok(recompute_all(state))
}

/// Inserts a new campaign keyed by its trimmed name.
pub fn add_sms_campaign(
    mut state: DashboardState,
    request: &NewCampaignRequest,
) -> Result<DashboardState, UpdateError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(UpdateError::EmptyName);
    }
    if state.sms_campaign(name).is_some() {
        return Err(UpdateError::DuplicateCampaign(name.to_string()));
    }
    check_clicks(request.clicked, request.delivered)?;

    state.sms_campaigns.push(SmsCampaign {
        name: name.to_string(),
        delivered: request.delivered,
        clicked: request.clicked,
        rate: 0.0,
    });
    Ok(recompute_all(state))
}

pub fn apply_social(
    mut state: DashboardState,
    update: &SocialUpdate,
) -> Result<DashboardState, UpdateError> {
    let social = &mut state.social;
    set_if_some(&mut social.clicks_to_site, update.clicks_to_site);
    set_if_some(&mut social.unique_users_reached, update.unique_users_reached);
    set_if_some(&mut social.impressions_delivered, update.impressions_delivered);
    set_if_some(&mut social.video_views, update.video_views);
    set_if_some(&mut social.page_likes, update.page_likes);
    set_if_some(&mut social.comments, update.comments);
    set_if_some(&mut social.shares, update.shares);
    set_if_some(&mut social.saves, update.saves);
    set_if_some(&mut social.reactions, update.reactions);
    Ok(recompute_all(state))
}

pub fn apply_engagement(
    mut state: DashboardState,
    update: &EngagementUpdate,
) -> Result<DashboardState, UpdateError> {
    for (label, value) in &update.badge_weeks {
        let week = state
            .badges
            .weeks
            .iter_mut()
            .find(|week| &week.label == label)
            .ok_or_else(|| UpdateError::UnknownField {
                group: "badge week",
                name: label.clone(),
            })?;
        week.value = *value;
    }
    set_if_some(&mut state.badges.unique_users, update.unique_users);
    set_if_some(&mut state.badges.target, update.badge_target);
    set_if_some(&mut state.stories.submitted, update.stories_submitted);
    set_if_some(&mut state.stories.target, update.stories_target);
    Ok(recompute_all(state))
}

/// Records the play count of one episode, addressed by series, week and day.
pub fn apply_podcast_plays(
    mut state: DashboardState,
    update: &PodcastPlaysUpdate,
) -> Result<DashboardState, UpdateError> {
    let series_name = update.series.trim();
    let series = state
        .podcasts
        .iter_mut()
        .find(|series| series.name == series_name)
        .ok_or_else(|| UpdateError::UnknownField {
            group: "podcast series",
            name: series_name.to_string(),
        })?;
    let episode = series
        .episodes
        .iter_mut()
        .find(|episode| episode.week == update.week && episode.day == update.day)
        .ok_or_else(|| UpdateError::UnknownField {
            group: "podcast episode",
            name: format!("week {} day {}", update.week, update.day),
        })?;
    episode.plays = update.plays;
    Ok(recompute_all(state))
}

/// Invariants a snapshot must satisfy before its derived fields can be trusted.
pub fn validate_state(state: &DashboardState) -> Result<(), UpdateError> {
    check_population(state)?;
    for campaign in &state.sms_campaigns {
        check_clicks(campaign.clicked, campaign.delivered)?;
    }
    check_bounce_rate(state.traffic.bounce_rate)
}

fn set_if_some<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn check_bounce_rate(bounce_rate: f64) -> Result<(), UpdateError> {
    if !bounce_rate.is_finite() || !(0.0..=100.0).contains(&bounce_rate) {
        return Err(UpdateError::InvalidValue {
            field: "bounce_rate",
            reason: format!("{bounce_rate} is not a percentage"),
        });
    }
    Ok(())
}

fn check_clicks(clicked: u64, delivered: u64) -> Result<(), UpdateError> {
    if clicked > delivered {
        return Err(UpdateError::ClickedExceedsDelivered { clicked, delivered });
    }
    Ok(())
}

/// Authored age buckets (all but the remainder) must fit inside the registrant count.
fn check_population(state: &DashboardState) -> Result<(), UpdateError> {
    let registrants = state.program_value(REGISTRANTS);
    let total: u64 = match state.age_buckets.split_last() {
        Some((_, authored)) => saturating_total(authored.iter().map(|bucket| bucket.value)),
        None => 0,
    };
    if total > registrants {
        return Err(UpdateError::PopulationExceeded { total, registrants });
    }
    Ok(())
}

fn program_metric_mut<'a>(
    state: &'a mut DashboardState,
    name: &str,
) -> Result<&'a mut ProgramMetric, UpdateError> {
    state
        .program_metrics
        .iter_mut()
        .find(|metric| metric.name == name)
        .ok_or_else(|| UpdateError::UnknownField {
            group: "program metric",
            name: name.to_string(),
        })
}

fn kpi_mut<'a>(
    state: &'a mut DashboardState,
    name: &str,
) -> Result<&'a mut KpiProgress, UpdateError> {
    state
        .kpis
        .iter_mut()
        .find(|kpi| kpi.name == name)
        .ok_or_else(|| UpdateError::UnknownField {
            group: "KPI",
            name: name.to_string(),
        })
}
