use crate::errors::{AppError, UpdateError};
use crate::metrics::{derive_funnel, summarize};
use crate::models::{
    DashboardState, DashboardSummary, DemographicsUpdate, EngagementUpdate, FunnelStage,
    KpiUpdate, NewCampaignRequest, PodcastPlaysUpdate, ProgramUpdate, SmsUpdate, SocialUpdate,
    TrafficUpdate,
};
use crate::state::AppState;
use crate::storage::save_state;
use crate::ui::render_index;
use crate::updates;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.dashboard.lock().await;
    Html(render_index(&dashboard))
}

pub async fn get_state(State(state): State<AppState>) -> Json<DashboardState> {
    let dashboard = state.dashboard.lock().await;
    Json(dashboard.clone())
}

pub async fn get_funnel(State(state): State<AppState>) -> Json<Vec<FunnelStage>> {
    let dashboard = state.dashboard.lock().await;
    Json(derive_funnel(&dashboard))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    let dashboard = state.dashboard.lock().await;
    Json(summarize(&dashboard))
}

pub async fn update_program(
    State(state): State<AppState>,
    Json(payload): Json<ProgramUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_program_update(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_kpis(
    State(state): State<AppState>,
    Json(payload): Json<KpiUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_kpi_targets(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_demographics(
    State(state): State<AppState>,
    Json(payload): Json<DemographicsUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_demographics(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_traffic(
    State(state): State<AppState>,
    Json(payload): Json<TrafficUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_traffic(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_social(
    State(state): State<AppState>,
    Json(payload): Json<SocialUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_social(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_engagement(
    State(state): State<AppState>,
    Json(payload): Json<EngagementUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_engagement(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_podcast(
    State(state): State<AppState>,
    Json(payload): Json<PodcastPlaysUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_podcast_plays(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn update_sms(
    State(state): State<AppState>,
    Json(payload): Json<SmsUpdate>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::apply_sms_update(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn add_campaign(
    State(state): State<AppState>,
    Json(payload): Json<NewCampaignRequest>,
) -> Result<Json<DashboardState>, AppError> {
    let saved = commit(&state, |current| updates::add_sms_campaign(current, &payload)).await?;
    Ok(Json(saved))
}

pub async fn add_campaign_form(
    State(state): State<AppState>,
    Form(payload): Form<NewCampaignRequest>,
) -> Result<Redirect, AppError> {
    commit(&state, |current| updates::add_sms_campaign(current, &payload)).await?;
    Ok(Redirect::to("/"))
}

/// Read-modify-write of the whole snapshot. The in-memory copy is only replaced
/// once the file write has succeeded.
async fn commit<F>(state: &AppState, apply: F) -> Result<DashboardState, AppError>
where
    F: FnOnce(DashboardState) -> Result<DashboardState, UpdateError>,
{
    let mut dashboard = state.dashboard.lock().await;
    let updated = apply(dashboard.clone()).map_err(|err| {
        warn!("rejected dashboard update: {err}");
        AppError::from(err)
    })?;

    let saved = save_state(&state.data_path, updated).await?;
    *dashboard = saved.clone();
    Ok(saved)
}
