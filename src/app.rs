use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/sms/add", post(handlers::add_campaign_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/funnel", get(handlers::get_funnel))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/program", post(handlers::update_program))
        .route("/api/kpi", post(handlers::update_kpis))
        .route("/api/demographics", post(handlers::update_demographics))
        .route("/api/traffic", post(handlers::update_traffic))
        .route("/api/social", post(handlers::update_social))
        .route("/api/engagement", post(handlers::update_engagement))
        .route("/api/podcast", post(handlers::update_podcast))
        .route("/api/sms", post(handlers::update_sms))
        .route("/api/sms/campaigns", post(handlers::add_campaign))
        .with_state(state)
}
