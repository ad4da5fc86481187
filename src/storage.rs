use crate::defaults::default_state;
use crate::errors::StorageError;
use crate::metrics::recompute_all;
use crate::models::DashboardState;
use crate::updates::validate_state;
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// Reads the persisted snapshot. Any failure yields the built-in defaults.
pub async fn load_state(path: &Path) -> DashboardState {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<DashboardState>(&bytes) {
            Ok(state) => match validate_state(&state) {
                Ok(()) => recompute_all(state),
                Err(err) => {
                    error!("state file violates invariants: {err}");
                    default_state()
                }
            },
            Err(err) => {
                error!("failed to parse state file: {err}");
                default_state()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => default_state(),
        Err(err) => {
            error!("failed to read state file: {err}");
            default_state()
        }
    }
}

pub async fn save_state(path: &Path, state: DashboardState) -> Result<DashboardState, StorageError> {
    save_state_at(path, state, Utc::now()).await
}

/// Stamps `last_updated` with `now` and overwrites the file with the full document.
pub async fn save_state_at(
    path: &Path,
    mut state: DashboardState,
    now: DateTime<Utc>,
) -> Result<DashboardState, StorageError> {
    state.last_updated = now;
    let payload = serde_json::to_vec_pretty(&state)?;
    fs::write(path, payload).await?;
    info!(path = %path.display(), "saved dashboard state");
    Ok(state)
}
