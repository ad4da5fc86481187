use crate::models::DashboardState;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub dashboard: Arc<Mutex<DashboardState>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, dashboard: DashboardState) -> Self {
        Self {
            data_path,
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }
}
