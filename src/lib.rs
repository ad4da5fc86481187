pub mod app;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod storage;
pub mod ui;
pub mod updates;
pub mod state;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_state, save_state};
