use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::store::{FormStore, ResponseStore};

#[derive(Clone)]
pub struct AppState {
    pub forms: Arc<dyn FormStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn FormStore> {
    fn from_ref(state: &AppState) -> Self {
        state.forms.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ResponseStore> {
    fn from_ref(state: &AppState) -> Self {
        state.responses.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
