use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    models::user::UserDirectory,
    session::SessionManager,
    store::{QuizStore, SharedStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub sessions: Arc<SessionManager>,
    pub users: Arc<UserDirectory>,
    pub config: Config,
}

impl AppState {
    /// Wires a store and user directory together with a fresh attempt registry.
    pub fn new(store: QuizStore, users: UserDirectory, config: Config) -> Self {
        let store = store.into_shared();
        Self {
            sessions: SessionManager::new(store.clone()),
            store,
            users: Arc::new(users),
            config,
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<UserDirectory> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
