use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Database;
use crate::services::{SetupService, TeamService, UserService};

/// Shared request state. Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub teams: TeamService,
    pub setup: SetupService,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            users: UserService::new(&db),
            teams: TeamService::new(&db),
            setup: SetupService::new(&db),
            config: Arc::new(config),
            db,
        }
    }
}
