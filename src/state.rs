use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn};

/// Shared handler state. The connection sits behind an `Arc` because SeaORM's
/// mock-enabled `DatabaseConnection` is not `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<OrmConn>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> Self {
        Self {
            orm: Arc::new(orm),
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &OrmConn {
        &self.orm
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::test_support::test_config;

    #[test]
    fn clones_share_one_connection() {
        let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(orm, test_config());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.orm, &cloned.orm));
        assert!(std::ptr::eq(state.db(), cloned.db()));
    }
}
