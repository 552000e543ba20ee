use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::identity::IdentityProvider;
use crate::config::Config;
use crate::services::image_host::ImageHost;
use crate::services::mailer::Mailer;

/// Shared application state available to all request handlers via Axum's `State` extractor.
///
/// External collaborators sit behind trait objects so tests can swap in fakes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub images: Arc<dyn ImageHost>,
    pub mailer: Arc<dyn Mailer>,
}
