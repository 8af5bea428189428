//! Shared handler state: the services plus the identity resolver.

use std::sync::Arc;

use domains::IdentityResolver;
use services::{AdBoardService, CreativeService, MediaService, ReconciliationService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub ad_boards: Arc<AdBoardService>,
    pub creatives: Arc<CreativeService>,
    pub reconciliation: Arc<ReconciliationService>,
    pub users: Arc<UserService>,
    pub media: Arc<MediaService>,
    pub identity: Arc<dyn IdentityResolver>,
}
