use std::sync::Arc;

use storage::repository::DatathonStore;

use crate::middleware::auth::AdminEmails;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DatathonStore>,
    pub admins: Arc<AdminEmails>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DatathonStore>,
        admins: AdminEmails,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            store,
            admins: Arc::new(admins),
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }

    pub fn store(&self) -> &dyn DatathonStore {
        self.store.as_ref()
    }
}
