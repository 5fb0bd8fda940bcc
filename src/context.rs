use std::sync::Arc;

use crate::api::ComputeApi;
use crate::db::DocumentStore;
use crate::identity::Session;

/// Everything a view needs: the resolved session, the backend client and the
/// document store. Cheap to clone; passed explicitly to every view.
#[derive(Clone)]
pub struct AppContext {
    session: Session,
    api: Arc<dyn ComputeApi>,
    store: Arc<dyn DocumentStore>,
}

impl AppContext {
    pub fn new(
        session: Session,
        api: Arc<dyn ComputeApi>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            session,
            api,
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id()
    }

    pub fn api(&self) -> &dyn ComputeApi {
        self.api.as_ref()
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
