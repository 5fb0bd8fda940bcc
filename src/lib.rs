pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod doc_processor;
pub mod identity;
pub mod views;

use std::sync::Arc;

use api::HttpComputeApi;
use config::ClientConfig;
use context::AppContext;
use db::{Database, StoreError};
use identity::{IdentityProvider, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info` default.
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Resolves the session, opens the document store and wires the backend
/// client. Views are created from the returned context.
pub async fn bootstrap(
    config: ClientConfig,
    identity: Arc<dyn IdentityProvider>,
) -> Result<AppContext, StoreError> {
    let session = Session::resolve(Arc::clone(&identity)).await;
    let store = match &config.database_path {
        Some(path) => Database::open(path)?,
        None => Database::in_memory()?,
    };
    info!(
        user_id = session.user_id().unwrap_or("<none>"),
        api = %config.api_base_url,
        "session ready"
    );
    let api = HttpComputeApi::new(config, identity);
    Ok(AppContext::new(session, Arc::new(api), Arc::new(store)))
}
