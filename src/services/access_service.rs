use std::sync::Arc;

use tracing::warn;

use crate::backend::WallStore;
use crate::errors::{WallError, WallResult};
use crate::services::validation::require;

/// Checks the shared secret that gates uploads and deletes.
#[derive(Clone)]
pub struct AccessService {
    store: Arc<dyn WallStore>,
}

impl AccessService {
    pub fn new(store: Arc<dyn WallStore>) -> Self {
        Self { store }
    }

    /// Accepts `code` if it matches a stored access code, ignoring case and
    /// surrounding whitespace.
    pub async fn verify(&self, code: &str) -> WallResult<()> {
        let code = require(code, "secret code")?;
        if self.store.access_code_exists(&code).await? {
            Ok(())
        } else {
            warn!("Rejected access code attempt");
            Err(WallError::InvalidAccessCode)
        }
    }
}
