//! Depot helper extensions.

use std::any::Any;
use std::sync::Arc;

use salvo::prelude::{Depot, StatusError};
use storefront_commerce::UserId;

use crate::state::AppState;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn state(&self) -> Result<&Arc<AppState>, StatusError> {
        self.obtain_or_500::<Arc<AppState>>()
    }

    /// The caller resolved by the auth middleware.
    fn current_user_or_401(&self) -> Result<UserId, StatusError>;

    fn insert_current_user(&mut self, user: UserId);
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn current_user_or_401(&self) -> Result<UserId, StatusError> {
        self.obtain::<UserId>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Authentication required"))
    }

    fn insert_current_user(&mut self, user: UserId) {
        self.inject(user);
    }
}
