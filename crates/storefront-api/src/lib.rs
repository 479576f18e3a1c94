//! Storefront JSON API.
//!
//! Salvo routes over the catalog, order and account services. Callers are
//! identified by an opaque bearer token; the authenticated [`UserId`] is put
//! in the request [`Depot`](salvo::Depot) for handlers to read.
//!
//! [`UserId`]: storefront_commerce::UserId

mod auth;
mod catalog;
mod config;
mod error;
mod extensions;
mod healthcheck;
mod orders;
mod request;
mod router;
mod server;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::app_router;
pub use server::serve;
pub use state::AppState;
