//! Request extraction with 400 on malformed input.

use std::str::FromStr;

use salvo::prelude::{Request, StatusError};
use serde::de::DeserializeOwned;

/// Parse a path segment such as `{id}`.
pub(crate) fn path_param<T: FromStr>(req: &Request, name: &str) -> Result<T, StatusError> {
    req.param::<String>(name)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| StatusError::bad_request().brief(format!("invalid path parameter '{name}'")))
}

/// Parse the JSON request body.
pub(crate) async fn json_body<T: DeserializeOwned>(req: &mut Request) -> Result<T, StatusError> {
    req.parse_json::<T>()
        .await
        .map_err(|error| StatusError::bad_request().brief(format!("invalid request body: {error}")))
}
