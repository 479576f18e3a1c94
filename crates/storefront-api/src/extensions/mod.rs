//! Extension traits

mod depot;
mod request;
mod result;

pub(crate) use depot::DepotExt;
pub(crate) use request::{json_body, path_param};
pub(crate) use result::ResultExt;
