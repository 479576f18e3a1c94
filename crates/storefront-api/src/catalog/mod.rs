//! Public catalog routes and authenticated reviews.

pub(crate) mod categories;
pub(crate) mod products;
pub(crate) mod reviews;
pub(crate) mod terms;
