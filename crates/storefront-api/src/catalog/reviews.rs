//! Review handlers

use salvo::prelude::*;
use storefront_commerce::catalog::{NewReview, Review};

use crate::error::into_status_error;
use crate::extensions::{json_body, DepotExt};

/// Approved reviews of a product.
#[handler]
pub(crate) async fn index(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Review>>, StatusError> {
    let slug = req
        .param::<String>("slug")
        .ok_or_else(|| StatusError::bad_request().brief("missing slug"))?;

    let reviews = depot
        .state()?
        .catalog
        .reviews(&slug)
        .await
        .map_err(into_status_error)?;

    Ok(Json(reviews))
}

#[handler]
pub(crate) async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Review>, StatusError> {
    let user = depot.current_user_or_401()?;
    let review: NewReview = json_body(req).await?;

    let review = depot
        .state()?
        .catalog
        .create_review(user, review)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(review))
}

/// The caller's own reviews.
#[handler]
pub(crate) async fn mine(depot: &mut Depot) -> Result<Json<Vec<Review>>, StatusError> {
    let user = depot.current_user_or_401()?;

    let reviews = depot
        .state()?
        .catalog
        .my_reviews(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(reviews))
}
