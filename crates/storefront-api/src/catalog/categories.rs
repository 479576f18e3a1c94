//! Category handlers

use salvo::prelude::*;
use storefront_commerce::catalog::{Category, Page, Product};

use super::products::page_request;
use crate::error::into_status_error;
use crate::extensions::DepotExt;

fn slug(req: &Request) -> Result<String, StatusError> {
    req.param::<String>("slug")
        .ok_or_else(|| StatusError::bad_request().brief("missing slug"))
}

#[handler]
pub(crate) async fn index(depot: &mut Depot) -> Result<Json<Vec<Category>>, StatusError> {
    let categories = depot.state()?.catalog.categories().await.map_err(into_status_error)?;

    Ok(Json(categories))
}

#[handler]
pub(crate) async fn get(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Category>, StatusError> {
    let category = depot
        .state()?
        .catalog
        .category(&slug(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(category))
}

#[handler]
pub(crate) async fn subcategories(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Category>>, StatusError> {
    let children = depot
        .state()?
        .catalog
        .subcategories(&slug(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(children))
}

#[handler]
pub(crate) async fn products(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Page<Product>>, StatusError> {
    let page = depot
        .state()?
        .catalog
        .category_products(&slug(req)?, page_request(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page))
}
