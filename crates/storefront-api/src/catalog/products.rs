//! Product handlers

use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_commerce::catalog::{
    Page, PageRequest, Product, ProductDetail, ProductFilter, ProductOrdering,
};
use storefront_commerce::{Currency, Money};

use crate::error::into_status_error;
use crate::extensions::DepotExt;

/// Read `page` and `per_page`.
pub(crate) fn page_request(req: &Request) -> Result<PageRequest, StatusError> {
    Ok(PageRequest::new(
        int_query(req, "page")?,
        int_query(req, "per_page")?,
    ))
}

fn int_query(req: &Request, name: &str) -> Result<Option<i64>, StatusError> {
    match non_blank_query(req, name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| StatusError::bad_request().brief(format!("{name} must be an integer"))),
        None => Ok(None),
    }
}

fn money_query(req: &Request, name: &str, currency: Currency) -> Result<Option<Money>, StatusError> {
    non_blank_query(req, name)
        .map(|raw| Money::parse(&raw, currency))
        .transpose()
        .map_err(into_status_error)
}

pub(crate) fn non_blank_query(req: &Request, name: &str) -> Option<String> {
    req.query::<String>(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the list filter from query parameters.
fn product_filter(req: &Request, currency: Currency) -> Result<ProductFilter, StatusError> {
    let ordering: ProductOrdering = match non_blank_query(req, "ordering") {
        Some(raw) => raw.parse().map_err(into_status_error)?,
        None => ProductOrdering::default(),
    };

    Ok(ProductFilter {
        category: non_blank_query(req, "category"),
        brand: non_blank_query(req, "brand"),
        search: non_blank_query(req, "search"),
        min_price: money_query(req, "min_price", currency)?,
        max_price: money_query(req, "max_price", currency)?,
        in_stock: non_blank_query(req, "in_stock")
            .is_some_and(|raw| matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes")),
        ordering,
    })
}

fn slug(req: &Request) -> Result<String, StatusError> {
    req.param::<String>("slug")
        .ok_or_else(|| StatusError::bad_request().brief("missing slug"))
}

#[handler]
pub(crate) async fn index(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Page<Product>>, StatusError> {
    let state = depot.state()?;
    let filter = product_filter(req, state.orders.pricing().currency)?;

    let page = state
        .catalog
        .products(&filter, page_request(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page))
}

#[handler]
pub(crate) async fn featured(depot: &mut Depot) -> Result<Json<Vec<Product>>, StatusError> {
    let products = depot.state()?.catalog.featured().await.map_err(into_status_error)?;

    Ok(Json(products))
}

#[handler]
pub(crate) async fn new_arrivals(depot: &mut Depot) -> Result<Json<Vec<Product>>, StatusError> {
    let products = depot.state()?.catalog.new_arrivals().await.map_err(into_status_error)?;

    Ok(Json(products))
}

#[handler]
pub(crate) async fn best_sellers(depot: &mut Depot) -> Result<Json<Vec<Product>>, StatusError> {
    let products = depot.state()?.catalog.best_sellers().await.map_err(into_status_error)?;

    Ok(Json(products))
}

/// Product detail. Each fetch counts as a view.
#[handler]
pub(crate) async fn get(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ProductDetail>, StatusError> {
    let detail = depot
        .state()?
        .catalog
        .product(&slug(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(detail))
}

#[handler]
pub(crate) async fn related(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Product>>, StatusError> {
    let products = depot
        .state()?
        .catalog
        .related(&slug(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(products))
}

/// View counter response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ViewsResponse {
    pub views: i64,
}

#[handler]
pub(crate) async fn increment_view(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ViewsResponse>, StatusError> {
    let views = depot
        .state()?
        .catalog
        .increment_view(&slug(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ViewsResponse { views }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{seed_category, seed_product, service, test_state};

    use super::*;

    #[tokio::test]
    async fn test_list_filters_and_paginates() -> TestResult {
        let state = test_state().await?;
        let sofas = seed_category(&state, "Sofás").await?;
        seed_product(&state, "Sofá Gris", 120_000, 3, Some(sofas)).await?;
        seed_product(&state, "Sofá Azul", 90_000, 0, Some(sofas)).await?;
        seed_product(&state, "Mesa Roble", 45_000, 8, None).await?;
        let service = service(state);

        let page: Page<Product> = TestClient::get("http://example.com/products?category=sofas")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(page.pagination.total, 2);

        let page: Page<Product> =
            TestClient::get("http://example.com/products?category=sofas&in_stock=true")
                .send(&service)
                .await
                .take_json()
                .await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].slug, "sofa-gris");

        let page: Page<Product> =
            TestClient::get("http://example.com/products?ordering=price&per_page=2&page=1")
                .send(&service)
                .await
                .take_json()
                .await?;
        assert_eq!(page.items[0].slug, "mesa-roble");
        assert!(page.pagination.has_next);

        let page: Page<Product> = TestClient::get("http://example.com/products?max_price=500")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(page.pagination.total, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_query_values_return_400() -> TestResult {
        let service = service(test_state().await?);

        for url in [
            "http://example.com/products?ordering=random",
            "http://example.com/products?page=two",
            "http://example.com/products?min_price=cheap",
        ] {
            let res = TestClient::get(url).send(&service).await;
            assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "{url}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_detail_counts_views() -> TestResult {
        let state = test_state().await?;
        seed_product(&state, "Mesa Roble", 45_000, 8, None).await?;
        let service = service(state);

        let detail: ProductDetail = TestClient::get("http://example.com/products/mesa-roble")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(detail.product.name, "Mesa Roble");
        assert_eq!(detail.review_count, 0);

        let views: ViewsResponse =
            TestClient::post("http://example.com/products/mesa-roble/increment-view")
                .send(&service)
                .await
                .take_json()
                .await?;
        assert_eq!(views.views, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_returns_404() -> TestResult {
        let service = service(test_state().await?);

        for res in [
            TestClient::get("http://example.com/products/ghost").send(&service).await,
            TestClient::get("http://example.com/products/ghost/related").send(&service).await,
            TestClient::post("http://example.com/products/ghost/increment-view")
                .send(&service)
                .await,
        ] {
            assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_shelves() -> TestResult {
        let state = test_state().await?;
        seed_product(&state, "Mesa Roble", 45_000, 8, None).await?;
        let service = service(state);

        let featured_shelf: Vec<Product> = TestClient::get("http://example.com/products/featured")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(featured_shelf.len(), 1);

        let new: Vec<Product> = TestClient::get("http://example.com/products/new")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert!(new.is_empty());

        let res = TestClient::get("http://example.com/products/best-sellers")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
