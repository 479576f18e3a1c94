//! Brand and material handlers

use salvo::prelude::*;
use storefront_commerce::catalog::{Brand, Material};

use super::products::non_blank_query;
use crate::error::into_status_error;
use crate::extensions::DepotExt;

#[handler]
pub(crate) async fn brands(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Brand>>, StatusError> {
    let search = non_blank_query(req, "search");
    let found = depot
        .state()?
        .catalog
        .brands(search.as_deref())
        .await
        .map_err(into_status_error)?;

    Ok(Json(found))
}

#[handler]
pub(crate) async fn materials(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Vec<Material>>, StatusError> {
    let search = non_blank_query(req, "search");
    let found = depot
        .state()?
        .catalog
        .materials(search.as_deref())
        .await
        .map_err(into_status_error)?;

    Ok(Json(found))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use storefront_commerce::catalog::NewTerm;
    use testresult::TestResult;

    use crate::test_helpers::{service, test_state};

    use super::*;

    #[tokio::test]
    async fn test_search_terms() -> TestResult {
        let state = test_state().await?;
        state.catalog.create_brand(NewTerm::new("IKEA", "Muebles suecos")).await?;
        state.catalog.create_brand(NewTerm::new("Oechsle", "Tienda por departamentos")).await?;
        state.catalog.create_material(NewTerm::new("Madera", "")).await?;
        state.catalog.create_material(NewTerm::new("Metal", "")).await?;
        let service = service(state);

        let matching: Vec<Brand> = TestClient::get("http://example.com/brands?search=suecos")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].name, "IKEA");

        let wood: Vec<Material> = TestClient::get("http://example.com/materials?search=mad")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(wood.len(), 1);

        let all: Vec<Material> = TestClient::get("http://example.com/materials")
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(all.len(), 2);

        Ok(())
    }
}
