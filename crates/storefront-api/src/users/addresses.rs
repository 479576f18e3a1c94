//! Saved address handlers

use salvo::prelude::*;
use storefront_auth::{Address, AddressInput};
use storefront_commerce::AddressId;

use crate::error::into_status_error;
use crate::extensions::{json_body, path_param, DepotExt};

fn address_id(req: &Request) -> Result<AddressId, StatusError> {
    path_param::<i64>(req, "id").map(AddressId::new)
}

#[handler]
pub(crate) async fn index(depot: &mut Depot) -> Result<Json<Vec<Address>>, StatusError> {
    let user = depot.current_user_or_401()?;

    let addresses = depot
        .state()?
        .accounts
        .addresses(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(addresses))
}

#[handler]
pub(crate) async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Address>, StatusError> {
    let user = depot.current_user_or_401()?;
    let input: AddressInput = json_body(req).await?;

    let address = depot
        .state()?
        .accounts
        .create_address(user, input)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(address))
}

#[handler]
pub(crate) async fn update(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Address>, StatusError> {
    let user = depot.current_user_or_401()?;
    let id = address_id(req)?;
    let input: AddressInput = json_body(req).await?;

    let address = depot
        .state()?
        .accounts
        .update_address(user, id, input)
        .await
        .map_err(into_status_error)?;

    Ok(Json(address))
}

#[handler]
pub(crate) async fn delete(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let user = depot.current_user_or_401()?;

    depot
        .state()?
        .accounts
        .delete_address(user, address_id(req)?)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

#[handler]
pub(crate) async fn set_default(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<Address>, StatusError> {
    let user = depot.current_user_or_401()?;

    let address = depot
        .state()?
        .accounts
        .set_default_address(user, address_id(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(address))
}

#[cfg(test)]
mod tests {
    use salvo::http::header::AUTHORIZATION;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{json, Value};
    use testresult::TestResult;

    use crate::test_helpers::{bearer, register, service, test_state};

    use super::*;

    fn home(label: &str) -> Value {
        json!({
            "label": label,
            "full_name": "Ana Torres",
            "phone": "+51999888777",
            "address_line1": "Av. Larco 123",
            "city": "Lima",
            "country": "PE",
        })
    }

    #[tokio::test]
    async fn test_address_lifecycle() -> TestResult {
        let state = test_state().await?;
        let token = register(&state, "ana").await?;
        let service = service(state);
        let auth = bearer(&token);

        let mut res = TestClient::post("http://example.com/users/addresses")
            .add_header(AUTHORIZATION, &auth, true)
            .json(&home("Casa"))
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        let casa: Address = res.take_json().await?;

        let oficina: Address = TestClient::post("http://example.com/users/addresses")
            .add_header(AUTHORIZATION, &auth, true)
            .json(&home("Oficina"))
            .send(&service)
            .await
            .take_json()
            .await?;

        let res = TestClient::post("http://example.com/users/addresses")
            .add_header(AUTHORIZATION, &auth, true)
            .json(&home("casa"))
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let default: Address = TestClient::post(format!(
            "http://example.com/users/addresses/{}/set-default",
            oficina.id
        ))
        .add_header(AUTHORIZATION, &auth, true)
        .send(&service)
        .await
        .take_json()
        .await?;
        assert!(default.is_default);

        let mut renamed = home("Casa de playa");
        renamed["city"] = json!("Asia");
        let updated: Address =
            TestClient::put(format!("http://example.com/users/addresses/{}", casa.id))
                .add_header(AUTHORIZATION, &auth, true)
                .json(&renamed)
                .send(&service)
                .await
                .take_json()
                .await?;
        assert_eq!(updated.city, "Asia");

        let res = TestClient::delete(format!("http://example.com/users/addresses/{}", casa.id))
            .add_header(AUTHORIZATION, &auth, true)
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        let remaining: Vec<Address> = TestClient::get("http://example.com/users/addresses")
            .add_header(AUTHORIZATION, &auth, true)
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, oficina.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_addresses_are_hidden() -> TestResult {
        let state = test_state().await?;
        let ana = register(&state, "ana").await?;
        let luis = register(&state, "luis").await?;
        let service = service(state);

        let casa: Address = TestClient::post("http://example.com/users/addresses")
            .add_header(AUTHORIZATION, bearer(&ana), true)
            .json(&home("Casa"))
            .send(&service)
            .await
            .take_json()
            .await?;

        let res = TestClient::delete(format!("http://example.com/users/addresses/{}", casa.id))
            .add_header(AUTHORIZATION, bearer(&luis), true)
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        let res = TestClient::put("http://example.com/users/addresses/abc")
            .add_header(AUTHORIZATION, bearer(&ana), true)
            .json(&home("Casa"))
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
