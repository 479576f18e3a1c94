//! Order handlers

use salvo::http::header::CONTENT_DISPOSITION;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_commerce::coupons::CouponCheck;
use storefront_commerce::orders::{Order, PlaceOrder};

use crate::error::into_status_error;
use crate::extensions::{json_body, DepotExt, ResultExt};

fn order_number(req: &Request) -> Result<String, StatusError> {
    req.param::<String>("order_number")
        .ok_or_else(|| StatusError::bad_request().brief("missing order number"))
}

/// Place an order for the caller.
#[handler]
pub(crate) async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Order>, StatusError> {
    let user = depot.current_user_or_401()?;
    let request: PlaceOrder = json_body(req).await?;

    let order = depot
        .state()?
        .orders
        .place_order(user, request)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(order))
}

#[handler]
pub(crate) async fn index(depot: &mut Depot) -> Result<Json<Vec<Order>>, StatusError> {
    let user = depot.current_user_or_401()?;

    let orders = depot
        .state()?
        .orders
        .list_orders(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders))
}

#[handler]
pub(crate) async fn get(req: &mut Request, depot: &mut Depot) -> Result<Json<Order>, StatusError> {
    let user = depot.current_user_or_401()?;

    let order = depot
        .state()?
        .orders
        .get_order(user, &order_number(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order))
}

/// Cancel response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CancelResponse {
    pub message: String,
    pub order: Order,
}

#[handler]
pub(crate) async fn cancel(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CancelResponse>, StatusError> {
    let user = depot.current_user_or_401()?;

    let order = depot
        .state()?
        .orders
        .cancel_order(user, &order_number(req)?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CancelResponse {
        message: format!("Order {} cancelled", order.order_number),
        order,
    }))
}

/// Download the invoice as a text attachment.
#[handler]
pub(crate) async fn invoice(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let user = depot.current_user_or_401()?;
    let state = depot.state()?;

    let document = state
        .orders
        .render_invoice(user, &order_number(req)?, &state.invoices)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", document.file_name),
        true,
    )
    .or_500("failed to set content disposition header")?;
    res.render(Text::Plain(document.body));

    Ok(())
}

/// Coupon probe request
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CouponRequest {
    #[serde(default)]
    pub code: String,
}

#[handler]
pub(crate) async fn validate_coupon(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CouponCheck>, StatusError> {
    let request: CouponRequest = json_body(req).await?;

    let check = depot
        .state()?
        .orders
        .check_coupon(&request.code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(check))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use salvo::http::header::AUTHORIZATION;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{json, Value};
    use storefront_commerce::coupons::{CouponDiscount, NewCoupon};
    use storefront_commerce::orders::OrderStatus;
    use storefront_commerce::ProductId;
    use testresult::TestResult;

    use crate::test_helpers::{bearer, register, seed_product, service, test_state};
    use crate::AppState;

    use super::*;

    fn checkout(product: ProductId, quantity: i64, coupon: Option<&str>) -> Value {
        json!({
            "full_name": "Ana Torres",
            "email": "ana@example.com",
            "phone": "+51999888777",
            "address_line1": "Av. Larco 123",
            "city": "Lima",
            "country": "PE",
            "items": [{ "product_id": product, "quantity": quantity }],
            "coupon_code": coupon,
        })
    }

    async fn setup() -> TestResult<(Arc<AppState>, String, ProductId)> {
        let state = test_state().await?;
        let token = register(&state, "ana").await?;
        let product = seed_product(&state, "Silla Nórdica", 10_000, 5, None).await?;
        state
            .coupons
            .create(NewCoupon {
                code: "WELCOME10".to_string(),
                discount: CouponDiscount::Percent(Decimal::from(10)),
            })
            .await?;

        Ok((state, token, product.id))
    }

    #[tokio::test]
    async fn test_place_order_worked_example() -> TestResult {
        let (state, token, product) = setup().await?;
        let service = service(state);

        let mut res = TestClient::post("http://example.com/orders")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .json(&checkout(product, 2, Some("WELCOME10")))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        let order: Order = res.take_json().await?;
        assert_eq!(order.totals.subtotal.amount_cents, 20_000);
        assert_eq!(order.totals.shipping_cost.amount_cents, 1_000);
        assert_eq!(order.totals.tax.amount_cents, 3_600);
        assert_eq!(order.totals.discount.amount_cents, 2_000);
        assert_eq!(order.totals.total.amount_cents, 22_600);
        assert_eq!(order.status, OrderStatus::Confirmed);

        let orders: Vec<Order> = TestClient::get("http://example.com/orders")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(orders.len(), 1);

        let detail: Order =
            TestClient::get(format!("http://example.com/orders/{}", order.order_number))
                .add_header(AUTHORIZATION, bearer(&token), true)
                .send(&service)
                .await
                .take_json()
                .await?;
        assert_eq!(detail.id, order.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_orders_return_400() -> TestResult {
        let (state, token, product) = setup().await?;
        let service = service(state);

        for body in [
            checkout(product, 6, None),
            checkout(product, 0, None),
            checkout(ProductId::new(999), 1, None),
            json!({ "items": [] }),
        ] {
            let res = TestClient::post("http://example.com/orders")
                .add_header(AUTHORIZATION, bearer(&token), true)
                .json(&body)
                .send(&service)
                .await;
            assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "{body}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_and_invoice() -> TestResult {
        let (state, token, product) = setup().await?;
        let service = service(state);

        let order: Order = TestClient::post("http://example.com/orders")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .json(&checkout(product, 1, None))
            .send(&service)
            .await
            .take_json()
            .await?;

        let mut res =
            TestClient::get(format!("http://example.com/orders/{}/invoice", order.order_number))
                .add_header(AUTHORIZATION, bearer(&token), true)
                .send(&service)
                .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        let disposition = res
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(
            disposition,
            Some(format!("attachment; filename=\"invoice_{}.txt\"", order.order_number))
        );
        assert!(res.take_string().await?.contains(&order.order_number));

        let url = format!("http://example.com/orders/{}/cancel", order.order_number);
        let cancelled: CancelResponse = TestClient::put(&url)
            .add_header(AUTHORIZATION, bearer(&token), true)
            .send(&service)
            .await
            .take_json()
            .await?;
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

        let res = TestClient::put(&url)
            .add_header(AUTHORIZATION, bearer(&token), true)
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_orders_are_private() -> TestResult {
        let (state, token, product) = setup().await?;
        let other = register(&state, "luis").await?;
        let service = service(state);

        let order: Order = TestClient::post("http://example.com/orders")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .json(&checkout(product, 1, None))
            .send(&service)
            .await
            .take_json()
            .await?;

        let res = TestClient::get(format!("http://example.com/orders/{}", order.order_number))
            .add_header(AUTHORIZATION, bearer(&other), true)
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_coupon() -> TestResult {
        let (state, token, _) = setup().await?;
        let service = service(state);

        let check: CouponCheck = TestClient::post("http://example.com/orders/validate-coupon")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .json(&json!({ "code": "WELCOME10" }))
            .send(&service)
            .await
            .take_json()
            .await?;
        assert!(check.valid);
        assert_eq!(check.kind.as_deref(), Some("percent"));

        let check: CouponCheck = TestClient::post("http://example.com/orders/validate-coupon")
            .add_header(AUTHORIZATION, bearer(&token), true)
            .json(&json!({ "code": "NOPE" }))
            .send(&service)
            .await
            .take_json()
            .await?;
        assert!(!check.valid);
        assert_eq!(check.discount, "0");

        Ok(())
    }
}
