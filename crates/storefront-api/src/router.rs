//! App Router

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};

use crate::{auth, catalog, healthcheck, orders, request, users, AppState};

/// The full route tree with state, logging and auth attached.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(request::request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(public_catalog())
        .push(
            Router::with_path("users")
                .push(Router::with_path("register").post(users::account::register))
                .push(Router::with_path("token").post(users::account::login))
                .push(Router::with_path("reset-password").post(users::account::reset_password))
                .push(
                    Router::with_path("reset-password-confirm")
                        .post(users::account::reset_password_confirm),
                ),
        )
        .push(
            Router::new()
                .hoop(auth::require_user)
                .push(orders_router())
                .push(
                    Router::with_path("reviews")
                        .post(catalog::reviews::create)
                        .push(Router::with_path("mine").get(catalog::reviews::mine)),
                )
                .push(account_router()),
        )
}

fn public_catalog() -> Router {
    Router::new()
        .push(
            Router::with_path("products")
                .get(catalog::products::index)
                .push(Router::with_path("featured").get(catalog::products::featured))
                .push(Router::with_path("new").get(catalog::products::new_arrivals))
                .push(Router::with_path("best-sellers").get(catalog::products::best_sellers))
                .push(
                    Router::with_path("{slug}")
                        .get(catalog::products::get)
                        .push(Router::with_path("related").get(catalog::products::related))
                        .push(Router::with_path("reviews").get(catalog::reviews::index))
                        .push(
                            Router::with_path("increment-view")
                                .post(catalog::products::increment_view),
                        ),
                ),
        )
        .push(
            Router::with_path("categories")
                .get(catalog::categories::index)
                .push(
                    Router::with_path("{slug}")
                        .get(catalog::categories::get)
                        .push(
                            Router::with_path("subcategories")
                                .get(catalog::categories::subcategories),
                        )
                        .push(Router::with_path("products").get(catalog::categories::products)),
                ),
        )
        .push(Router::with_path("brands").get(catalog::terms::brands))
        .push(Router::with_path("materials").get(catalog::terms::materials))
}

fn orders_router() -> Router {
    Router::with_path("orders")
        .get(orders::index)
        .post(orders::create)
        .push(Router::with_path("validate-coupon").post(orders::validate_coupon))
        .push(
            Router::with_path("{order_number}")
                .get(orders::get)
                .push(Router::with_path("cancel").put(orders::cancel))
                .push(Router::with_path("invoice").get(orders::invoice)),
        )
}

fn account_router() -> Router {
    Router::with_path("users")
        .push(
            Router::with_path("profile")
                .get(users::account::profile)
                .put(users::account::update_profile),
        )
        .push(Router::with_path("change-password").post(users::account::change_password))
        .push(
            Router::with_path("addresses")
                .get(users::addresses::index)
                .post(users::addresses::create)
                .push(
                    Router::with_path("{id}")
                        .put(users::addresses::update)
                        .delete(users::addresses::delete)
                        .push(Router::with_path("set-default").post(users::addresses::set_default)),
                ),
        )
}
