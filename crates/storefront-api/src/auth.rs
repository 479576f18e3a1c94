//! Bearer token middleware.

use salvo::{http::header::AUTHORIZATION, prelude::*};

use crate::error::into_status_error;
use crate::extensions::DepotExt;

/// Resolve the bearer token to a user and place it in the depot.
#[handler]
pub(crate) async fn require_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.state() {
        Ok(state) => state.clone(),
        Err(error) => {
            res.render(error);
            ctrl.skip_rest();

            return;
        }
    };

    match state.accounts.authenticate(&token).await {
        Ok(user) => depot.insert_current_user(user),
        Err(error) => {
            res.render(into_status_error(error));
            ctrl.skip_rest();

            return;
        }
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::test_helpers::{register, test_state};

    use super::*;

    #[handler]
    async fn echo_user(depot: &mut Depot, res: &mut Response) {
        let user = depot
            .current_user_or_401()
            .map_or_else(|_| "missing".to_string(), |user| user.to_string());

        res.render(user);
    }

    async fn make_service() -> TestResult<(Service, String)> {
        let state = test_state().await?;
        let token = register(&state, "ana").await?;
        let router = Router::new()
            .hoop(inject(state))
            .hoop(require_user)
            .push(Router::new().get(echo_user));

        Ok((Service::new(router), token))
    }

    #[tokio::test]
    async fn test_missing_authorization_header_returns_401() -> TestResult {
        let (service, _) = make_service().await?;

        let res = TestClient::get("http://example.com").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_header_returns_401() -> TestResult {
        let (service, token) = make_service().await?;

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("Basic {token}"), true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token_returns_401() -> TestResult {
        let (service, _) = make_service().await?;

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer not-a-token", true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_token_injects_user() -> TestResult {
        let (service, token) = make_service().await?;

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("Bearer {token}"), true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "1");

        Ok(())
    }
}
