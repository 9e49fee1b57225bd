use std::str::FromStr;

use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::{
        account::{AccountView, NewAccount},
        role::Role,
    },
    models::{AuthResponse, ErrorResponse, LoginReq, SignupReq},
    state::AppState,
};

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupReq,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing field or unknown role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signup", skip_all)]
pub async fn signup(
    state: web::Data<AppState>,
    config: web::Data<Config>,
    body: web::Json<SignupReq>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(username), Some(email), Some(password), Some(role)) = (
        present(body.username),
        present(body.email),
        present(body.password),
        present(body.role),
    ) else {
        return Err(AppError::Validation("All fields are required".into()));
    };

    let role = Role::from_str(role.trim()).map_err(|_| {
        AppError::Validation(format!(
            "Invalid role. Must be one of: {}",
            Role::valid_names()
        ))
    })?;
    let email = email.trim().to_lowercase();

    if !state
        .emails
        .is_available(&email, state.accounts.as_ref())
        .await?
    {
        info!("Signup rejected: email already registered");
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = hash_password(&password).map_err(|e| AppError::Internal(e.to_string()))?;

    let account = state
        .accounts
        .insert_account(NewAccount {
            username: username.trim().to_string(),
            email,
            password_hash,
            role,
        })
        .await?;
    state.emails.mark_taken(&account.email).await;

    let token = generate_access_token(&account, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(account_id = account.id, role = %account.role, "Account created");

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User created successfully".into(),
        user: AccountView::from(&account),
        token,
    }))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip_all)]
pub async fn login(
    state: web::Data<AppState>,
    config: web::Data<Config>,
    body: web::Json<LoginReq>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let body = body.into_inner();
    let (Some(email), Some(password)) = (present(body.email), present(body.password)) else {
        return Err(AppError::Validation("All fields are required".into()));
    };

    let Some(account) = state
        .accounts
        .find_by_email(&email.trim().to_lowercase())
        .await?
    else {
        info!("Invalid credentials: account not found");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    debug!(account_id = account.id, "Verifying password");
    if let Err(e) = verify_password(&password, &account.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = generate_access_token(&account, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(account_id = account.id, "Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".into(),
        user: AccountView::from(&account),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::verify_token;
    use crate::error::json_error_handler;
    use crate::state::testing::memory_state;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use tempfile::tempdir;

    macro_rules! auth_app {
        ($dir:expr) => {{
            let (state, _) = memory_state($dir);
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .app_data(web::Data::new(Config::for_tests()))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .route("/auth/signup", web::post().to(signup))
                    .route("/auth/login", web::post().to(login)),
            )
            .await
        }};
    }

    fn signup_body() -> Value {
        json!({
            "username": "priya",
            "email": " Priya@Company.com ",
            "password": "s3cret-pass",
            "role": "Accounts"
        })
    }

    #[actix_web::test]
    async fn signup_then_login() {
        let dir = tempdir().unwrap();
        let app = auth_app!(dir.path());

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], "priya@company.com");
        assert_eq!(body["user"]["role"], "Accounts");
        assert!(body["user"].get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "priya@company.com", "password": "s3cret-pass"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let claims = verify_token(body["token"].as_str().unwrap(), "test-secret").unwrap();
        assert_eq!(claims.role, Role::Accounts);
        assert_eq!(claims.sub, "priya");
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_conflict() {
        let dir = tempdir().unwrap();
        let app = auth_app!(dir.path());

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/auth/signup")
                .set_json(signup_body())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn signup_rejects_unknown_role_and_missing_fields() {
        let dir = tempdir().unwrap();
        let app = auth_app!(dir.path());

        let mut body = signup_body();
        body["role"] = json!("Superuser");
        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid role. Must be one of: Admin, Accounts");

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({"username": "priya"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let dir = tempdir().unwrap();
        let app = auth_app!(dir.path());

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_body())
            .to_request();
        test::call_service(&app, req).await;

        for body in [
            json!({"email": "priya@company.com", "password": "wrong"}),
            json!({"email": "nobody@company.com", "password": "s3cret-pass"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid credentials");
        }
    }
}
