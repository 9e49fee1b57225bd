use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{account::AccountView, role::Role},
    models::ErrorResponse,
    state::AppState,
};

/// List Accounts users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Accounts with the Accounts role", body = Vec<AccountView>),
        (status = 403, description = "Caller is not Accounts", body = ErrorResponse)
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_accounts(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    auth.require_accounts()?;

    let accounts = state.accounts.list_by_role(Role::Accounts).await?;
    debug!(count = accounts.len(), "Accounts users listed");

    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::as_role;
    use crate::model::{account::NewAccount, role::Role};
    use crate::state::testing::memory_state;
    use crate::store::AccountStore;
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;
    use tempfile::tempdir;

    #[actix_web::test]
    async fn lists_only_accounts_role_without_hashes() {
        let dir = tempdir().unwrap();
        let (state, store) = memory_state(dir.path());
        for (name, role) in [("asha", Role::Admin), ("priya", Role::Accounts)] {
            store
                .insert_account(NewAccount {
                    username: name.into(),
                    email: format!("{name}@company.com"),
                    password_hash: "$argon2id$stub".into(),
                    role,
                })
                .await
                .unwrap();
        }
        let app = test_app!(state);

        let req = as_role(test::TestRequest::get(), Role::Admin)
            .uri("/api/users")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = as_role(test::TestRequest::get(), Role::Accounts)
            .uri("/api/users")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "priya");
        assert!(users[0].get("password_hash").is_none());
    }
}
