use actix_web::{HttpResponse, web};
use tracing::debug;

use super::parse_body;
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::salary_slip::{GeneratedSlip, SlipSummary},
    models::{ErrorResponse, MessageResponse},
    payroll::{service, slip_request::SlipRequest},
    state::AppState,
};

/// Generate Salary Slip
///
/// Computes pay for the given days, renders the PDF, stores it and records it in the ledger.
#[utoipa::path(
    post,
    path = "/api/salary-slip",
    request_body = SlipRequest,
    responses(
        (status = 201, description = "Slip generated", body = GeneratedSlip),
        (status = 400, description = "Missing userId, month or daysWorked", body = ErrorResponse),
        (status = 403, description = "Caller is not Accounts", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
        (status = 500, description = "Slip could not be stored", body = ErrorResponse)
    ),
    tag = "Salary Slip",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate_slip(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    auth.require_accounts()?;

    let request: SlipRequest = parse_body(&body)?;
    let slip = service::generate_salary_slip(&state, request).await?;

    Ok(HttpResponse::Created().json(slip))
}

/// List Salary Slips
#[utoipa::path(
    get,
    path = "/api/salary-slips",
    responses(
        (status = 200, description = "Every recorded slip, newest first", body = Vec<SlipSummary>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Salary Slip",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_slips(
    _auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let slips = service::list_slips(&state).await?;
    debug!(count = slips.len(), "Salary slips listed");
    Ok(HttpResponse::Ok().json(slips))
}

/// Delete Salary Slip
///
/// The PDF is removed on a best-effort basis; a failure there does not fail the request.
#[utoipa::path(
    delete,
    path = "/api/salary-slips/{id}",
    params(
        ("id" = u64, Path, description = "Salary slip ID")
    ),
    responses(
        (status = 200, description = "Slip deleted", body = MessageResponse),
        (status = 404, description = "Salary slip not found", body = ErrorResponse)
    ),
    tag = "Salary Slip",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_slip(
    _auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    service::delete_slip(&state, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Salary slip deleted successfully".into(),
    }))
}
