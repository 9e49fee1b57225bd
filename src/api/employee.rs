use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::parse_body;
use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::employee::{Employee, EmployeeForm, EmployeeInput},
    models::ErrorResponse,
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct EmployeeEnvelope {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Employee added successfully")]
    pub message: String,
    pub data: Employee,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeDeleted {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Employee deleted successfully")]
    pub message: String,
}

/// Rejects `input` if another employee already holds its email or employee ID.
async fn ensure_unique(
    state: &AppState,
    input: &EmployeeInput,
    exclude_id: Option<u64>,
) -> Result<(), AppError> {
    let existing = state
        .employees
        .find_conflict(&input.email, &input.employee_code, exclude_id)
        .await?;

    match existing {
        Some(other) if other.email == input.email => {
            Err(AppError::Conflict("Email is already in use".into()))
        }
        Some(_) => Err(AppError::Conflict("Employee ID is already in use".into())),
        None => Ok(()),
    }
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/add-employees",
    request_body = EmployeeForm,
    responses(
        (status = 201, description = "Employee created", body = EmployeeEnvelope),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 403, description = "Caller is not Accounts", body = ErrorResponse),
        (status = 409, description = "Email or employee ID already in use", body = ErrorResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    auth.require_accounts()?;

    let input = parse_body::<EmployeeForm>(&body)?.into_input()?;
    ensure_unique(&state, &input, None).await?;

    let employee = state.employees.create_employee(input).await?;
    info!(employee_id = employee.id, "Employee created");

    Ok(HttpResponse::Created().json(EmployeeEnvelope {
        success: true,
        message: "Employee added successfully".into(),
        data: employee,
    }))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = Vec<Employee>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    _auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let employees = state.employees.list_employees().await?;
    debug!(count = employees.len(), "Employees listed");
    Ok(HttpResponse::Ok().json(employees))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/edit-employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    request_body = EmployeeForm,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeEnvelope),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 403, description = "Caller is not Accounts", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
        (status = 409, description = "Email or employee ID already in use", body = ErrorResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    auth.require_accounts()?;
    let id = path.into_inner();

    let input = parse_body::<EmployeeForm>(&body)?.into_input()?;
    if state.employees.get_employee(id).await?.is_none() {
        return Err(AppError::NotFound("Employee not found".into()));
    }
    ensure_unique(&state, &input, Some(id)).await?;

    let employee = state
        .employees
        .update_employee(id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;
    info!(employee_id = id, "Employee updated");

    Ok(HttpResponse::Ok().json(EmployeeEnvelope {
        success: true,
        message: "Employee updated successfully".into(),
        data: employee,
    }))
}

/// Delete Employee
///
/// Also removes every salary slip record of the employee. Their PDF files stay on disk.
#[utoipa::path(
    delete,
    path = "/api/delete-employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = EmployeeDeleted),
        (status = 403, description = "Caller is not Accounts", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_accounts()?;
    let id = path.into_inner();

    if !state.employees.delete_employee(id).await? {
        return Err(AppError::NotFound("Employee not found".into()));
    }
    let slips_removed = state.ledger.delete_all_for_employee(id).await?;
    info!(employee_id = id, slips_removed, "Employee deleted");

    Ok(HttpResponse::Ok().json(EmployeeDeleted {
        success: true,
        message: "Employee deleted successfully".into(),
    }))
}
