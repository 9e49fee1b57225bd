use crate::api::employee::{EmployeeDeleted, EmployeeEnvelope};
use crate::model::account::AccountView;
use crate::model::employee::{Employee, EmployeeForm};
use crate::model::role::Role;
use crate::model::salary_slip::{GeneratedSlip, SlipSummary};
use crate::models::{AuthResponse, ErrorResponse, LoginReq, MessageResponse, SignupReq};
use crate::payroll::slip_request::SlipRequest;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Back-Office API",
        version = "1.0.0",
        description = r#"
## Payroll Back-Office

Employee records and monthly salary slips for a small organisation.

### Key Features
- **Accounts**
  - Sign up as `Admin` or `Accounts`, log in for a bearer token
- **Employee Management**
  - Add, edit, list and delete employees
- **Salary Slips**
  - Compute pay for the days worked, render a one-page PDF, keep a ledger of every slip

### Security
Everything under `/api` needs a **JWT Bearer** token.
Generating slips and changing employees is limited to the **Accounts** role.

### Response Format
Errors are always `{"success": false, "error": "..."}`.
"#,
    ),
    paths(
        crate::auth::handlers::signup,
        crate::auth::handlers::login,
        crate::api::account::list_accounts,

        crate::api::employee::add_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::salary_slip::generate_slip,
        crate::api::salary_slip::list_slips,
        crate::api::salary_slip::delete_slip
    ),
    components(
        schemas(
            Role,
            SignupReq,
            LoginReq,
            AuthResponse,
            AccountView,
            Employee,
            EmployeeForm,
            EmployeeEnvelope,
            EmployeeDeleted,
            SlipRequest,
            GeneratedSlip,
            SlipSummary,
            MessageResponse,
            ErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login and account listing"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Salary Slip", description = "Salary slip generation and ledger APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/signup",
            "/auth/login",
            "/api/users",
            "/api/add-employees",
            "/api/employees",
            "/api/edit-employees/{id}",
            "/api/delete-employees/{id}",
            "/api/salary-slip",
            "/api/salary-slips",
            "/api/salary-slips/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
