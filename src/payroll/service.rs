//! Salary slip pipeline and ledger operations.
//!
//! Generation runs validate, look up, compute, render, store, record. The artifact write
//! and the ledger insert are two separate steps: if the insert fails the PDF stays on disk
//! with no record pointing at it. That gap is accepted.

use tracing::{debug, error, info, warn};

use super::calculator::{compute, format_amount};
use super::renderer::{SlipIdentity, SlipSheet, render};
use super::slip_request::SlipRequest;
use crate::error::AppError;
use crate::model::salary_slip::{GeneratedSlip, NewSlipRecord, SlipSummary};
use crate::state::AppState;

pub async fn generate_salary_slip(
    state: &AppState,
    request: SlipRequest,
) -> Result<GeneratedSlip, AppError> {
    let request = request.validate()?;

    let employee = state
        .employees
        .get_employee(request.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    let totals = compute(
        employee.base_salary,
        request.days_worked,
        &request.earnings,
        &request.deductions,
    );

    let sheet = SlipSheet {
        identity: SlipIdentity::from(&employee),
        month: request.month.clone(),
        days_worked: request.days_worked,
        earnings: request.earnings,
        deductions: request.deductions,
        totals,
    };
    let rendered = render(&sheet).map_err(|e| AppError::Internal(e.to_string()))?;

    let locator = state
        .artifacts
        .store(&rendered.file_name, rendered.bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let record = state
        .ledger
        .record_slip(NewSlipRecord {
            employee_id: employee.id,
            employee_name: employee.username.clone(),
            month: request.month,
            days_worked: request.days_worked,
            net_salary: totals.net_payable,
            artifact_path: locator,
        })
        .await
        .map_err(|e| {
            error!(employee_id = employee.id, error = %e, "Slip artifact written but not recorded");
            AppError::from(e)
        })?;

    info!(
        slip_id = record.id,
        employee_id = employee.id,
        net_payable = totals.net_payable,
        "Salary slip generated"
    );

    Ok(GeneratedSlip {
        id: record.id,
        pdf_url: state.artifacts.public_url(&record.artifact_path),
    })
}

pub async fn list_slips(state: &AppState) -> Result<Vec<SlipSummary>, AppError> {
    let slips = state.ledger.list_slips().await?;
    Ok(slips
        .into_iter()
        .map(|slip| SlipSummary {
            id: slip.id,
            pdf_url: state.artifacts.public_url(&slip.artifact_path),
            user: slip.employee_name,
            month: slip.month,
            days: slip.days_worked,
            salary: format_amount(slip.net_salary),
        })
        .collect())
}

/// Removes the record, then tries to remove its artifact. Artifact failures are only logged.
///
/// Slips for the same name and month share one file, so the file stays while any other
/// record still points at it.
pub async fn delete_slip(state: &AppState, id: u64) -> Result<(), AppError> {
    let slip = state
        .ledger
        .delete_slip(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Salary slip not found".into()))?;

    match state.ledger.artifact_in_use(&slip.artifact_path).await {
        Ok(true) => {
            debug!(
                slip_id = id,
                path = %slip.artifact_path,
                "Salary slip file still referenced, kept"
            );
        }
        Ok(false) => {
            if let Err(e) = state.artifacts.remove(&slip.artifact_path).await {
                warn!(slip_id = id, error = %e, "Failed to delete salary slip file");
            }
        }
        Err(e) => {
            warn!(slip_id = id, error = %e, "Could not check salary slip file references, kept");
        }
    }

    info!(slip_id = id, "Salary slip deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::model::employee::EmployeeForm;
    use crate::state::testing::{memory_state, memory_state_with};
    use crate::store::EmployeeDirectory;
    use crate::store::memory::BrokenArtifactStore;
    use serde_json::json;
    use tempfile::tempdir;

    async fn hire(directory: &dyn EmployeeDirectory, name: &str, code: &str) -> u64 {
        let form: EmployeeForm = serde_json::from_value(json!({
            "username": name,
            "email": format!("{code}@company.com"),
            "baseSalary": 26000,
            "employeeid": code
        }))
        .unwrap();
        directory
            .create_employee(form.into_input().unwrap())
            .await
            .unwrap()
            .id
    }

    fn request(value: serde_json::Value) -> SlipRequest {
        serde_json::from_value(value).unwrap()
    }

    #[actix_web::test]
    async fn generated_slip_round_trips_through_ledger() {
        let dir = tempdir().unwrap();
        let (state, _store) = memory_state(dir.path());
        let id = hire(state.employees.as_ref(), "ravi", "EMP-1").await;

        let slip = generate_salary_slip(
            &state,
            request(json!({"userId": id, "month": "March 2025", "daysWorked": 26})),
        )
        .await
        .unwrap();
        assert_eq!(slip.pdf_url, "/salary_slips/ravi_March_2025.pdf");

        let listed = list_slips(&state).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, slip.id);
        assert_eq!(listed[0].salary, "26000.00");
        assert_eq!(listed[0].user, "ravi");
        assert_eq!(listed[0].pdf_url, slip.pdf_url);

        let bytes = std::fs::read(dir.path().join("ravi_March_2025.pdf")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[actix_web::test]
    async fn duplicate_periods_are_kept() {
        let dir = tempdir().unwrap();
        let (state, store) = memory_state(dir.path());
        let id = hire(state.employees.as_ref(), "ravi", "EMP-1").await;

        for _ in 0..2 {
            generate_salary_slip(
                &state,
                request(json!({"userId": id, "month": "March 2025", "daysWorked": 20})),
            )
            .await
            .unwrap();
        }
        assert_eq!(store.slip_count(), 2);
    }

    #[actix_web::test]
    async fn deleting_one_duplicate_keeps_the_shared_file() {
        let dir = tempdir().unwrap();
        let (state, store) = memory_state(dir.path());
        let id = hire(state.employees.as_ref(), "ravi", "EMP-1").await;

        let mut slips = Vec::new();
        for _ in 0..2 {
            slips.push(
                generate_salary_slip(
                    &state,
                    request(json!({"userId": id, "month": "March 2025", "daysWorked": 20})),
                )
                .await
                .unwrap(),
            );
        }
        assert_eq!(slips[0].pdf_url, slips[1].pdf_url);
        let file = dir.path().join("ravi_March_2025.pdf");

        delete_slip(&state, slips[0].id).await.unwrap();
        assert!(file.exists());
        let listed = list_slips(&state).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, slips[1].id);

        delete_slip(&state, slips[1].id).await.unwrap();
        assert!(!file.exists());
        assert_eq!(store.slip_count(), 0);
    }

    #[actix_web::test]
    async fn unknown_employee_is_not_found() {
        let dir = tempdir().unwrap();
        let (state, store) = memory_state(dir.path());

        let err = generate_salary_slip(
            &state,
            request(json!({"userId": 99, "month": "March 2025", "daysWorked": 20})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.slip_count(), 0);
    }

    #[actix_web::test]
    async fn storage_failure_records_nothing() {
        let (state, store) = memory_state_with(Arc::new(BrokenArtifactStore));
        let id = hire(state.employees.as_ref(), "ravi", "EMP-1").await;

        let err = generate_salary_slip(
            &state,
            request(json!({"userId": id, "month": "March 2025", "daysWorked": 20})),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.slip_count(), 0);
    }

    #[actix_web::test]
    async fn delete_survives_missing_artifact() {
        let dir = tempdir().unwrap();
        let (state, store) = memory_state(dir.path());
        let id = hire(state.employees.as_ref(), "ravi", "EMP-1").await;
        let slip = generate_salary_slip(
            &state,
            request(json!({"userId": id, "month": "April 2025", "daysWorked": 26})),
        )
        .await
        .unwrap();

        let file = dir.path().join("ravi_April_2025.pdf");
        std::fs::remove_file(&file).unwrap();

        delete_slip(&state, slip.id).await.unwrap();
        assert_eq!(store.slip_count(), 0);
        assert!(!Path::new(&file).exists());

        let err = delete_slip(&state, slip.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn delete_survives_failing_artifact_store() {
        let (state, store) = memory_state_with(Arc::new(BrokenArtifactStore));
        let record = state
            .ledger
            .record_slip(NewSlipRecord {
                employee_id: 1,
                employee_name: "ravi".into(),
                month: "May".into(),
                days_worked: 26.0,
                net_salary: 100.0,
                artifact_path: "/nowhere/ravi_May.pdf".into(),
            })
            .await
            .unwrap();

        delete_slip(&state, record.id).await.unwrap();
        assert_eq!(store.slip_count(), 0);
    }
}
