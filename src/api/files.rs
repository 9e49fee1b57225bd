use std::path::Path;

use actix_files::NamedFile;
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use tracing::debug;

use crate::{config::Config, error::AppError, store::artifacts::resolve_in};

async fn open_slip(
    config: &Config,
    file: &str,
    disposition: DispositionType,
) -> Result<NamedFile, AppError> {
    let path = resolve_in(Path::new(&config.salary_slip_dir), file)
        .ok_or_else(|| AppError::Validation("Invalid file name".into()))?;

    let named = NamedFile::open_async(&path).await.map_err(|e| {
        debug!(path = %path.display(), error = %e, "Salary slip file not available");
        AppError::NotFound("File not found".into())
    })?;

    Ok(named.set_content_disposition(ContentDisposition {
        disposition,
        parameters: vec![DispositionParam::Filename(file.to_string())],
    }))
}

/// Serves a rendered slip for viewing in the browser.
pub async fn view_slip(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<NamedFile, AppError> {
    open_slip(&config, &path.into_inner(), DispositionType::Inline).await
}

/// Serves a rendered slip as a download.
pub async fn download_slip(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<NamedFile, AppError> {
    open_slip(&config, &path.into_inner(), DispositionType::Attachment).await
}

#[cfg(test)]
mod tests {
    use crate::api::testing::with_peer;
    use crate::config::Config;
    use crate::state::testing::memory_state;
    use actix_web::{
        http::{StatusCode, header::CONTENT_DISPOSITION},
        test,
    };
    use tempfile::tempdir;

    #[actix_web::test]
    async fn download_sets_attachment_and_rejects_bad_names() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Ravi_Kumar_May_2025.pdf"), b"%PDF-1.5\n").unwrap();
        let (state, _) = memory_state(dir.path());
        let config = Config {
            salary_slip_dir: dir.path().to_string_lossy().into_owned(),
            ..Config::for_tests()
        };
        let app = test_app!(state, config);

        let req = with_peer(test::TestRequest::get())
            .uri("/download/Ravi_Kumar_May_2025.pdf")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().starts_with("attachment"));

        let req = with_peer(test::TestRequest::get())
            .uri("/salary_slips/Ravi_Kumar_May_2025.pdf")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().starts_with("inline"));

        let req = with_peer(test::TestRequest::get())
            .uri("/download/missing.pdf")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = with_peer(test::TestRequest::get())
            .uri("/download/..secret.pdf")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
