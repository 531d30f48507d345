// server/src/web/handlers/upload_handlers.rs

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::{StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::UploadLimits;
use crate::errors::{AppError, Result as AppResult};
use crate::services::assets::UploadFile;
use crate::services::uploads::{self, page_size};
use crate::state::AppState;

pub const SINGLE_FILE_FIELD: &str = "file";
pub const MULTIPLE_FILES_FIELD: &str = "files";

fn multipart_error(err: actix_multipart::MultipartError) -> AppError {
  AppError::Validation(format!("Malformed multipart body: {}", err))
}

/// Buffers every file part named `field_name`. A file part carries a filename
/// in its content disposition; plain form values and other fields are drained
/// and ignored.
async fn read_files(
  mut payload: Multipart,
  field_name: &str,
  max_files: usize,
  max_file_bytes: usize,
) -> AppResult<Vec<UploadFile>> {
  let mut files = Vec::new();

  while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
    let filename = field
      .content_disposition()
      .and_then(|cd| cd.get_filename())
      .map(str::to_string);
    if field.name() != Some(field_name) || filename.is_none() {
      while field.next().await.is_some() {}
      continue;
    }
    if files.len() == max_files {
      return Err(AppError::Validation(format!("At most {} files can be uploaded at once", max_files)));
    }

    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
      if bytes.len() + chunk.len() > max_file_bytes {
        return Err(AppError::PayloadTooLarge(format!(
          "File exceeds the {} byte limit",
          max_file_bytes
        )));
      }
      bytes.extend_from_slice(&chunk);
    }

    debug!(?filename, size = bytes.len(), "Buffered uploaded file.");
    files.push(UploadFile {
      filename,
      content_type,
      bytes,
    });
  }

  Ok(files)
}

fn limits(app_state: &AppState) -> UploadLimits {
  app_state.config.upload_limits
}

#[instrument(name = "handler::upload_single", skip(app_state, payload))]
pub async fn upload_single_handler(app_state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, AppError> {
  let limits = limits(&app_state);
  let mut files = read_files(payload, SINGLE_FILE_FIELD, 1, limits.max_file_bytes).await?;
  let Some(file) = files.pop() else {
    return Err(AppError::NotFound("No file was uploaded".to_string()));
  };

  let url = uploads::store_one(app_state.asset_store.as_ref(), app_state.uploads.as_ref(), file).await?;
  Ok(HttpResponse::Ok().json(json!({ "url": url })))
}

#[instrument(name = "handler::upload_multiple", skip(app_state, payload))]
pub async fn upload_multiple_handler(
  app_state: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let limits = limits(&app_state);
  let files = read_files(payload, MULTIPLE_FILES_FIELD, limits.max_files, limits.max_file_bytes).await?;
  if files.is_empty() {
    return Err(AppError::NotFound("No files were uploaded".to_string()));
  }

  let urls = uploads::store_many(app_state.asset_store.as_ref(), app_state.uploads.as_ref(), files).await?;
  Ok(HttpResponse::Ok().json(json!({ "urls": urls })))
}

#[derive(Debug, Deserialize)]
pub struct UploadHistoryQuery {
  pub cursor: Option<String>,
  pub limit: Option<String>,
}

#[instrument(name = "handler::list_uploads", skip(app_state))]
pub async fn list_uploads_handler(
  app_state: web::Data<AppState>,
  query: web::Query<UploadHistoryQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let cursor = match query.cursor.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
    Some(raw) => Some(
      Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid cursor '{}'", raw)))?,
    ),
    None => None,
  };
  let limit = page_size(query.limit.and_then(|l| l.trim().parse::<i64>().ok()));

  let page = uploads::list_uploads(app_state.uploads.as_ref(), cursor, limit).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
  use crate::errors::AppError;
  use crate::models::Upload;
  use crate::services::assets::StoredAsset;
  use crate::test_support::MockState;
  use crate::web::configure_app_routes;
  use actix_web::http::StatusCode;
  use actix_web::{test, web, App};
  use chrono::Utc;
  use serde_json::Value as JsonValue;
  use uuid::Uuid;

  const BOUNDARY: &str = "----storefront-test-boundary";

  /// `(field name, filename, content)` parts encoded as multipart/form-data.
  fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
      body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
      match filename {
        Some(filename) => body.extend_from_slice(
          format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
            name, filename
          )
          .as_bytes(),
        ),
        None => body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes()),
      }
      body.extend_from_slice(content);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
  }

  fn upload_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
      .uri(uri)
      .insert_header(("content-type", format!("multipart/form-data; boundary={}", BOUNDARY)))
      .set_payload(body)
  }

  fn stored_upload(url: String) -> Upload {
    Upload {
      id: Uuid::new_v4(),
      url,
      created_at: Utc::now(),
    }
  }

  #[actix_web::test]
  async fn single_upload_answers_its_url() {
    let mut mocks = MockState::new();
    mocks.asset_store.expect_upload().once().returning(|file| {
      assert_eq!(file.filename.as_deref(), Some("shirt.png"));
      Ok(StoredAsset {
        secure_url: "https://cdn.example.com/uploads/shirt.png".to_string(),
        public_id: "uploads/shirt".to_string(),
      })
    });
    mocks.uploads.expect_record().once().returning(|url| Ok(stored_upload(url)));

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let body = multipart_body(&[("file", Some("shirt.png"), &b"\x89PNG"[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: JsonValue = test::read_body_json(resp).await;
    assert_eq!(json["url"], "https://cdn.example.com/uploads/shirt.png");
  }

  #[actix_web::test]
  async fn missing_file_is_not_found() {
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(MockState::new().build()))
        .configure(configure_app_routes),
    )
    .await;
    let body = multipart_body(&[("caption", None, &b"hello"[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: JsonValue = test::read_body_json(resp).await;
    assert_eq!(json["message"], "No file was uploaded");
  }

  #[actix_web::test]
  async fn text_value_in_file_field_is_not_a_file() {
    let mut mocks = MockState::new();
    mocks.asset_store.expect_upload().never();
    mocks.uploads.expect_record().never();

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let body = multipart_body(&[("file", None, &b"not an image"[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: JsonValue = test::read_body_json(resp).await;
    assert_eq!(json["message"], "No file was uploaded");
  }

  #[actix_web::test]
  async fn oversized_file_is_rejected() {
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(MockState::new().build()))
        .configure(configure_app_routes),
    )
    .await;
    // The test configuration allows 1024 bytes per file.
    let big = vec![7u8; 2048];
    let body = multipart_body(&[("file", Some("big.png"), &big[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
  }

  #[actix_web::test]
  async fn too_many_files_is_a_bad_request() {
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(MockState::new().build()))
        .configure(configure_app_routes),
    )
    .await;
    let parts: Vec<(&str, Option<&str>, &[u8])> = (0..4).map(|_| ("files", Some("a.png"), &b"x"[..])).collect();
    let resp = test::call_service(&app, upload_request("/api/v1/upload/multiple", multipart_body(&parts)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn multiple_upload_answers_urls() {
    let mut mocks = MockState::new();
    mocks.asset_store.expect_upload().times(2).returning(|file| {
      Ok(StoredAsset {
        secure_url: format!("https://cdn.example.com/{}", file.filename.unwrap_or_default()),
        public_id: "id".to_string(),
      })
    });
    mocks.uploads.expect_record().never();
    mocks
      .uploads
      .expect_record_many()
      .once()
      .returning(|urls| Ok(urls.into_iter().map(stored_upload).collect()));

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let body = multipart_body(&[("files", Some("a.png"), &b"a"[..]), ("files", Some("b.png"), &b"b"[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload/multiple", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: JsonValue = test::read_body_json(resp).await;
    assert_eq!(json["urls"][0], "https://cdn.example.com/a.png");
    assert_eq!(json["urls"][1], "https://cdn.example.com/b.png");
  }

  #[actix_web::test]
  async fn asset_store_failure_is_bad_gateway() {
    let mut mocks = MockState::new();
    mocks
      .asset_store
      .expect_upload()
      .returning(|_| Err(AppError::AssetStore("quota exceeded".to_string())));

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let body = multipart_body(&[("file", Some("a.png"), &b"a"[..])]);
    let resp = test::call_service(&app, upload_request("/api/v1/upload", body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  }

  #[actix_web::test]
  async fn history_passes_cursor_and_clamped_limit() {
    let cursor = Uuid::new_v4();
    let anchor = Utc::now();
    let mut mocks = MockState::new();
    mocks.uploads.expect_created_at_of().returning(move |_| Ok(Some(anchor)));
    mocks
      .uploads
      .expect_page()
      .withf(move |after, limit| *after == Some((anchor, cursor)) && *limit == 100)
      .returning(|_, _| Ok(vec![stored_upload("https://cdn.example.com/a.png".to_string())]));

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let req = test::TestRequest::get()
      .uri(&format!("/api/v1/upload?cursor={}&limit=500", cursor))
      .to_request();
    let json: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["uploads"][0]["url"], "https://cdn.example.com/a.png");
    assert!(json["uploads"][0]["createdAt"].is_string());
    assert!(json["nextCursor"].is_null());
  }

  #[actix_web::test]
  async fn unknown_cursor_is_a_bad_request() {
    let cursor = Uuid::new_v4();
    let mut mocks = MockState::new();
    mocks.uploads.expect_created_at_of().once().returning(|_| Ok(None));
    mocks.uploads.expect_page().never();

    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(mocks.build()))
        .configure(configure_app_routes),
    )
    .await;
    let req = test::TestRequest::get()
      .uri(&format!("/api/v1/upload?cursor={}", cursor))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: JsonValue = test::read_body_json(resp).await;
    assert_eq!(json["message"], format!("Unknown cursor {}", cursor));
  }

  #[actix_web::test]
  async fn malformed_cursor_is_a_bad_request() {
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(MockState::new().build()))
        .configure(configure_app_routes),
    )
    .await;
    let req = test::TestRequest::get().uri("/api/v1/upload?cursor=nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
