//! Document endpoints: upload, list, detail, analyze, delete.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeResponse, DeleteDocumentResponse, Document, DocumentDetailResponse, UploadRequest,
    UploadResponse,
};
use crate::services::DocumentService;

/// Maximum accepted document size in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// Largest text field (`fileName`, `mimeType`) we buffer.
const MAX_TEXT_FIELD_BYTES: usize = 1024;

/// Read the multipart upload form.
///
/// Fields: `file` (required, the document bytes), `fileName` (optional,
/// overrides the part's filename), `mimeType` (optional, overrides the
/// part's Content-Type). Unknown fields are drained and ignored.
pub async fn read_upload(mut payload: Multipart, limit: usize) -> AppResult<UploadRequest> {
    let mut data: Option<Vec<u8>> = None;
    let mut part_file_name: Option<String> = None;
    let mut part_mime_type: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let max_bytes = if name == "file" {
            limit
        } else {
            MAX_TEXT_FIELD_BYTES
        };

        if name == "file" {
            part_file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(|f| f.to_string());
            part_mime_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .filter(|m| m != "application/octet-stream");
        }

        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if buf.len() + chunk.len() > max_bytes {
                return Err(if name == "file" {
                    AppError::PayloadTooLarge(format!(
                        "Document exceeds the {} byte upload limit",
                        limit
                    ))
                } else {
                    AppError::InvalidInput(format!("Field '{}' is too long", name))
                });
            }
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => data = Some(buf),
            "fileName" => file_name = Some(text_field(&name, buf)?),
            "mimeType" => mime_type = Some(text_field(&name, buf)?),
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;
    let file_name = file_name
        .filter(|n| !n.trim().is_empty())
        .or(part_file_name)
        .unwrap_or_default();

    Ok(UploadRequest {
        file_name,
        data,
        mime_type: mime_type.filter(|m| !m.trim().is_empty()).or(part_mime_type),
    })
}

fn text_field(name: &str, buf: Vec<u8>) -> AppResult<String> {
    String::from_utf8(buf)
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::InvalidInput(format!("Field '{}' must be UTF-8 text", name)))
}

/// Upload a financial document.
///
/// Multipart form with a `file` part and optional `fileName` / `mimeType` text parts.
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "Documents",
    request_body(content_type = "multipart/form-data", description = "Document file"),
    responses(
        (status = 201, description = "Document stored", body = UploadResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 413, description = "Document too large", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn upload_document(
    auth: ApiKeyAuth,
    service: web::Data<DocumentService>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let request = read_upload(payload, limit.0).await?;
    let response = service.upload(&auth.caller, request).await?;
    Ok(HttpResponse::Created().json(response))
}

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "Documents",
    responses(
        (status = 200, description = "Documents", body = Vec<Document>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_documents(
    auth: ApiKeyAuth,
    service: web::Data<DocumentService>,
) -> AppResult<HttpResponse> {
    let documents = service.list(&auth.caller).await?;
    Ok(HttpResponse::Ok().json(documents))
}

/// Get a document with its latest analysis and metrics.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{document_id}",
    tag = "Documents",
    params(
        ("document_id" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Document detail", body = DocumentDetailResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn get_document(
    auth: ApiKeyAuth,
    service: web::Data<DocumentService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = service.detail(&auth.caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Analyze a document: extract text, summarize, and extract metrics.
///
/// Runs to completion within the request.
#[utoipa::path(
    post,
    path = "/api/v1/documents/{document_id}/analyze",
    tag = "Documents",
    params(
        ("document_id" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Analysis completed", body = AnalyzeResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Analysis already running", body = crate::error::ErrorResponse),
        (status = 500, description = "Analysis failed", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn analyze_document(
    auth: ApiKeyAuth,
    service: web::Data<DocumentService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let response = service.analyze(&auth.caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Request deletion of a document.
///
/// Ownership is checked but nothing is removed yet.
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{document_id}",
    tag = "Documents",
    params(
        ("document_id" = Uuid, Path, description = "Document UUID")
    ),
    responses(
        (status = 200, description = "Delete acknowledged", body = DeleteDocumentResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_document(
    auth: ApiKeyAuth,
    service: web::Data<DocumentService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let response = service.delete(&auth.caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Configure document routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/documents")
            .route(web::post().to(upload_document))
            .route(web::get().to(list_documents)),
    )
    .service(
        web::resource("/documents/{document_id}")
            .route(web::get().to(get_document))
            .route(web::delete().to(delete_document)),
    )
    .service(
        web::resource("/documents/{document_id}/analyze").route(web::post().to(analyze_document)),
    );
}
