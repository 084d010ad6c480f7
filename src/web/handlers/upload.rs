//! Upload, listing, and download handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::submission::{FileInfo, NewSubmission, UploadRecord, UploadedFile, MAX_AUTHORS};
use crate::web::dto::UploadResponse;
use crate::web::error::ApiError;

use super::AppState;

/// Build a Content-Disposition header value for a download.
fn content_disposition_header(filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Use RFC 5987 encoding for non-ASCII or special characters
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Fields collected from the multipart upload form.
#[derive(Default)]
struct UploadForm {
    full_name: Option<String>,
    authors: Vec<(usize, String)>,
    group: Option<String>,
    subject: Option<String>,
    title: Option<String>,
    program: Option<UploadedFile>,
    docx: Option<UploadedFile>,
}

impl UploadForm {
    /// Consume one multipart field.
    async fn take_field(
        &mut self,
        field: axum::extract::multipart::Field<'_>,
    ) -> Result<(), ApiError> {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            return Ok(());
        };

        match name.as_str() {
            "exeFile" | "docxFile" => {
                let original_name = field
                    .file_name()
                    .map(|f| f.to_string())
                    .ok_or_else(|| ApiError::bad_request(format!("{name} has no filename")))?;
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read {name}: {e}")))?
                    .to_vec();
                let file = UploadedFile {
                    original_name,
                    content,
                };
                if name == "exeFile" {
                    self.program = Some(file);
                } else {
                    self.docx = Some(file);
                }
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read {name}: {e}")))?;
                match name.as_str() {
                    "fullName" => self.full_name = Some(text),
                    "group" => self.group = Some(text),
                    "subject" => self.subject = Some(text),
                    "title" => self.title = Some(text),
                    _ => {
                        if let Some(index) = name.strip_prefix("author_") {
                            if let Ok(index) = index.parse::<usize>() {
                                self.authors.push((index, text));
                            }
                        }
                        // authorsCount and unknown fields are ignored
                    }
                }
            }
        }
        Ok(())
    }

    /// Turn the collected fields into a validated-enough submission input.
    fn into_submission(mut self) -> Result<NewSubmission, ApiError> {
        self.authors.sort_by_key(|(index, _)| *index);
        let mut authors: Vec<String> = self.authors.into_iter().map(|(_, name)| name).collect();
        if authors.is_empty() {
            if let Some(full_name) = self.full_name {
                authors.push(full_name);
            }
        }
        if authors.len() > MAX_AUTHORS {
            return Err(ApiError::bad_request(format!(
                "at most {MAX_AUTHORS} authors are allowed"
            )));
        }

        Ok(NewSubmission {
            authors,
            group: self.group.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            title: self.title,
            program: self
                .program
                .ok_or_else(|| ApiError::bad_request("exeFile is required"))?,
            docx: self
                .docx
                .ok_or_else(|| ApiError::bad_request("docxFile is required"))?,
        })
    }
}

/// POST /api/upload - Accept one coursework submission.
#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "Submission stored", body = UploadResponse),
        (status = 400, description = "Invalid submission"),
    ),
    tag = "uploads"
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        form.take_field(field).await?;
    }

    let new = form.into_submission()?;
    let record = state.submissions.upload(new)?;
    tracing::info!(
        author = %record.primary_author(),
        subject = %record.subject,
        "Submission stored"
    );

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        upload_info: record,
    }))
}

/// GET /api/uploads - List all submissions.
#[utoipa::path(
    get,
    path = "/api/uploads",
    responses(
        (status = 200, description = "All submission records", body = [UploadRecord]),
    ),
    tag = "uploads"
)]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UploadRecord>>, ApiError> {
    let records = state.submissions.list_all()?;
    Ok(Json(records))
}

/// GET /api/download/:author/:filename - Download one stored file.
#[utoipa::path(
    get,
    path = "/api/download/{author}/{filename}",
    params(
        ("author" = String, Path, description = "Primary author name"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "Submission or file not found"),
    ),
    tag = "uploads"
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((author, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = state.submissions.download_path(&author, &filename)?;
    let content = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", path.display(), e);
        ApiError::internal("Failed to read file")
    })?;

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// GET /api/file-info/:author/:filename - Stored file size and timestamps.
#[utoipa::path(
    get,
    path = "/api/file-info/{author}/{filename}",
    params(
        ("author" = String, Path, description = "Primary author name"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileInfo),
        (status = 404, description = "Submission or file not found"),
    ),
    tag = "uploads"
)]
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    Path((author, filename)): Path<(String, String)>,
) -> Result<Json<FileInfo>, ApiError> {
    let info = state.submissions.file_info(&author, &filename)?;
    Ok(Json(info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        let header = content_disposition_header("prog_2024.exe");
        assert_eq!(header, "attachment; filename=\"prog_2024.exe\"");
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let header = content_disposition_header("отчёт.docx");
        assert!(header.contains("filename*=UTF-8''"));
        assert!(header.starts_with("attachment;"));
    }

    #[test]
    fn test_content_disposition_quotes() {
        let header = content_disposition_header("we\"ird.exe");
        assert!(header.contains("filename=\"we_ird.exe\""));
    }
}
