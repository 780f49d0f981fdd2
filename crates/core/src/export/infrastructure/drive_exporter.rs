use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

use crate::export::domain::exporter::{ExportError, Exporter, FolderId};

pub const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3/files";
pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Environment variable consulted for an access token when none is configured.
pub const TOKEN_ENV_VAR: &str = "FRAMECAST_DRIVE_TOKEN";

const BOUNDARY: &str = "framecast-upload-boundary";

/// Uploads into Google Drive through the v3 REST API.
///
/// Takes an already-issued OAuth access token; obtaining one is left to
/// the caller.
pub struct DriveExporter {
    client: Client,
    access_token: String,
    api_url: String,
    upload_url: String,
}

impl DriveExporter {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            api_url: DRIVE_API_URL.to_string(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
        }
    }

    /// Points the exporter at another Drive-compatible endpoint.
    pub fn with_endpoints(mut self, api_url: &str, upload_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.upload_url = upload_url.trim_end_matches('/').to_string();
        self
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, ExportError> {
        let response = request.bearer_auth(&self.access_token).send()?;
        let status = response.status();
        let body = response.bytes()?;

        if !status.is_success() {
            return Err(ExportError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ExportError::Response(e.to_string()))
    }
}

/// JSON metadata Drive expects for a new file or folder.
pub fn file_metadata(title: &str, mime_type: &str, parent: Option<&FolderId>) -> Value {
    let mut metadata = json!({ "name": title, "mimeType": mime_type });
    if let Some(folder) = parent {
        metadata["parents"] = json!([folder.0]);
    }
    metadata
}

/// Builds a `multipart/related` body: JSON metadata part, then content part.
pub fn multipart_related_body(metadata: &Value, mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn response_id(value: &Value) -> Result<String, ExportError> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ExportError::Response(format!("missing file id in {value}")))
}

impl Exporter for DriveExporter {
    fn create_folder(&mut self, title: &str) -> Result<FolderId, ExportError> {
        let metadata = file_metadata(title, FOLDER_MIME_TYPE, None);
        let request = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(metadata.to_string());

        let id = response_id(&self.send(request)?)?;
        log::info!("Created Drive folder '{title}' ({id})");
        Ok(FolderId(id))
    }

    fn upload_file(
        &mut self,
        parent: Option<&FolderId>,
        title: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<(), ExportError> {
        let metadata = file_metadata(title, mime_type, parent);
        let request = self
            .client
            .post(format!("{}?uploadType=multipart", self.upload_url))
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(multipart_related_body(&metadata, mime_type, bytes));

        let id = response_id(&self.send(request)?)?;
        log::debug!("Uploaded '{title}' to Drive ({id}, {} bytes)", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_metadata() {
        let metadata = file_metadata("Extracted Frames", FOLDER_MIME_TYPE, None);
        assert_eq!(metadata["name"], "Extracted Frames");
        assert_eq!(metadata["mimeType"], FOLDER_MIME_TYPE);
        assert!(metadata.get("parents").is_none());
    }

    #[test]
    fn test_file_metadata_names_parent() {
        let parent = FolderId("abc123".to_string());
        let metadata = file_metadata("frame0.png", "image/png", Some(&parent));
        assert_eq!(metadata["parents"], json!(["abc123"]));
    }

    #[test]
    fn test_multipart_body_layout() {
        let metadata = file_metadata("frame0.png", "image/png", None);
        let body = multipart_related_body(&metadata, "image/png", b"\x89PNG");
        let text = String::from_utf8_lossy(&body);

        assert!(text.starts_with(&format!("--{BOUNDARY}\r\n")));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8\r\n\r\n{"));
        assert!(text.contains("\"name\":\"frame0.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\n"));
        assert!(text.ends_with(&format!("\r\n--{BOUNDARY}--\r\n")));
        assert!(body.windows(4).any(|w| w == b"\x89PNG"));
    }

    #[test]
    fn test_response_id() {
        assert_eq!(response_id(&json!({ "id": "xyz" })).unwrap(), "xyz");
        assert!(matches!(
            response_id(&json!({ "kind": "drive#file" })),
            Err(ExportError::Response(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_http_error() {
        let mut exporter = DriveExporter::new("token")
            .with_endpoints("http://127.0.0.1:9/files", "http://127.0.0.1:9/upload");
        assert!(matches!(
            exporter.create_folder("Extracted Frames"),
            Err(ExportError::Http(_))
        ));
    }
}
