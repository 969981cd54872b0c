//! Form bodies and uploaded files.
//!
//! Browsers post forms with files as `multipart/form-data` while API clients post JSON objects.
//! [`FormBody`] accepts both and gives the handlers one shape to work with.

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde_json::{Map, Value};
use tokio::fs;

use invoice_corelib::{constants::ContentType, err::ErrResp, http::Json};

/// The form field of logo files.
pub const LOGO_FIELD: &'static str = "logo";
/// The stored key of logo file names.
pub const LOGO_FILENAME: &'static str = "logoFilename";
const LOGO_URL_PREFIX: &'static str = "/uploads/logos/";

/// An uploaded file.
pub struct UploadFile {
    /// The form field name.
    pub field: String,
    /// The file name from the client. May be empty when the browser sends an empty file input.
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A form body from a JSON object or a multipart form.
///
/// Multipart text fields are kept as strings. Use [`crate::libs::coerce`] to convert them.
pub struct FormBody {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadFile>,
}

impl FormBody {
    /// To take out the first file of the specified field.
    pub fn take_file(&mut self, field: &str) -> Option<UploadFile> {
        let index = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.remove(index))
    }
}

impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = ErrResp;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = match Multipart::from_request(req, state).await {
                Err(e) => return Err(ErrResp::ErrParam(Some(e.body_text()))),
                Ok(multipart) => multipart,
            };
            return read_multipart(multipart).await;
        }

        match Json::<Value>::from_request(req, state).await {
            Err(e) => Err(e),
            Ok(Json(Value::Object(fields))) => Ok(FormBody {
                fields,
                files: vec![],
            }),
            Ok(_) => Err(ErrResp::ErrParam(Some(
                "body must be a JSON object".to_string(),
            ))),
        }
    }
}

/// To create the upload folders if they do not exist. Failures are logged only.
pub fn ensure_upload_folders(paths: &[&str]) {
    const FN_NAME: &'static str = "ensure_upload_folders";

    for path in paths {
        if Path::new(path).is_dir() {
            continue;
        }
        if let Err(e) = std::fs::create_dir_all(path) {
            error!("[{}] create {} error: {}", FN_NAME, path, e);
        }
    }
}

/// To sanitize a client file name so that it is safe to be stored in a folder.
///
/// Path components are removed, white spaces become `_` and only ASCII letters, digits, `_`, `-`
/// and `.` are kept.
pub fn secure_filename(name: &str) -> String {
    let base = match name.rsplit(|c| c == '/' || c == '\\').next() {
        None => name,
        Some(base) => base,
    };
    let name: String = base
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
        .collect();
    name.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// To get the lower-case extension of the file name.
pub fn file_extension(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        None => None,
        Some((_, ext)) => match ext.len() {
            0 => None,
            _ => Some(ext.to_lowercase()),
        },
    }
}

/// To check if the extension of the file name is allowed.
pub fn is_allowed(name: &str, allowed_extensions: &[String]) -> bool {
    match file_extension(name) {
        None => false,
        Some(ext) => allowed_extensions.iter().any(|a| a.to_lowercase() == ext),
    }
}

/// The stored file name: `<tenant>_<YYYYmmddHHMMSSffffff>_<sanitized name>`.
pub fn stored_name(tenant_id: &str, now: &DateTime<Utc>, name: &str) -> String {
    let tenant = match secure_filename(tenant_id) {
        tenant if tenant.len() == 0 => "tenant".to_string(),
        tenant => tenant,
    };
    format!(
        "{}_{}_{}",
        tenant,
        now.format("%Y%m%d%H%M%S%6f"),
        secure_filename(name)
    )
}

/// `/uploads/logos/<file>` of the non-empty `logoFilename`.
pub fn logo_url(fields: &Map<String, Value>) -> Option<String> {
    match fields.get(LOGO_FILENAME) {
        Some(Value::String(name)) if name.len() > 0 => Some(format!("{}{}", LOGO_URL_PREFIX, name)),
        _ => None,
    }
}

/// To write an uploaded file into the folder.
pub async fn save_upload(folder: &str, file_name: &str, data: &[u8]) -> Result<(), ErrResp> {
    const FN_NAME: &'static str = "save_upload";

    let path = match upload_path(folder, file_name) {
        None => {
            error!("[{}] invalid file name {}", FN_NAME, file_name);
            return Err(ErrResp::ErrParam(Some("invalid file name".to_string())));
        }
        Some(path) => path,
    };
    if let Err(e) = fs::write(&path, data).await {
        error!("[{}] write {} error: {}", FN_NAME, path.display(), e);
        return Err(ErrResp::ErrUnknown(Some(format!("save file error: {}", e))));
    }
    Ok(())
}

/// To remove a stored file. A missing file is not an error and other failures are logged only.
pub async fn remove_upload(folder: &str, file_name: &str) {
    const FN_NAME: &'static str = "remove_upload";

    if file_name.len() == 0 {
        return;
    }
    let path = match upload_path(folder, file_name) {
        None => {
            warn!("[{}] skip invalid file name {}", FN_NAME, file_name);
            return;
        }
        Some(path) => path,
    };
    if let Err(e) = fs::remove_file(&path).await {
        match e.kind() {
            std::io::ErrorKind::NotFound => {
                warn!("[{}] {} not found", FN_NAME, path.display())
            }
            _ => error!("[{}] remove {} error: {}", FN_NAME, path.display(), e),
        }
    }
}

/// The path of `file_name` inside `folder`. Only a single plain component is accepted.
pub fn upload_path(folder: &str, file_name: &str) -> Option<PathBuf> {
    if file_name.len() == 0 || secure_filename(file_name) != file_name {
        return None;
    }
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(Path::new(folder).join(file_name)),
        _ => None,
    }
}

fn is_multipart(req: &Request) -> bool {
    match req.headers().get(header::CONTENT_TYPE) {
        None => false,
        Some(value) => match value.to_str() {
            Err(_) => false,
            Ok(value) => value.starts_with(ContentType::MULTIPART),
        },
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormBody, ErrResp> {
    let mut fields = Map::new();
    let mut files = vec![];
    loop {
        let field = match multipart.next_field().await {
            Err(e) => return Err(ErrResp::ErrParam(Some(e.body_text()))),
            Ok(None) => break,
            Ok(Some(field)) => field,
        };
        let name = match field.name() {
            None => continue,
            Some(name) => name.to_string(),
        };
        let file_name = field.file_name().map(|n| n.to_string());
        match file_name {
            None => match field.text().await {
                Err(e) => return Err(ErrResp::ErrParam(Some(e.body_text()))),
                Ok(text) => {
                    fields.insert(name, Value::String(text));
                }
            },
            Some(file_name) => {
                let content_type = field.content_type().map(|c| c.to_string());
                let data = match field.bytes().await {
                    Err(e) => return Err(ErrResp::ErrParam(Some(e.body_text()))),
                    Ok(data) => data,
                };
                files.push(UploadFile {
                    field: name,
                    file_name,
                    content_type,
                    data,
                });
            }
        }
    }
    Ok(FormBody { fields, files })
}
