//! Google Document AI invoice extraction.

use std::{path::Path, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use log::{error, info};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::{Value, json};

use invoice_corelib::err::ErrResp;

use super::config::DocumentAi as DocumentAiConfig;

pub mod mapping;
pub mod token;

pub use mapping::{ExtractedLineItem, InvoiceData, ProcessResponse, TableItem, map_invoice, to_table};
pub use token::TokenSource;

/// Document AI processor client.
pub struct Client {
    http: HttpClient,
    project_id: String,
    location: String,
    processor_id: String,
    token: Option<TokenSource>,
    extraction_log_path: Option<String>,
}

const REQ_TIMEOUT: u64 = 55;

impl Client {
    /// To create a client from the configuration.
    ///
    /// Returns `Ok(None)` if the project, location or processor is missing.
    pub fn new(conf: &DocumentAiConfig) -> Result<Option<Self>, String> {
        let (project_id, location, processor_id) = match (
            conf.project_id.as_ref(),
            conf.location.as_ref(),
            conf.processor_id.as_ref(),
        ) {
            (Some(p), Some(l), Some(id)) if p.len() > 0 && l.len() > 0 && id.len() > 0 => {
                (p.clone(), l.clone(), id.clone())
            }
            _ => return Ok(None),
        };
        let token = match conf.access_token.as_ref() {
            Some(token) => Some(TokenSource::Static(token.clone())),
            None => match conf.credentials_file.as_ref() {
                None => None,
                Some(file) => {
                    let content = match std::fs::read_to_string(file) {
                        Err(e) => return Err(format!("read credentials {} error: {}", file, e)),
                        Ok(content) => content,
                    };
                    Some(TokenSource::from_key_json(content.as_str())?)
                }
            },
        };
        let http = match HttpClient::builder()
            .timeout(Duration::from_secs(REQ_TIMEOUT))
            .build()
        {
            Err(e) => return Err(format!("create HTTP client error: {}", e)),
            Ok(http) => http,
        };
        Ok(Some(Client {
            http,
            project_id,
            location,
            processor_id,
            token,
            extraction_log_path: conf.extraction_log_path.clone(),
        }))
    }

    /// The `:process` URL of the processor.
    pub fn process_url(&self) -> String {
        format!(
            "https://{}/v1/projects/{}/locations/{}/processors/{}:process",
            api_host(self.location.as_str()),
            self.project_id,
            self.location,
            self.processor_id
        )
    }

    /// To process the document and returns the raw response.
    pub async fn process(&self, content: &[u8], mime_type: &str) -> Result<Value, ErrResp> {
        let token = match self.token.as_ref() {
            None => {
                let e = "Document AI credentials are not configured".to_string();
                return Err(ErrResp::ErrRsc(Some(e)));
            }
            Some(token) => token.token(&self.http).await?,
        };
        let body = json!({
            "rawDocument": {
                "content": STANDARD.encode(content),
                "mimeType": mime_type,
            }
        });
        let req = match self
            .http
            .post(self.process_url())
            .bearer_auth(token)
            .json(&body)
            .build()
        {
            Err(e) => {
                let e = format!("generate process request error: {}", e);
                return Err(ErrResp::ErrRsc(Some(e)));
            }
            Ok(req) => req,
        };
        let resp = match self.http.execute(req).await {
            Err(e) => {
                let e = format!("execute process request error: {}", e);
                return Err(ErrResp::ErrIntMsg(Some(e)));
            }
            Ok(resp) => resp,
        };
        if resp.status() != StatusCode::OK {
            let e = format!("execute process request with status: {}", resp.status());
            return Err(ErrResp::ErrIntMsg(Some(e)));
        }
        match resp.json::<Value>().await {
            Err(e) => {
                let e = format!("read process response error: {}", e);
                Err(ErrResp::ErrIntMsg(Some(e)))
            }
            Ok(body) => Ok(body),
        }
    }

    /// To keep the raw response in the extraction log folder if configured. Errors are logged
    /// only.
    pub async fn save_extraction_log(&self, raw: &Value) {
        const FN_NAME: &'static str = "save_extraction_log";

        let folder = match self.extraction_log_path.as_ref() {
            None => return,
            Some(folder) => folder,
        };
        let file_name = format!(
            "gcp_extraction_raw_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S_%6f")
        );
        let path = Path::new(folder).join(file_name);
        let content = match serde_json::to_string_pretty(raw) {
            Err(e) => {
                error!("[{}] serialize error: {}", FN_NAME, e);
                return;
            }
            Ok(content) => content,
        };
        match tokio::fs::write(&path, content).await {
            Err(e) => error!("[{}] write {} error: {}", FN_NAME, path.display(), e),
            Ok(_) => info!("[{}] raw extraction saved to {}", FN_NAME, path.display()),
        }
    }
}

/// The API host of the location. `us` and `eu` use the global host.
pub fn api_host(location: &str) -> String {
    match location {
        "us" | "eu" => "documentai.googleapis.com".to_string(),
        _ => format!("{}-documentai.googleapis.com", location),
    }
}
