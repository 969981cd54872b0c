use axum::{extract::State, response::IntoResponse};
use log::{error, info};

use invoice_corelib::{err::ErrResp, http::Json};

use super::response;
use crate::{
    libs::{
        documentai::{self, ProcessResponse},
        form::{self, FormBody},
    },
    routes::State as AppState,
};

const INVOICE_FIELD: &'static str = "invoice";
const DEF_MIME_TYPE: &'static str = "application/pdf";

/// `POST /api/document-ai/extract-invoice`
pub async fn post_extract_invoice(
    State(state): State<AppState>,
    mut body: FormBody,
) -> impl IntoResponse {
    const FN_NAME: &'static str = "post_extract_invoice";

    let file = match body.take_file(INVOICE_FIELD) {
        None => {
            return Err(ErrResp::ErrParam(Some(
                "No invoice file provided".to_string(),
            )));
        }
        Some(file) => file,
    };
    if file.file_name.len() == 0 {
        return Err(ErrResp::ErrParam(Some("No selected file".to_string())));
    }
    let client = match state.documentai.as_ref() {
        None => {
            return Err(ErrResp::ErrRsc(Some(
                "Document AI processor is not configured".to_string(),
            )));
        }
        Some(client) => client,
    };

    let mime_type = mime_type(file.content_type.as_deref(), file.file_name.as_str());
    info!(
        "[{}] process {} ({}, {} bytes)",
        FN_NAME,
        file.file_name,
        mime_type,
        file.data.len()
    );
    let raw = client.process(&file.data, mime_type.as_str()).await?;
    client.save_extraction_log(&raw).await;

    let document = match serde_json::from_value::<ProcessResponse>(raw) {
        Err(e) => {
            error!("[{}] parse response error: {}", FN_NAME, e);
            return Err(ErrResp::ErrIntMsg(Some(format!(
                "parse Document AI response error: {}",
                e
            ))));
        }
        Ok(resp) => match resp.document {
            None => {
                return Err(ErrResp::ErrParam(Some(
                    "No invoice data could be extracted by Google AI.".to_string(),
                )));
            }
            Some(document) => document,
        },
    };

    let data = documentai::map_invoice(&document);
    Ok(Json(response::PostExtractInvoice {
        message: "Invoice data extracted successfully via Google AI".to_string(),
        extracted_table_data: documentai::to_table(&data),
        extracted_line_items: data.line_items.clone(),
        extracted_data: data,
        raw_text: document.text,
    }))
}

/// The MIME type from the form part, or guessed from the file extension.
fn mime_type(content_type: Option<&str>, file_name: &str) -> String {
    match content_type {
        Some(content_type) if content_type.len() > 0 && content_type != "application/octet-stream" => {
            content_type.to_string()
        }
        _ => match form::file_extension(file_name).as_deref() {
            Some("png") => "image/png".to_string(),
            Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
            Some("gif") => "image/gif".to_string(),
            Some("tif") | Some("tiff") => "image/tiff".to_string(),
            _ => DEF_MIME_TYPE.to_string(),
        },
    }
}
