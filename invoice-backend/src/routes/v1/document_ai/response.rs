use serde::Serialize;

use crate::libs::documentai::{ExtractedLineItem, InvoiceData, TableItem};

#[derive(Serialize)]
pub struct PostExtractInvoice {
    pub message: String,
    #[serde(rename = "extractedData")]
    pub extracted_data: InvoiceData,
    #[serde(rename = "extractedTableData")]
    pub extracted_table_data: Vec<TableItem>,
    #[serde(rename = "extractedLineItems")]
    pub extracted_line_items: Vec<ExtractedLineItem>,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}
