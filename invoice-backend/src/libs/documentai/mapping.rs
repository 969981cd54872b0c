//! Mapping of Document AI invoice entities to expense form fields.

use chrono::NaiveDate;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The `:process` response.
#[derive(Default, Deserialize)]
pub struct ProcessResponse {
    pub document: Option<Document>,
}

/// The processed document.
#[derive(Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// An extracted entity or an entity property.
#[derive(Clone, Default, Deserialize)]
pub struct Entity {
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(rename = "mentionText")]
    pub mention_text: Option<String>,
    #[serde(rename = "normalizedValue")]
    pub normalized_value: Option<NormalizedValue>,
    #[serde(default)]
    pub properties: Vec<Entity>,
}

#[derive(Clone, Default, Deserialize)]
pub struct NormalizedValue {
    pub text: Option<String>,
    #[serde(rename = "moneyValue")]
    pub money_value: Option<Money>,
    #[serde(rename = "dateValue")]
    pub date_value: Option<DateValue>,
}

/// `google.type.Money`. `units` is an int64 and is encoded as a string in JSON.
#[derive(Clone, Default, Deserialize)]
pub struct Money {
    #[serde(default, deserialize_with = "deserialize_units")]
    pub units: i64,
    #[serde(default)]
    pub nanos: i32,
}

/// `google.type.Date`.
#[derive(Clone, Default, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
}

/// Mapped expense form fields. The field order is the order of the extracted table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvoiceData {
    #[serde(rename = "billNo")]
    pub bill_no: Option<String>,
    #[serde(rename = "billDate")]
    pub bill_date: Option<String>,
    pub supplier: Option<String>,
    #[serde(rename = "supplierGst")]
    pub supplier_gst: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
    #[serde(rename = "totalAmount")]
    pub total_amount: Option<f64>,
    #[serde(rename = "subTotalFromItems")]
    pub sub_total_from_items: Option<f64>,
    #[serde(rename = "taxAmount")]
    pub tax_amount: Option<f64>,
    #[serde(rename = "cgstAmount")]
    pub cgst_amount: Option<f64>,
    #[serde(rename = "sgstAmount")]
    pub sgst_amount: Option<f64>,
    #[serde(rename = "igstAmount")]
    pub igst_amount: Option<f64>,
    #[serde(rename = "cessAmount")]
    pub cess_amount: Option<f64>,
    pub narration: Option<String>,
    pub currency: String,
    #[serde(rename = "lineItems")]
    pub line_items: Vec<ExtractedLineItem>,
}

/// A product or service line.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedLineItem {
    pub description: Option<String>,
    #[serde(rename = "hsnCode")]
    pub hsn_code: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub subtotal: Option<f64>,
}

/// One row of the extracted field table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableItem {
    pub label: &'static str,
    pub value: Value,
}

const DATE_FORMATS: [&'static str; 7] = [
    "%d-%b-%Y", "%d/%m/%Y", "%Y-%m-%d", "%d-%b-%y", "%b %d, %Y", "%d %b %Y", "%m/%d/%Y",
];
const DEF_CURRENCY: &'static str = "INR";

/// To map the processed document to the expense form fields.
pub fn map_invoice(document: &Document) -> InvoiceData {
    let first = |entity_type: &str| {
        document
            .entities
            .iter()
            .find(|e| e.entity_type.as_str() == entity_type)
    };

    let mut data = InvoiceData {
        bill_no: first("invoice_id").and_then(field_text),
        bill_date: first("invoice_date").and_then(date_value),
        supplier: first("supplier_name").and_then(field_text),
        supplier_gst: first("supplier_tax_id").and_then(field_text),
        due_date: first("due_date").and_then(date_value),
        total_amount: first("total_amount").and_then(currency_value),
        sub_total_from_items: first("net_amount").and_then(currency_value),
        tax_amount: None,
        cgst_amount: None,
        sgst_amount: None,
        igst_amount: None,
        cess_amount: None,
        narration: None,
        currency: match first("currency").and_then(field_text) {
            Some(currency) if currency.len() > 0 => currency.to_uppercase(),
            _ => DEF_CURRENCY.to_string(),
        },
        line_items: vec![],
    };
    info!(
        "extracted totals: total={:?}, net={:?}",
        data.total_amount, data.sub_total_from_items
    );

    let mut cgst = 0.0;
    let mut sgst = 0.0;
    let mut igst = 0.0;
    let mut cess = 0.0;
    let mut items_sum = 0.0;
    for entity in document
        .entities
        .iter()
        .filter(|e| e.entity_type.as_str() == "line_item")
    {
        let description = property(entity, "line_item_description").and_then(field_text);
        let amount = property(entity, "line_item_amount").and_then(currency_value);
        debug!("line item: description={:?}, amount={:?}", description, amount);

        if let (Some(desc), Some(amount)) = (description.as_ref(), amount) {
            match tax_kind(desc.as_str()) {
                None => (),
                Some(TaxKind::Cgst) => {
                    cgst += amount;
                    continue;
                }
                Some(TaxKind::Sgst) => {
                    sgst += amount;
                    continue;
                }
                Some(TaxKind::Igst) => {
                    igst += amount;
                    continue;
                }
                Some(TaxKind::Cess) => {
                    cess += amount;
                    continue;
                }
            }
        }

        let mut item = ExtractedLineItem {
            description,
            subtotal: amount,
            ..Default::default()
        };
        for prop in entity.properties.iter() {
            match prop.entity_type.as_str() {
                "line_item_quantity" => {
                    item.qty = field_text(prop).and_then(|v| v.replace(',', "").parse::<f64>().ok())
                }
                "line_item_unit_price" => item.price = currency_value(prop),
                "line_item_product_code" => item.hsn_code = field_text(prop),
                _ => (),
            }
        }
        if item != ExtractedLineItem::default() {
            if let Some(subtotal) = item.subtotal {
                items_sum += subtotal;
            }
            data.line_items.push(item);
        }
    }

    if cgst > 0.0 {
        data.cgst_amount = Some(cgst);
    }
    if sgst > 0.0 {
        data.sgst_amount = Some(sgst);
    }
    if igst > 0.0 {
        data.igst_amount = Some(igst);
    }
    if cess > 0.0 {
        data.cess_amount = Some(cess);
    }

    let tax_sum = cgst + sgst + igst + cess;
    if tax_sum > 0.0 {
        data.tax_amount = Some(tax_sum);
    } else {
        data.tax_amount = match (data.total_amount, data.sub_total_from_items) {
            (Some(total), Some(net)) if total - net >= 0.0 => Some(total - net),
            _ => Some(0.0),
        };
    }

    if data.sub_total_from_items.is_none() || data.sub_total_from_items == Some(0.0) {
        if items_sum > 0.0 {
            data.sub_total_from_items = Some(items_sum);
        } else if let (Some(total), Some(tax)) = (data.total_amount, data.tax_amount) {
            if total - tax >= 0.0 {
                data.sub_total_from_items = Some(total - tax);
            }
        }
    }

    data
}

/// To list all fields except line items. `null` values are rendered as empty strings.
pub fn to_table(data: &InvoiceData) -> Vec<TableItem> {
    let text = |v: &Option<String>| match v {
        None => Value::String("".to_string()),
        Some(v) => Value::String(v.clone()),
    };
    let number = |v: &Option<f64>| match v.and_then(serde_json::Number::from_f64) {
        None => Value::String("".to_string()),
        Some(v) => Value::Number(v),
    };
    let rows = vec![
        ("billNo", text(&data.bill_no)),
        ("billDate", text(&data.bill_date)),
        ("supplier", text(&data.supplier)),
        ("supplierGst", text(&data.supplier_gst)),
        ("dueDate", text(&data.due_date)),
        ("totalAmount", number(&data.total_amount)),
        ("subTotalFromItems", number(&data.sub_total_from_items)),
        ("taxAmount", number(&data.tax_amount)),
        ("cgstAmount", number(&data.cgst_amount)),
        ("sgstAmount", number(&data.sgst_amount)),
        ("igstAmount", number(&data.igst_amount)),
        ("cessAmount", number(&data.cess_amount)),
        ("narration", text(&data.narration)),
        ("currency", Value::String(data.currency.clone())),
    ];
    rows.into_iter()
        .map(|(label, value)| TableItem { label, value })
        .collect()
}

/// The normalized text when it is not empty, or the trimmed mention text.
pub fn field_text(entity: &Entity) -> Option<String> {
    if let Some(value) = entity.normalized_value.as_ref() {
        if let Some(text) = value.text.as_ref() {
            let text = text.trim();
            if text.len() > 0 {
                return Some(text.to_string());
            }
        }
    }
    match entity.mention_text.as_ref() {
        Some(text) if text.len() > 0 => Some(text.trim().to_string()),
        _ => None,
    }
}

/// The money value, or the number in the text without currency symbols and letters.
pub fn currency_value(entity: &Entity) -> Option<f64> {
    if let Some(money) = entity
        .normalized_value
        .as_ref()
        .and_then(|v| v.money_value.as_ref())
    {
        return Some(money.units as f64 + money.nanos as f64 / 1e9);
    }
    let text = field_text(entity)?;
    let cleaned: String = text
        .chars()
        .filter(|c| !(*c == '₹' || *c == '$' || *c == ',' || c.is_ascii_alphabetic()))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.len() == 0 {
        return None;
    }
    match cleaned.parse::<f64>() {
        Err(_) => {
            warn!("cannot parse currency value from text: '{}'", text);
            None
        }
        Ok(v) => Some(v),
    }
}

/// The ISO date (`YYYY-MM-DD`). Unknown text formats are kept as they are.
pub fn date_value(entity: &Entity) -> Option<String> {
    if let Some(date) = entity
        .normalized_value
        .as_ref()
        .and_then(|v| v.date_value.as_ref())
    {
        if date.year != 0 {
            if let Some(date) = NaiveDate::from_ymd_opt(date.year, date.month, date.day) {
                return Some(date.format("%Y-%m-%d").to_string());
            }
        }
    }
    let text = field_text(entity)?;
    for format in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(text.as_str(), format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    warn!("cannot parse date value with known formats: '{}'", text);
    Some(text)
}

enum TaxKind {
    Cgst,
    Sgst,
    Igst,
    Cess,
}

fn tax_kind(description: &str) -> Option<TaxKind> {
    let desc = description.to_lowercase();
    let is_match = |pattern: &str| match Regex::new(pattern) {
        Err(_) => false,
        Ok(regex) => regex.is_match(desc.as_str()),
    };
    if is_match(r"(cgst|central\s*(gst|tax))") {
        Some(TaxKind::Cgst)
    } else if is_match(r"(sgst|state\s*(gst|tax))") {
        Some(TaxKind::Sgst)
    } else if is_match(r"(igst|integrated\s*(gst|tax))") {
        Some(TaxKind::Igst)
    } else if desc.contains("cess") {
        Some(TaxKind::Cess)
    } else {
        None
    }
}

fn property<'a>(entity: &'a Entity, prop_type: &str) -> Option<&'a Entity> {
    entity
        .properties
        .iter()
        .find(|p| p.entity_type.as_str() == prop_type)
}

fn deserialize_units<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(v) => Ok(v.as_i64().unwrap_or_default()),
        Value::String(v) => v.parse::<i64>().map_err(serde::de::Error::custom),
        _ => Ok(0),
    }
}
