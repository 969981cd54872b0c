use serde::Serialize;

#[derive(Serialize)]
pub struct GetExpenseData {
    #[serde(rename = "_id")]
    pub expense_id: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    #[serde(rename = "transactionNo")]
    pub transaction_no: String,
    #[serde(rename = "billNo")]
    pub bill_no: Option<String>,
    /// `DD/MM/YYYY`
    #[serde(rename = "billDate")]
    pub bill_date: Option<String>,
    /// `DD/MM/YYYY`
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
    #[serde(rename = "supplierId")]
    pub supplier_id: Option<String>,
    #[serde(rename = "supplierName")]
    pub supplier_name: Option<String>,
    #[serde(rename = "supplierGst")]
    pub supplier_gst: Option<String>,
    #[serde(rename = "expenseHeadId")]
    pub expense_head_id: Option<String>,
    #[serde(rename = "expenseHeadName")]
    pub expense_head_name: Option<String>,
    pub narration: Option<String>,
    pub currency: String,
    #[serde(rename = "cgstAmount")]
    pub cgst_amount: Option<f64>,
    #[serde(rename = "sgstAmount")]
    pub sgst_amount: Option<f64>,
    #[serde(rename = "igstAmount")]
    pub igst_amount: Option<f64>,
    #[serde(rename = "cessAmount")]
    pub cess_amount: Option<f64>,
    #[serde(rename = "taxAmount")]
    pub tax_amount: f64,
    #[serde(rename = "totalAmount")]
    pub total_amount: Option<f64>,
    #[serde(rename = "netAmount")]
    pub net_amount: Option<f64>,
    #[serde(rename = "tdsRate")]
    pub tds_rate: Option<f64>,
    #[serde(rename = "tdsAmountCalculated")]
    pub tds_amount_calculated: Option<f64>,
    #[serde(rename = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(rename = "billSource")]
    pub bill_source: Option<String>,
    pub status: String,
    #[serde(rename = "invoiceFilename")]
    pub invoice_filename: Option<String>,
    #[serde(rename = "lineItems")]
    pub line_items: Vec<GetExpenseLineItem>,
    #[serde(rename = "subTotalFromItems")]
    pub sub_total_from_items: Option<f64>,
    #[serde(rename = "discountAmount")]
    pub discount_amount: Option<f64>,
    #[serde(rename = "taxFromItems")]
    pub tax_from_items: Option<f64>,
    #[serde(rename = "grandTotalFromItems")]
    pub grand_total_from_items: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "modifiedAt")]
    pub modified_at: String,
    #[serde(rename = "modifiedBy")]
    pub modified_by: Option<String>,
}

#[derive(Serialize)]
pub struct GetExpenseLineItem {
    pub description: Option<String>,
    #[serde(rename = "hsnCode")]
    pub hsn_code: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub subtotal: Option<f64>,
}
