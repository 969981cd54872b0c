//! Descriptors of the free-form business record resources.
//!
//! Customers, vendors, staff and chart of accounts share one handler set. A [`RecordKind`] tells
//! the handlers which collection to use, which fields are required or searchable and how form
//! values are coerced.

use serde_json::{Map, Value};

use super::coerce;
use crate::models::{
    Model,
    record::{RESERVED_KEYS, RecordModel},
};

/// The collection of the resource.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Store {
    Customer,
    Vendor,
    Staff,
    Account,
}

/// The resource descriptor.
#[derive(Debug)]
pub struct RecordKind {
    pub store: Store,
    /// The entity name used in messages such as `Customer created successfully`.
    pub entity: &'static str,
    /// The name used in `Invalid xxx ID format`.
    pub id_name: &'static str,
    /// Required fields. Dotted paths are supported.
    pub required: &'static [&'static str],
    pub required_message: &'static str,
    pub search_fields: &'static [&'static str],
    /// Boolean fields that are coerced only when present (`true` or `"true"`).
    pub bool_fields: &'static [&'static str],
    /// Boolean fields that get `false` on creation when absent.
    pub default_bool_fields: &'static [&'static str],
    /// Object fields that may be sent as JSON strings.
    pub object_fields: &'static [&'static str],
    pub number_fields: &'static [&'static str],
    /// `YYYY-MM-DD` date fields.
    pub date_fields: &'static [&'static str],
    /// The resource accepts a `logo` file.
    pub has_logo: bool,
    /// `GET item/{record_id}` is also served.
    pub has_item_route: bool,
}

pub static CUSTOMER: RecordKind = RecordKind {
    store: Store::Customer,
    entity: "Customer",
    id_name: "customer",
    required: &["displayName", "financialDetails.paymentTerms"],
    required_message: "Missing required fields: displayName and paymentTerms",
    search_fields: &[
        "displayName",
        "companyName",
        "primaryContact.email",
        "primaryContact.name",
        "primaryContact.mobile",
        "gstNo",
    ],
    bool_fields: &[
        "gstRegistered",
        "sameAsBilling",
        "pfEnabled",
        "esicEnabled",
        "iecRegistered",
        "tdsEnabled",
        "tcsEnabled",
        "advanceTaxEnabled",
    ],
    default_bool_fields: &[],
    object_fields: &[
        "primaryContact",
        "financialDetails",
        "billingAddress",
        "shippingAddress",
    ],
    number_fields: &[],
    date_fields: &[],
    has_logo: true,
    has_item_route: true,
};

pub static VENDOR: RecordKind = RecordKind {
    store: Store::Vendor,
    entity: "Vendor",
    id_name: "vendor",
    required: &["displayName"],
    required_message: "Missing required field: displayName",
    search_fields: &[
        "displayName",
        "vendorName",
        "primaryContact.email",
        "primaryContact.name",
        "gstNo",
        "pan",
    ],
    bool_fields: &[],
    default_bool_fields: &[],
    object_fields: &[],
    number_fields: &[],
    date_fields: &[],
    has_logo: false,
    has_item_route: false,
};

pub static STAFF: RecordKind = RecordKind {
    store: Store::Staff,
    entity: "Staff member",
    id_name: "staff",
    required: &["firstName", "lastName"],
    required_message: "Missing required fields: firstName and lastName",
    search_fields: &["firstName", "lastName", "email", "employeeId", "mobile"],
    bool_fields: &[],
    default_bool_fields: &[],
    object_fields: &[],
    number_fields: &[],
    date_fields: &[],
    has_logo: false,
    has_item_route: false,
};

pub static ACCOUNT: RecordKind = RecordKind {
    store: Store::Account,
    entity: "Account",
    id_name: "account",
    required: &["name", "code", "accountType", "parentCategory"],
    required_message: "Missing required fields: name, code, accountType, parentCategory",
    search_fields: &["name", "code", "description", "accountType", "parentCategory"],
    bool_fields: &[],
    default_bool_fields: &["isSubAccount", "reconcile", "dashboardWatch", "isFavorite"],
    object_fields: &[],
    number_fields: &["openingBalance"],
    date_fields: &["balanceAsOf"],
    has_logo: false,
    has_item_route: false,
};

impl RecordKind {
    /// To get the model of the resource collection.
    pub fn model<'a>(&self, model: &'a dyn Model) -> &'a dyn RecordModel {
        match self.store {
            Store::Customer => model.customer(),
            Store::Vendor => model.vendor(),
            Store::Staff => model.staff(),
            Store::Account => model.account(),
        }
    }

    pub fn created_message(&self) -> String {
        format!("{} created successfully", self.entity)
    }

    pub fn updated_message(&self) -> String {
        format!("{} updated successfully", self.entity)
    }

    pub fn deleted_message(&self) -> String {
        format!("{} deleted successfully", self.entity)
    }

    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.entity)
    }

    pub fn invalid_id_message(&self) -> String {
        format!("Invalid {} ID format", self.id_name)
    }

    /// To coerce the body fields for storing. Reserved keys are dropped.
    ///
    /// On creation (`create` is `true`) the default boolean fields are filled with `false`.
    pub fn coerce(&self, body: &Map<String, Value>, create: bool) -> Map<String, Value> {
        let mut fields = Map::new();
        for (key, value) in body.iter() {
            let key = key.as_str();
            if RESERVED_KEYS.contains(&key) {
                continue;
            }
            let value = if self.object_fields.contains(&key) {
                Value::Object(coerce::object(value))
            } else if self.bool_fields.contains(&key) || self.default_bool_fields.contains(&key) {
                Value::Bool(coerce::strict_bool(value))
            } else if self.number_fields.contains(&key) {
                coerce::number_value(value)
            } else if self.date_fields.contains(&key) {
                match coerce::iso_date(value) {
                    None => Value::Null,
                    Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
                }
            } else {
                value.clone()
            };
            fields.insert(key.to_string(), value);
        }
        if create {
            for key in self.default_bool_fields {
                if !fields.contains_key(*key) {
                    fields.insert(key.to_string(), Value::Bool(false));
                }
            }
        }
        fields
    }

    /// To check the required fields. Returns the error message if any of them is missing.
    pub fn check_required(&self, fields: &Map<String, Value>) -> Result<(), &'static str> {
        for path in self.required {
            if !coerce::is_truthy(coerce::get_path(fields, path)) {
                return Err(self.required_message);
            }
        }
        Ok(())
    }
}
