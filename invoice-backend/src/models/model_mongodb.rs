//! Pure MongoDB model.

use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use mongodb::Database;

use super::{
    activity_log, company, contact, document_rules, dropdown, expense,
    mongodb::{
        activity_log::Model as ActivityLogModel,
        company::Model as CompanyModel,
        conn::{self, Options},
        contact::Model as ContactModel,
        document_rules::Model as DocumentRulesModel,
        dropdown::Model as DropdownModel,
        expense::Model as ExpenseModel,
        record::Model as RecordModel,
        user::Model as UserModel,
    },
    record, user,
};

/// Pure MongoDB model.
#[derive(Clone)]
pub struct Model {
    conn: Arc<Database>,
    user: Arc<UserModel>,
    dropdown: Arc<DropdownModel>,
    customer: Arc<RecordModel>,
    vendor: Arc<RecordModel>,
    staff: Arc<RecordModel>,
    account: Arc<RecordModel>,
    expense: Arc<ExpenseModel>,
    company: Arc<CompanyModel>,
    contact: Arc<ContactModel>,
    document_rules: Arc<DocumentRulesModel>,
    activity_log: Arc<ActivityLogModel>,
}

impl Model {
    /// Create an instance.
    pub async fn new(opts: &Options) -> Result<Self, Box<dyn StdError>> {
        let conn = Arc::new(conn::connect(opts).await?);
        Ok(Model {
            conn: conn.clone(),
            user: Arc::new(UserModel::new(conn.clone()).await?),
            dropdown: Arc::new(DropdownModel::new(conn.clone()).await?),
            customer: Arc::new(RecordModel::new(conn.clone(), "customers").await?),
            vendor: Arc::new(RecordModel::new(conn.clone(), "vendors").await?),
            staff: Arc::new(RecordModel::new(conn.clone(), "staff").await?),
            account: Arc::new(RecordModel::new(conn.clone(), "chart_of_accounts").await?),
            expense: Arc::new(ExpenseModel::new(conn.clone()).await?),
            company: Arc::new(CompanyModel::new(conn.clone()).await?),
            contact: Arc::new(ContactModel::new(conn.clone()).await?),
            document_rules: Arc::new(DocumentRulesModel::new(conn.clone()).await?),
            activity_log: Arc::new(ActivityLogModel::new(conn.clone()).await?),
        })
    }

    /// Get the raw database connection ([`Database`]).
    pub fn get_connection(&self) -> &Database {
        &self.conn
    }
}

#[async_trait]
impl super::Model for Model {
    async fn close(&self) -> Result<(), Box<dyn StdError>> {
        Ok(())
    }

    fn user(&self) -> &dyn user::UserModel {
        self.user.as_ref()
    }

    fn dropdown(&self) -> &dyn dropdown::DropdownModel {
        self.dropdown.as_ref()
    }

    fn customer(&self) -> &dyn record::RecordModel {
        self.customer.as_ref()
    }

    fn vendor(&self) -> &dyn record::RecordModel {
        self.vendor.as_ref()
    }

    fn staff(&self) -> &dyn record::RecordModel {
        self.staff.as_ref()
    }

    fn account(&self) -> &dyn record::RecordModel {
        self.account.as_ref()
    }

    fn expense(&self) -> &dyn expense::ExpenseModel {
        self.expense.as_ref()
    }

    fn company(&self) -> &dyn company::CompanyModel {
        self.company.as_ref()
    }

    fn contact(&self) -> &dyn contact::ContactModel {
        self.contact.as_ref()
    }

    fn document_rules(&self) -> &dyn document_rules::DocumentRulesModel {
        self.document_rules.as_ref()
    }

    fn activity_log(&self) -> &dyn activity_log::ActivityLogModel {
        self.activity_log.as_ref()
    }
}
