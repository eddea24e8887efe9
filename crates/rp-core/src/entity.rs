//! The four raw entity types and their file/table layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw entity type produced by the generator and loaded into the raw layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Store,
    Product,
    Customer,
    Transaction,
}

/// A raw column: name and warehouse type
pub type RawColumn = (&'static str, &'static str);

const STORE_COLUMNS: &[RawColumn] = &[
    ("store_id", "BIGINT"),
    ("store_name", "VARCHAR"),
    ("store_type", "VARCHAR"),
    ("city", "VARCHAR"),
    ("state", "VARCHAR"),
    ("country", "VARCHAR"),
    ("opened_date", "DATE"),
    ("size_sqft", "INTEGER"),
];

const PRODUCT_COLUMNS: &[RawColumn] = &[
    ("product_id", "BIGINT"),
    ("product_name", "VARCHAR"),
    ("category", "VARCHAR"),
    ("subcategory", "VARCHAR"),
    ("brand", "VARCHAR"),
    ("cost_price", "DECIMAL(10,2)"),
    ("retail_price", "DECIMAL(10,2)"),
    ("supplier", "VARCHAR"),
    ("created_date", "DATE"),
];

const CUSTOMER_COLUMNS: &[RawColumn] = &[
    ("customer_id", "BIGINT"),
    ("first_name", "VARCHAR"),
    ("last_name", "VARCHAR"),
    ("email", "VARCHAR"),
    ("phone", "VARCHAR"),
    ("address", "VARCHAR"),
    ("city", "VARCHAR"),
    ("state", "VARCHAR"),
    ("zip_code", "VARCHAR"),
    ("signup_date", "DATE"),
    ("customer_segment", "VARCHAR"),
    ("loyalty_member", "BOOLEAN"),
];

const TRANSACTION_COLUMNS: &[RawColumn] = &[
    ("transaction_id", "BIGINT"),
    ("line_number", "INTEGER"),
    ("transaction_date", "DATE"),
    ("transaction_time", "TIME"),
    ("store_id", "BIGINT"),
    ("customer_id", "BIGINT"),
    ("product_id", "BIGINT"),
    ("quantity", "INTEGER"),
    ("unit_price", "DECIMAL(12,2)"),
    ("discount_amount", "DECIMAL(12,2)"),
    ("total_amount", "DECIMAL(12,2)"),
    ("payment_method", "VARCHAR"),
];

impl Entity {
    /// All entities in load order (referenced entities first)
    pub const ALL: [Entity; 4] = [
        Entity::Store,
        Entity::Product,
        Entity::Customer,
        Entity::Transaction,
    ];

    /// Plural name used for files, storage prefixes and raw tables
    pub fn table_name(&self) -> &'static str {
        match self {
            Entity::Store => "stores",
            Entity::Product => "products",
            Entity::Customer => "customers",
            Entity::Transaction => "transactions",
        }
    }

    /// CSV file name written by the generator
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.table_name())
    }

    /// Identifier column
    pub fn id_column(&self) -> &'static str {
        match self {
            Entity::Store => "store_id",
            Entity::Product => "product_id",
            Entity::Customer => "customer_id",
            Entity::Transaction => "transaction_id",
        }
    }

    /// Raw column layout, in CSV header order
    pub fn raw_columns(&self) -> &'static [RawColumn] {
        match self {
            Entity::Store => STORE_COLUMNS,
            Entity::Product => PRODUCT_COLUMNS,
            Entity::Customer => CUSTOMER_COLUMNS,
            Entity::Transaction => TRANSACTION_COLUMNS,
        }
    }

    /// Whether files are partitioned by the row's own date rather than the load date
    pub fn partitioned_by_row_date(&self) -> bool {
        matches!(self, Entity::Transaction)
    }

    /// Look up an entity by its table name
    pub fn from_table_name(name: &str) -> Option<Entity> {
        Self::ALL.into_iter().find(|e| e.table_name() == name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
