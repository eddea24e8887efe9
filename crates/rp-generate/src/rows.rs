//! Row types written to the raw CSV files
//!
//! Field order matches the raw column layout in `rp_core::entity`.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Store formats
pub const STORE_TYPES: [&str; 4] = ["Supermarket", "Convenience", "Hypermarket", "Express"];

/// Product categories and their subcategories
pub const CATEGORIES: [(&str, &[&str]); 5] = [
    (
        "Electronics",
        &["Laptop", "Phone", "Tablet", "Headphones", "Camera", "Smartwatch"],
    ),
    (
        "Clothing",
        &["Shirt", "Pants", "Dress", "Jacket", "Shoes", "Accessories"],
    ),
    (
        "Food",
        &["Snacks", "Beverages", "Dairy", "Bakery", "Frozen", "Fresh Produce"],
    ),
    (
        "Home",
        &["Furniture", "Decor", "Kitchen", "Bedding", "Bath", "Garden"],
    ),
    (
        "Sports",
        &["Equipment", "Apparel", "Footwear", "Accessories", "Outdoor"],
    ),
];

/// Customer segments
pub const SEGMENTS: [&str; 3] = ["Premium", "Standard", "Basic"];

/// Payment methods
pub const PAYMENT_METHODS: [&str; 4] = ["Credit Card", "Debit Card", "Cash", "Mobile Payment"];

/// Discount rates; no discount is three times as likely as any other rate
pub const DISCOUNTS: [f64; 7] = [0.0, 0.0, 0.0, 0.05, 0.10, 0.15, 0.20];

/// Cost price as a fraction of the retail price
pub const COST_RATIO: f64 = 0.6;

/// A row of `stores.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRow {
    pub store_id: Option<i64>,
    pub store_name: String,
    pub store_type: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub opened_date: NaiveDate,
    pub size_sqft: i32,
}

/// A row of `products.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub cost_price: f64,
    pub retail_price: f64,
    pub supplier: String,
    pub created_date: NaiveDate,
}

/// A row of `customers.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub customer_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub signup_date: NaiveDate,
    pub customer_segment: String,
    pub loyalty_member: bool,
}

/// A line item of a `transactions.csv` partition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub transaction_id: Option<i64>,
    pub line_number: i32,
    pub transaction_date: Option<NaiveDate>,
    pub transaction_time: NaiveTime,
    pub store_id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_method: String,
}

/// Round a money amount to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::Entity;

    fn header_of<T: Serialize>(row: &T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let bytes = writer.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    }

    fn expected_header(entity: Entity) -> String {
        entity
            .raw_columns()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_field_order_matches_raw_layout() {
        let store = StoreRow {
            store_id: Some(1),
            store_name: "Springfield Express".into(),
            store_type: "Express".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            country: "USA".into(),
            opened_date: date(),
            size_sqft: 5000,
        };
        assert_eq!(header_of(&store), expected_header(Entity::Store));

        let product = ProductRow {
            product_id: Some(1),
            product_name: "Velit Laptop".into(),
            category: "Electronics".into(),
            subcategory: "Laptop".into(),
            brand: "Acme".into(),
            cost_price: 6.0,
            retail_price: 10.0,
            supplier: "Acme".into(),
            created_date: date(),
        };
        assert_eq!(header_of(&product), expected_header(Entity::Product));

        let customer = CustomerRow {
            customer_id: Some(1),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62701".into(),
            signup_date: date(),
            customer_segment: "Premium".into(),
            loyalty_member: true,
        };
        assert_eq!(header_of(&customer), expected_header(Entity::Customer));

        let line = TransactionRow {
            transaction_id: Some(1),
            line_number: 1,
            transaction_date: Some(date()),
            transaction_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            store_id: 1,
            customer_id: 1,
            product_id: 1,
            quantity: 2,
            unit_price: 10.0,
            discount_amount: 0.0,
            total_amount: 20.0,
            payment_method: "Cash".into(),
        };
        assert_eq!(header_of(&line), expected_header(Entity::Transaction));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_category_table() {
        let pairs: usize = CATEGORIES.iter().map(|(_, subs)| subs.len()).sum();
        assert_eq!(pairs, 29);
    }
}
