//! Defect injection: rows the staging filters must drop and formatting noise
//! staging must normalize.

use crate::rows::{CustomerRow, ProductRow, StoreRow, TransactionRow};
use rand::Rng;

/// How a defective transaction line is broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineDefect {
    NullTransactionId,
    NullDate,
    ZeroQuantity,
    NegativeTotal,
    /// Quantity written as text; the bulk load rejects the record
    Malformed,
}

const LINE_DEFECTS: [LineDefect; 5] = [
    LineDefect::NullTransactionId,
    LineDefect::NullDate,
    LineDefect::ZeroQuantity,
    LineDefect::NegativeTotal,
    LineDefect::Malformed,
];

/// Pick a defect kind
pub(crate) fn pick_line_defect<R: Rng>(rng: &mut R) -> LineDefect {
    LINE_DEFECTS[rng.random_range(0..LINE_DEFECTS.len())]
}

/// Break a line in place. Returns the raw fields to write instead of the
/// typed row for [`LineDefect::Malformed`].
pub(crate) fn apply_line_defect(line: &mut TransactionRow, defect: LineDefect) -> Option<Vec<String>> {
    match defect {
        LineDefect::NullTransactionId => line.transaction_id = None,
        LineDefect::NullDate => line.transaction_date = None,
        LineDefect::ZeroQuantity => line.quantity = 0,
        LineDefect::NegativeTotal => line.total_amount = -line.total_amount.abs().max(0.01),
        LineDefect::Malformed => {
            return Some(vec![
                line.transaction_id.map(|v| v.to_string()).unwrap_or_default(),
                line.line_number.to_string(),
                line.transaction_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                line.transaction_time.to_string(),
                line.store_id.to_string(),
                line.customer_id.to_string(),
                line.product_id.to_string(),
                "several".to_string(),
                line.unit_price.to_string(),
                line.discount_amount.to_string(),
                line.total_amount.to_string(),
                line.payment_method.clone(),
            ]);
        }
    }
    None
}

/// Pad a value with stray whitespace
fn pad(value: &str) -> String {
    format!("  {} ", value)
}

/// Whitespace and case noise on a valid store
pub(crate) fn add_store_noise(store: &mut StoreRow) {
    store.store_type = pad(&store.store_type);
    store.state = store.state.to_lowercase();
    store.city = pad(&store.city);
}

/// Whitespace noise on a valid product
pub(crate) fn add_product_noise(product: &mut ProductRow) {
    product.category = pad(&product.category);
    product.product_name = pad(&product.product_name);
}

/// Whitespace and case noise on a valid customer
pub(crate) fn add_customer_noise(customer: &mut CustomerRow) {
    customer.email = pad(&customer.email.to_uppercase());
    customer.state = customer.state.to_lowercase();
    customer.first_name = pad(&customer.first_name);
    customer.customer_segment = pad(&customer.customer_segment);
}

/// A store row without an identifier
pub(crate) fn orphan_store(template: &StoreRow) -> StoreRow {
    StoreRow {
        store_id: None,
        ..template.clone()
    }
}

/// A customer row without an identifier
pub(crate) fn orphan_customer(template: &CustomerRow) -> CustomerRow {
    CustomerRow {
        customer_id: None,
        ..template.clone()
    }
}

/// A product row that fails the staging filter: alternately a missing id or
/// a non-positive retail price under a fresh id
pub(crate) fn invalid_product(template: &ProductRow, fresh_id: i64, null_id: bool) -> ProductRow {
    if null_id {
        ProductRow {
            product_id: None,
            ..template.clone()
        }
    } else {
        ProductRow {
            product_id: Some(fresh_id),
            retail_price: 0.0,
            cost_price: 0.0,
            ..template.clone()
        }
    }
}
