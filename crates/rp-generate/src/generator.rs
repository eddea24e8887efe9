//! Synthetic retail data generation

use crate::dirty::{
    add_customer_noise, add_product_noise, add_store_noise, apply_line_defect, invalid_product,
    orphan_customer, orphan_store, pick_line_defect,
};
use crate::error::{GenerateError, GenerateResult};
use crate::rows::{
    round2, CustomerRow, ProductRow, StoreRow, TransactionRow, CATEGORIES, COST_RATIO, DISCOUNTS,
    PAYMENT_METHODS, SEGMENTS, STORE_TYPES,
};
use crate::writer::{transaction_partition_dir, EntityWriter};
use chrono::{Duration, NaiveDate, NaiveTime};
use fake::faker::address::en::{BuildingNumber, CityName, PostCode, StateAbbr, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rp_core::calendar::{day_type, DayType};
use rp_core::config::GeneratorConfig;
use rp_core::Entity;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Counts and totals reported after a generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Valid stores written
    pub stores: usize,
    /// Valid products written
    pub products: usize,
    /// Valid customers written
    pub customers: usize,
    /// Distinct transactions
    pub transactions: usize,
    /// Transaction line items written, defective ones included
    pub line_items: usize,
    /// Rows written with defects, across all files
    pub dirty_rows: usize,
    /// Sum of total_amount over the valid line items
    pub total_revenue: f64,
    /// First transaction date
    pub start_date: Option<NaiveDate>,
    /// Last transaction date
    pub end_date: Option<NaiveDate>,
    /// Every file written
    pub files: Vec<PathBuf>,
}

/// Catalog facts transactions are priced from
#[derive(Debug, Clone, Copy)]
struct PricedProduct {
    id: i64,
    retail_price: f64,
}

/// Seeded generator for the four raw entities
pub struct RetailGenerator {
    config: GeneratorConfig,
    end_date: NaiveDate,
    rng: StdRng,
}

impl RetailGenerator {
    /// Create a generator; `today` is used when the config has no end date
    pub fn new(config: GeneratorConfig, today: NaiveDate) -> GenerateResult<Self> {
        if config.days == 0 {
            return Err(GenerateError::InvalidSettings(
                "at least one day of transactions is required".to_string(),
            ));
        }
        if config.stores == 0 || config.products == 0 || config.customers == 0 {
            return Err(GenerateError::InvalidSettings(
                "stores, products and customers must all be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.dirty_rate) {
            return Err(GenerateError::InvalidSettings(format!(
                "dirty_rate {} is outside 0.0..=1.0",
                config.dirty_rate
            )));
        }

        let volume = config.volume;
        if volume.weekday_min > volume.weekday_max || volume.weekend_min > volume.weekend_max {
            return Err(GenerateError::InvalidSettings(
                "transaction volume minimums cannot exceed maximums".to_string(),
            ));
        }

        let end_date = config.end_date.unwrap_or(today);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            end_date,
            rng,
        })
    }

    /// First day of generated transactions
    pub fn start_date(&self) -> NaiveDate {
        self.end_date - Duration::days(i64::from(self.config.days) - 1)
    }

    fn days_before(&mut self, min_days: i64, max_days: i64) -> NaiveDate {
        self.end_date - Duration::days(self.rng.random_range(min_days..=max_days))
    }

    fn is_dirty(&mut self) -> bool {
        self.config.dirty_rate > 0.0 && self.rng.random_bool(self.config.dirty_rate)
    }

    /// Number of defective rows to append to a dimension file of `n` rows
    fn extra_dirty_rows(&self, n: usize) -> usize {
        (n as f64 * self.config.dirty_rate).round() as usize
    }

    /// Generate store rows
    pub fn generate_stores(&mut self) -> Vec<StoreRow> {
        (1..=self.config.stores as i64)
            .map(|id| {
                let name_city: String = CityName().fake_with_rng(&mut self.rng);
                let name_type = STORE_TYPES[self.rng.random_range(0..STORE_TYPES.len())];
                let store_type = STORE_TYPES[self.rng.random_range(0..STORE_TYPES.len())];
                StoreRow {
                    store_id: Some(id),
                    store_name: format!("{} {}", name_city, name_type),
                    store_type: store_type.to_string(),
                    city: CityName().fake_with_rng(&mut self.rng),
                    state: StateAbbr().fake_with_rng(&mut self.rng),
                    country: "USA".to_string(),
                    opened_date: self.days_before(365, 3650),
                    size_sqft: self.rng.random_range(5000..=50000),
                }
            })
            .collect()
    }

    /// Generate product rows, assigned round-robin over category/subcategory pairs
    pub fn generate_products(&mut self) -> Vec<ProductRow> {
        let pairs: Vec<(&str, &str)> = CATEGORIES
            .iter()
            .flat_map(|(category, subs)| subs.iter().map(move |sub| (*category, *sub)))
            .collect();

        (0..self.config.products)
            .map(|i| {
                let (category, subcategory) = pairs[i % pairs.len()];
                let word: String = Word().fake_with_rng(&mut self.rng);
                let base_price: f64 = self.rng.random_range(10.0..500.0);
                ProductRow {
                    product_id: Some(i as i64 + 1),
                    product_name: format!("{} {}", capitalize(&word), subcategory),
                    category: category.to_string(),
                    subcategory: subcategory.to_string(),
                    brand: CompanyName().fake_with_rng(&mut self.rng),
                    cost_price: round2(base_price * COST_RATIO),
                    retail_price: round2(base_price),
                    supplier: CompanyName().fake_with_rng(&mut self.rng),
                    created_date: self.days_before(0, 3 * 365),
                }
            })
            .collect()
    }

    /// Generate customer rows
    pub fn generate_customers(&mut self) -> Vec<CustomerRow> {
        (1..=self.config.customers as i64)
            .map(|id| {
                let first_name: String = FirstName().fake_with_rng(&mut self.rng);
                let last_name: String = LastName().fake_with_rng(&mut self.rng);
                let suffix: String = DomainSuffix().fake_with_rng(&mut self.rng);
                let building: String = BuildingNumber().fake_with_rng(&mut self.rng);
                let street: String = StreetName().fake_with_rng(&mut self.rng);
                CustomerRow {
                    customer_id: Some(id),
                    email: format!(
                        "{}.{}{}@example.{}",
                        first_name.to_lowercase(),
                        last_name.to_lowercase(),
                        id,
                        suffix
                    ),
                    first_name,
                    last_name,
                    phone: PhoneNumber().fake_with_rng(&mut self.rng),
                    address: format!("{} {}", building, street),
                    city: CityName().fake_with_rng(&mut self.rng),
                    state: StateAbbr().fake_with_rng(&mut self.rng),
                    zip_code: PostCode().fake_with_rng(&mut self.rng),
                    signup_date: self.days_before(0, 5 * 365),
                    customer_segment: SEGMENTS[self.rng.random_range(0..SEGMENTS.len())]
                        .to_string(),
                    loyalty_member: self.rng.random_bool(0.5),
                }
            })
            .collect()
    }

    /// Generate the line items of one transaction
    fn generate_transaction(
        &mut self,
        transaction_id: i64,
        date: NaiveDate,
        products: &[PricedProduct],
    ) -> Vec<TransactionRow> {
        let store_id = self.rng.random_range(1..=self.config.stores as i64);
        let customer_id = self.rng.random_range(1..=self.config.customers as i64);
        let hour = self.rng.random_range(8..=21);
        let minute = self.rng.random_range(0..=59);
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        let payment_method = PAYMENT_METHODS[self.rng.random_range(0..PAYMENT_METHODS.len())];
        let items = self.rng.random_range(1..=8);

        (1..=items)
            .filter_map(|line_number| {
                let product = *products.choose(&mut self.rng)?;
                let quantity: i32 = self.rng.random_range(1..=3);
                let discount = *DISCOUNTS.choose(&mut self.rng)?;
                let unit_price = product.retail_price * (1.0 - discount);
                Some(TransactionRow {
                    transaction_id: Some(transaction_id),
                    line_number,
                    transaction_date: Some(date),
                    transaction_time: time,
                    store_id,
                    customer_id,
                    product_id: product.id,
                    quantity,
                    unit_price: round2(unit_price),
                    discount_amount: round2(product.retail_price * discount * f64::from(quantity)),
                    total_amount: round2(unit_price * f64::from(quantity)),
                    payment_method: payment_method.to_string(),
                })
            })
            .collect()
    }

    /// Generate every file under `output_dir`
    pub fn generate_all(&mut self, output_dir: &Path) -> GenerateResult<GenerationSummary> {
        let mut summary = GenerationSummary::default();

        let stores = self.generate_stores();
        summary.stores = stores.len();
        self.write_stores(output_dir, stores, &mut summary)?;
        log::info!("Generated {} stores", summary.stores);

        let products = self.generate_products();
        summary.products = products.len();
        let priced: Vec<PricedProduct> = products
            .iter()
            .filter_map(|p| {
                p.product_id.map(|id| PricedProduct {
                    id,
                    retail_price: p.retail_price,
                })
            })
            .collect();
        self.write_products(output_dir, products, &mut summary)?;
        log::info!("Generated {} products", summary.products);

        let customers = self.generate_customers();
        summary.customers = customers.len();
        self.write_customers(output_dir, customers, &mut summary)?;
        log::info!("Generated {} customers", summary.customers);

        self.write_transactions(output_dir, &priced, &mut summary)?;
        log::info!(
            "Generated {} transactions ({} line items)",
            summary.transactions,
            summary.line_items
        );

        Ok(summary)
    }

    fn write_stores(
        &mut self,
        output_dir: &Path,
        mut stores: Vec<StoreRow>,
        summary: &mut GenerationSummary,
    ) -> GenerateResult<()> {
        for store in stores.iter_mut() {
            if self.is_dirty() {
                add_store_noise(store);
            }
        }
        let mut writer = EntityWriter::create(&output_dir.join(Entity::Store.file_name()), Entity::Store)?;
        for store in &stores {
            writer.write(store)?;
        }
        for i in 0..self.extra_dirty_rows(stores.len()) {
            writer.write(&orphan_store(&stores[i % stores.len()]))?;
            summary.dirty_rows += 1;
        }
        let (path, _) = writer.finish()?;
        summary.files.push(path);
        Ok(())
    }

    fn write_products(
        &mut self,
        output_dir: &Path,
        mut products: Vec<ProductRow>,
        summary: &mut GenerationSummary,
    ) -> GenerateResult<()> {
        for product in products.iter_mut() {
            if self.is_dirty() {
                add_product_noise(product);
            }
        }
        let mut writer =
            EntityWriter::create(&output_dir.join(Entity::Product.file_name()), Entity::Product)?;
        for product in &products {
            writer.write(product)?;
        }
        let next_id = products.len() as i64 + 1;
        for i in 0..self.extra_dirty_rows(products.len()) {
            let template = &products[i % products.len()];
            writer.write(&invalid_product(template, next_id + i as i64, i % 2 == 0))?;
            summary.dirty_rows += 1;
        }
        let (path, _) = writer.finish()?;
        summary.files.push(path);
        Ok(())
    }

    fn write_customers(
        &mut self,
        output_dir: &Path,
        mut customers: Vec<CustomerRow>,
        summary: &mut GenerationSummary,
    ) -> GenerateResult<()> {
        for customer in customers.iter_mut() {
            if self.is_dirty() {
                add_customer_noise(customer);
            }
        }
        let mut writer = EntityWriter::create(
            &output_dir.join(Entity::Customer.file_name()),
            Entity::Customer,
        )?;
        for customer in &customers {
            writer.write(customer)?;
        }
        for i in 0..self.extra_dirty_rows(customers.len()) {
            writer.write(&orphan_customer(&customers[i % customers.len()]))?;
            summary.dirty_rows += 1;
        }
        let (path, _) = writer.finish()?;
        summary.files.push(path);
        Ok(())
    }

    fn write_transactions(
        &mut self,
        output_dir: &Path,
        products: &[PricedProduct],
        summary: &mut GenerationSummary,
    ) -> GenerateResult<()> {
        let volume = self.config.volume;
        let start = self.start_date();

        // Partitions from an earlier run would be reloaded next to this one
        let partitions = output_dir.join(Entity::Transaction.table_name());
        if partitions.is_dir() {
            std::fs::remove_dir_all(&partitions).map_err(|source| GenerateError::Io {
                path: partitions.display().to_string(),
                source,
            })?;
            log::debug!("Cleared previous partitions in {}", partitions.display());
        }

        let mut transaction_id: i64 = 1;
        let mut revenue_cents: i64 = 0;

        for offset in 0..i64::from(self.config.days) {
            let date = start + Duration::days(offset);
            let (min, max) = match day_type(date) {
                DayType::Weekend => (volume.weekend_min, volume.weekend_max),
                DayType::Weekday => (volume.weekday_min, volume.weekday_max),
            };
            let count = self.rng.random_range(min..=max);

            let path = output_dir
                .join(transaction_partition_dir(date))
                .join(Entity::Transaction.file_name());
            let mut writer = EntityWriter::create(&path, Entity::Transaction)?;

            for _ in 0..count {
                let lines = self.generate_transaction(transaction_id, date, products);
                for mut line in lines {
                    summary.line_items += 1;
                    if self.is_dirty() {
                        let defect = pick_line_defect(&mut self.rng);
                        summary.dirty_rows += 1;
                        match apply_line_defect(&mut line, defect) {
                            Some(fields) => {
                                let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
                                writer.write_raw(&refs)?;
                            }
                            None => writer.write(&line)?,
                        }
                        continue;
                    }
                    revenue_cents += (line.total_amount * 100.0).round() as i64;
                    writer.write(&line)?;
                }
                transaction_id += 1;
            }

            let (path, _) = writer.finish()?;
            summary.files.push(path);
        }

        summary.transactions = (transaction_id - 1) as usize;
        summary.total_revenue = revenue_cents as f64 / 100.0;
        summary.start_date = Some(start);
        summary.end_date = Some(self.end_date);
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
