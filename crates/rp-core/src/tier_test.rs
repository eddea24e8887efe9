use super::*;

#[test]
fn test_customer_tier_boundaries() {
    assert_eq!(CustomerValueTier::classify(5000.0), CustomerValueTier::Vip);
    assert_eq!(
        CustomerValueTier::classify(4999.99),
        CustomerValueTier::HighValue
    );
    assert_eq!(
        CustomerValueTier::classify(2000.0),
        CustomerValueTier::HighValue
    );
    assert_eq!(
        CustomerValueTier::classify(500.0),
        CustomerValueTier::MediumValue
    );
    assert_eq!(
        CustomerValueTier::classify(499.99),
        CustomerValueTier::LowValue
    );
}

#[test]
fn test_zero_and_nan_fall_to_floor() {
    assert_eq!(CustomerValueTier::classify(0.0), CustomerValueTier::LowValue);
    assert_eq!(
        CustomerValueTier::classify(f64::NAN),
        CustomerValueTier::LowValue
    );
    assert_eq!(
        StorePerformanceTier::classify(0.0),
        StorePerformanceTier::LowPerforming
    );
    assert_eq!(
        ProductPerformanceCategory::classify(0.0),
        ProductPerformanceCategory::SlowMoving
    );
}

#[test]
fn test_store_tier_boundaries() {
    assert_eq!(
        StorePerformanceTier::classify(100_000.0),
        StorePerformanceTier::HighPerforming
    );
    assert_eq!(
        StorePerformanceTier::classify(99_999.99),
        StorePerformanceTier::MediumPerforming
    );
    assert_eq!(
        StorePerformanceTier::classify(50_000.0),
        StorePerformanceTier::MediumPerforming
    );
    assert_eq!(
        StorePerformanceTier::classify(49_999.0),
        StorePerformanceTier::LowPerforming
    );
}

#[test]
fn test_product_category_boundaries() {
    assert_eq!(
        ProductPerformanceCategory::classify(9.0),
        ProductPerformanceCategory::SlowMoving
    );
    assert_eq!(
        ProductPerformanceCategory::classify(10.0),
        ProductPerformanceCategory::Average
    );
    assert_eq!(
        ProductPerformanceCategory::classify(50.0),
        ProductPerformanceCategory::Popular
    );
    assert_eq!(
        ProductPerformanceCategory::classify(100.0),
        ProductPerformanceCategory::BestSeller
    );
}

fn assert_monotonic<T: Tier>(upper: f64) {
    let mut previous = T::classify(-1.0).rank();
    let mut metric = -1.0;
    while metric <= upper {
        let rank = T::classify(metric).rank();
        assert!(
            rank >= previous,
            "{} rank decreased at {}",
            T::METRIC,
            metric
        );
        previous = rank;
        metric += 0.5;
    }
}

#[test]
fn test_classification_is_monotonic() {
    assert_monotonic::<CustomerValueTier>(6000.0);
    assert_monotonic::<StorePerformanceTier>(120_000.0);
    assert_monotonic::<ProductPerformanceCategory>(150.0);
}

#[test]
fn test_rank_order() {
    assert_eq!(CustomerValueTier::LowValue.rank(), 0);
    assert_eq!(CustomerValueTier::MediumValue.rank(), 1);
    assert_eq!(CustomerValueTier::HighValue.rank(), 2);
    assert_eq!(CustomerValueTier::Vip.rank(), 3);
    assert_eq!(StorePerformanceTier::HighPerforming.rank(), 2);
    assert_eq!(ProductPerformanceCategory::BestSeller.rank(), 3);
}

#[test]
fn test_labels_round_trip() {
    for tier in CustomerValueTier::all() {
        assert_eq!(CustomerValueTier::from_label(tier.label()), Some(tier));
    }
    assert_eq!(
        ProductPerformanceCategory::from_label("Slow Moving"),
        Some(ProductPerformanceCategory::SlowMoving)
    );
    assert_eq!(StorePerformanceTier::from_label("Unknown"), None);
    assert_eq!(CustomerValueTier::Vip.to_string(), "VIP");
}

#[test]
fn test_case_sql() {
    assert_eq!(
        CustomerValueTier::case_sql("lifetime_value"),
        "CASE WHEN COALESCE(lifetime_value, 0) >= 5000 THEN 'VIP' \
         WHEN COALESCE(lifetime_value, 0) >= 2000 THEN 'High Value' \
         WHEN COALESCE(lifetime_value, 0) >= 500 THEN 'Medium Value' \
         ELSE 'Low Value' END"
    );
    assert_eq!(
        StorePerformanceTier::case_sql("r"),
        "CASE WHEN COALESCE(r, 0) >= 100000 THEN 'High Performing' \
         WHEN COALESCE(r, 0) >= 50000 THEN 'Medium Performing' \
         ELSE 'Low Performing' END"
    );
}
