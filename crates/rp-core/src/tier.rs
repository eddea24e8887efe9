//! Fixed-threshold tier classification for the dimension tables.
//!
//! Each tier family is a ladder of inclusive lower bounds evaluated top-down:
//! the first step whose threshold the metric reaches wins, and anything below
//! the last step falls to the floor tier. The same ladder renders the SQL
//! `CASE` expression embedded in the mart models, so the Rust classification
//! and the warehouse classification share one set of breakpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One rung of a tier ladder: metric values `>= min` map to `tier`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<T: 'static> {
    /// Tier assigned when the threshold is reached
    pub tier: T,
    /// Inclusive lower bound
    pub min: f64,
}

/// A categorical tier derived from a continuous metric
pub trait Tier: Copy + Eq + fmt::Debug + 'static {
    /// Name of the metric the tier is derived from (documentation / output)
    const METRIC: &'static str;

    /// Steps ordered from the highest threshold to the lowest
    const STEPS: &'static [Step<Self>];

    /// Tier for metrics below every step
    const FLOOR: Self;

    /// Human-readable label, as stored in the warehouse
    fn label(&self) -> &'static str;

    /// Classify a metric value. NaN is treated as zero.
    fn classify(metric: f64) -> Self {
        let metric = if metric.is_nan() { 0.0 } else { metric };
        Self::STEPS
            .iter()
            .find(|step| metric >= step.min)
            .map(|step| step.tier)
            .unwrap_or(Self::FLOOR)
    }

    /// Ordinal rank, 0 for the floor tier and increasing towards the top
    fn rank(&self) -> usize {
        Self::STEPS
            .iter()
            .position(|step| step.tier == *self)
            .map(|i| Self::STEPS.len() - i)
            .unwrap_or(0)
    }

    /// All tiers from highest to lowest
    fn all() -> Vec<Self> {
        let mut tiers: Vec<Self> = Self::STEPS.iter().map(|s| s.tier).collect();
        tiers.push(Self::FLOOR);
        tiers
    }

    /// Parse a warehouse label back into a tier
    fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.label() == label)
    }

    /// Render a SQL `CASE` expression classifying `expr`.
    ///
    /// NULL metrics are coalesced to zero so they land in the floor tier.
    fn case_sql(expr: &str) -> String {
        let mut sql = String::from("CASE");
        for step in Self::STEPS {
            sql.push_str(&format!(
                " WHEN COALESCE({}, 0) >= {} THEN '{}'",
                expr,
                step.min,
                step.tier.label()
            ));
        }
        sql.push_str(&format!(" ELSE '{}' END", Self::FLOOR.label()));
        sql
    }
}

/// Customer value tier, from lifetime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerValueTier {
    Vip,
    HighValue,
    MediumValue,
    LowValue,
}

impl Tier for CustomerValueTier {
    const METRIC: &'static str = "lifetime_value";

    const STEPS: &'static [Step<Self>] = &[
        Step {
            tier: Self::Vip,
            min: 5000.0,
        },
        Step {
            tier: Self::HighValue,
            min: 2000.0,
        },
        Step {
            tier: Self::MediumValue,
            min: 500.0,
        },
    ];

    const FLOOR: Self = Self::LowValue;

    fn label(&self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::HighValue => "High Value",
            Self::MediumValue => "Medium Value",
            Self::LowValue => "Low Value",
        }
    }
}

/// Store performance tier, from total revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorePerformanceTier {
    HighPerforming,
    MediumPerforming,
    LowPerforming,
}

impl Tier for StorePerformanceTier {
    const METRIC: &'static str = "total_revenue";

    const STEPS: &'static [Step<Self>] = &[
        Step {
            tier: Self::HighPerforming,
            min: 100_000.0,
        },
        Step {
            tier: Self::MediumPerforming,
            min: 50_000.0,
        },
    ];

    const FLOOR: Self = Self::LowPerforming;

    fn label(&self) -> &'static str {
        match self {
            Self::HighPerforming => "High Performing",
            Self::MediumPerforming => "Medium Performing",
            Self::LowPerforming => "Low Performing",
        }
    }
}

/// Product performance category, from units sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductPerformanceCategory {
    BestSeller,
    Popular,
    Average,
    SlowMoving,
}

impl Tier for ProductPerformanceCategory {
    const METRIC: &'static str = "total_units_sold";

    const STEPS: &'static [Step<Self>] = &[
        Step {
            tier: Self::BestSeller,
            min: 100.0,
        },
        Step {
            tier: Self::Popular,
            min: 50.0,
        },
        Step {
            tier: Self::Average,
            min: 10.0,
        },
    ];

    const FLOOR: Self = Self::SlowMoving;

    fn label(&self) -> &'static str {
        match self {
            Self::BestSeller => "Best Seller",
            Self::Popular => "Popular",
            Self::Average => "Average",
            Self::SlowMoving => "Slow Moving",
        }
    }
}

macro_rules! impl_tier_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

impl_tier_display!(
    CustomerValueTier,
    StorePerformanceTier,
    ProductPerformanceCategory
);

#[cfg(test)]
#[path = "tier_test.rs"]
mod tests;
