//! Dashboard panels and their queries

use crate::filters::Filters;
use serde::Serialize;

/// How a panel is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// Single row of labelled figures
    Metrics,
    /// Horizontal bars of `value` per `label`, other columns listed alongside
    Bars {
        label: &'static str,
        value: &'static str,
    },
    /// Plain table
    Table,
}

/// One dashboard panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Kpis,
    DailyRevenue,
    RevenueByCategory,
    TopProducts,
    StorePerformance,
    CustomerSegments,
    LoyaltyImpact,
    SalesByDayType,
    SalesByTimeOfDay,
}

impl Panel {
    /// Every panel in display order
    pub const ALL: [Panel; 9] = [
        Panel::Kpis,
        Panel::DailyRevenue,
        Panel::RevenueByCategory,
        Panel::TopProducts,
        Panel::StorePerformance,
        Panel::CustomerSegments,
        Panel::LoyaltyImpact,
        Panel::SalesByDayType,
        Panel::SalesByTimeOfDay,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Kpis => "Key Performance Indicators",
            Panel::DailyRevenue => "Daily Revenue Trend",
            Panel::RevenueByCategory => "Revenue by Category",
            Panel::TopProducts => "Top 10 Products by Revenue",
            Panel::StorePerformance => "Store Performance",
            Panel::CustomerSegments => "Customer Segments",
            Panel::LoyaltyImpact => "Loyalty Program Impact",
            Panel::SalesByDayType => "Sales by Day Type",
            Panel::SalesByTimeOfDay => "Sales by Time of Day",
        }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::Kpis => PanelKind::Metrics,
            Panel::DailyRevenue => PanelKind::Bars {
                label: "transaction_date",
                value: "revenue",
            },
            Panel::RevenueByCategory => PanelKind::Bars {
                label: "category",
                value: "revenue",
            },
            Panel::TopProducts | Panel::StorePerformance => PanelKind::Table,
            Panel::CustomerSegments => PanelKind::Bars {
                label: "customer_segment",
                value: "revenue",
            },
            Panel::LoyaltyImpact => PanelKind::Bars {
                label: "loyalty_status",
                value: "avg_line_value",
            },
            Panel::SalesByDayType => PanelKind::Bars {
                label: "day_type",
                value: "revenue",
            },
            Panel::SalesByTimeOfDay => PanelKind::Bars {
                label: "time_of_day",
                value: "revenue",
            },
        }
    }

    /// Query for this panel over `fact` narrowed by `filters`
    pub fn sql(&self, fact: &str, filters: &Filters) -> String {
        match self {
            Panel::Kpis => format!(
                "SELECT
    COUNT(DISTINCT transaction_id) AS total_transactions,
    COUNT(DISTINCT customer_id) AS unique_customers,
    CAST(COALESCE(SUM(total_amount), 0) AS DOUBLE) AS total_revenue,
    CAST(COALESCE(AVG(total_amount), 0) AS DOUBLE) AS avg_line_value,
    CAST(COALESCE(SUM(gross_profit), 0) AS DOUBLE) AS total_profit
FROM {fact}
{}",
                filters.where_clause(&[])
            ),
            Panel::DailyRevenue => format!(
                "SELECT
    transaction_date,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    COUNT(DISTINCT transaction_id) AS transactions
FROM {fact}
{}
GROUP BY transaction_date
ORDER BY transaction_date",
                filters.where_clause(&[])
            ),
            Panel::RevenueByCategory => format!(
                "SELECT
    category,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    COUNT(DISTINCT transaction_id) AS transactions
FROM {fact}
{}
GROUP BY category
ORDER BY revenue DESC, category
LIMIT 10",
                filters.where_clause(&["category IS NOT NULL"])
            ),
            Panel::TopProducts => format!(
                "SELECT
    product_id,
    product_name,
    category,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    CAST(SUM(quantity) AS BIGINT) AS units_sold
FROM {fact}
{}
GROUP BY product_id, product_name, category
ORDER BY revenue DESC, product_id
LIMIT 10",
                filters.where_clause(&[])
            ),
            Panel::StorePerformance => format!(
                "SELECT
    store_type,
    store_city,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    COUNT(DISTINCT transaction_id) AS transactions
FROM {fact}
{}
GROUP BY store_type, store_city
ORDER BY revenue DESC, store_type, store_city
LIMIT 10",
                filters.where_clause(&["store_type IS NOT NULL"])
            ),
            Panel::CustomerSegments => format!(
                "SELECT
    customer_segment,
    COUNT(DISTINCT customer_id) AS customers,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue
FROM {fact}
{}
GROUP BY customer_segment
ORDER BY revenue DESC, customer_segment",
                filters.where_clause(&["customer_segment IS NOT NULL"])
            ),
            Panel::LoyaltyImpact => format!(
                "SELECT
    CASE WHEN loyalty_member THEN 'Member' ELSE 'Non-Member' END AS loyalty_status,
    CAST(AVG(total_amount) AS DOUBLE) AS avg_line_value,
    COUNT(DISTINCT customer_id) AS customers
FROM {fact}
{}
GROUP BY loyalty_status
ORDER BY loyalty_status",
                filters.where_clause(&[])
            ),
            Panel::SalesByDayType => format!(
                "SELECT
    day_type,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    COUNT(DISTINCT transaction_id) AS transactions
FROM {fact}
{}
GROUP BY day_type
ORDER BY day_type",
                filters.where_clause(&["day_type IS NOT NULL"])
            ),
            Panel::SalesByTimeOfDay => format!(
                "SELECT
    time_of_day,
    CAST(SUM(total_amount) AS DOUBLE) AS revenue,
    COUNT(DISTINCT transaction_id) AS transactions
FROM {fact}
{}
GROUP BY time_of_day
ORDER BY MIN(date_part('hour', transaction_time))",
                filters.where_clause(&["time_of_day IS NOT NULL"])
            ),
        }
    }
}
