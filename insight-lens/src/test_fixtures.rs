//! Deterministic retail fixtures for tests and benchmarks.
//!
//! Two tables, `orders` and `customers`, joined on `customer_id`, with
//! matching column analyses and generated order rows.

use serde_json::json;

use crate::model::{
    field_hash, Aggregation, ColumnAnalysis, DataFrameAnalysis, Field, FieldType, Insight,
    InsightJoin, InsightMetric, JoinKind, Row, Semantic, Table,
};
use crate::suggestions::rng::SeededRng;

pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
pub const CATEGORIES: [&str; 5] = ["Furniture", "Office", "Technology", "Garden", "Toys"];

/// The `orders` table.
pub fn orders_table() -> Table {
    Table::new(
        "orders",
        "Orders",
        vec![
            Field::new("o_id", "order_id", FieldType::Number).identifier(),
            Field::new("o_customer", "customer_id", FieldType::Number).reference(),
            Field::new("o_date", "order_date", FieldType::Date),
            Field::new("o_region", "region", FieldType::String),
            Field::new("o_category", "category", FieldType::String),
            Field::new("o_sales", "sales", FieldType::Number),
            Field::new("o_quantity", "quantity", FieldType::Number),
            Field::new("o_discount", "discount_rate", FieldType::Number),
        ],
    )
}

/// The `customers` table.
pub fn customers_table() -> Table {
    Table::new(
        "customers",
        "Customers",
        vec![
            Field::new("c_id", "customer_key", FieldType::Number).identifier(),
            Field::new("c_segment", "segment", FieldType::String),
            Field::new("c_age", "age", FieldType::Number),
        ],
    )
}

/// Analysis of [`orders_table`] over 1 000 rows.
pub fn orders_analysis() -> DataFrameAnalysis {
    let table = orders_table();
    DataFrameAnalysis::new(
        vec![
            ColumnAnalysis::numerical("order_id", 1_000, 1.0, 1_000.0)
                .with_field_id("o_id")
                .with_semantic(Semantic::Identifier),
            ColumnAnalysis::numerical("customer_id", 200, 1.0, 200.0).with_field_id("o_customer"),
            ColumnAnalysis::temporal("order_date", 365).with_field_id("o_date"),
            ColumnAnalysis::categorical("region", 4)
                .with_field_id("o_region")
                .with_max_frequency_ratio(0.3),
            ColumnAnalysis::categorical("category", 5)
                .with_field_id("o_category")
                .with_max_frequency_ratio(0.25),
            ColumnAnalysis::numerical("sales", 950, 2.5, 4_999.0)
                .with_field_id("o_sales")
                .with_null_count(12),
            ColumnAnalysis::numerical("quantity", 20, 1.0, 20.0).with_field_id("o_quantity"),
            ColumnAnalysis::numerical("discount_rate", 11, 0.0, 0.5)
                .with_field_id("o_discount")
                .with_zero_count(300),
        ],
        1_000,
        field_hash(table.field_ids()),
    )
}

/// Analysis of [`customers_table`] over 200 rows.
pub fn customers_analysis() -> DataFrameAnalysis {
    let table = customers_table();
    DataFrameAnalysis::new(
        vec![
            ColumnAnalysis::numerical("customer_key", 200, 1.0, 200.0)
                .with_field_id("c_id")
                .with_semantic(Semantic::Identifier),
            ColumnAnalysis::categorical("segment", 3)
                .with_field_id("c_segment")
                .with_max_frequency_ratio(0.5),
            ColumnAnalysis::numerical("age", 60, 18.0, 80.0).with_field_id("c_age"),
        ],
        200,
        field_hash(table.field_ids()),
    )
}

/// Generates `count` order rows. The same count always yields the same rows.
pub fn order_rows(count: usize) -> Vec<Row> {
    let mut rng = SeededRng::new(2024);
    (0..count)
        .filter_map(|i| {
            let region = REGIONS[(rng.next_u32() as usize) % REGIONS.len()];
            let category = CATEGORIES[(rng.next_u32() as usize) % CATEGORIES.len()];
            let sales = (rng.next_f64() * 5_000.0 * 100.0).round() / 100.0;
            let quantity = 1 + (rng.next_u32() % 20);
            let day = 1 + (rng.next_u32() % 28);
            let month = 1 + (i % 12);
            // Every 50th order has no recorded sales.
            let sales = if i % 50 == 49 { json!(null) } else { json!(sales) };
            let discount_rate = if i % 3 == 0 { 0.0 } else { 0.1 };
            json!({
                "order_id": i + 1,
                "customer_id": 1 + (i % 200),
                "order_date": format!("2024-{month:02}-{day:02}"),
                "region": region,
                "category": category,
                "sales": sales,
                "quantity": quantity,
                "discount_rate": discount_rate,
            })
            .as_object()
            .cloned()
        })
        .collect()
}

/// Total and average sales per region, with an order count.
pub fn sales_by_region_insight() -> Insight {
    Insight::new("sales_by_region", "Sales by region", "orders")
        .with_selected_fields(["o_region"])
        .with_metric(InsightMetric::new(
            "m_total",
            "total_sales",
            Some("sales"),
            Aggregation::Sum,
        ))
        .with_metric(InsightMetric::new(
            "m_avg",
            "avg_sales",
            Some("sales"),
            Aggregation::Avg,
        ))
        .with_metric(InsightMetric::count("m_orders", "orders"))
}

/// [`sales_by_region_insight`] joined with customers.
pub fn joined_insight() -> Insight {
    sales_by_region_insight().with_join(InsightJoin {
        table_id: "customers".to_string(),
        left_column: "customer_id".to_string(),
        right_column: "customer_key".to_string(),
        kind: JoinKind::Left,
    })
}

/// An analysis with `columns` columns cycling through every role.
pub fn wide_analysis(columns: usize) -> DataFrameAnalysis {
    let cols = (0..columns)
        .map(|i| match i % 4 {
            0 => ColumnAnalysis::numerical(format!("amount_{i}"), 500, 0.0, 1_000.0 + i as f64),
            1 => ColumnAnalysis::categorical(format!("group_{i}"), 3 + (i as u64 % 20)),
            2 => ColumnAnalysis::temporal(format!("date_{i}"), 100),
            _ => ColumnAnalysis::categorical(format!("flag_{i}"), 2 + (i as u64 % 6))
                .with_max_frequency_ratio(0.4),
        })
        .collect();
    DataFrameAnalysis::new(cols, 10_000, format!("wide_{columns}"))
}
