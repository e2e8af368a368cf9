//! Shared helpers for integration tests.
#![allow(dead_code)]

use insight_lens::model::{
    field_hash, Aggregation, ColumnAnalysis, DataFrameAnalysis, Field, FieldType, Insight,
    InsightMetric, Row, Semantic, Table,
};
use serde_json::{json, Value};

/// Converts JSON objects into rows, dropping anything that is not an object.
pub fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}

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
        ],
    )
}

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

pub fn orders_analysis() -> DataFrameAnalysis {
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
            ColumnAnalysis::numerical("sales", 950, 2.5, 4_999.0).with_field_id("o_sales"),
            ColumnAnalysis::numerical("quantity", 20, 1.0, 20.0).with_field_id("o_quantity"),
        ],
        1_000,
        field_hash(orders_table().field_ids()),
    )
}

pub fn customers_analysis() -> DataFrameAnalysis {
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
        field_hash(customers_table().field_ids()),
    )
}

/// Six orders over two regions and two categories.
pub fn small_orders() -> Vec<Row> {
    rows(vec![
        json!({"order_id": 1, "region": "North", "category": "Toys", "sales": 100, "quantity": 1}),
        json!({"order_id": 2, "region": "South", "category": "Toys", "sales": 40, "quantity": 2}),
        json!({"order_id": 3, "region": "North", "category": "Garden", "sales": 60, "quantity": 3}),
        json!({"order_id": 4, "region": "South", "category": "Garden", "sales": null, "quantity": 4}),
        json!({"order_id": 5, "region": "North", "category": "Toys", "sales": "25", "quantity": 5}),
        json!({"order_id": 6, "region": null, "category": "Toys", "sales": 10, "quantity": 6}),
    ])
}

pub fn sum_metric(name: &str, column: &str) -> InsightMetric {
    InsightMetric::new(format!("m_{name}"), name, Some(column), Aggregation::Sum)
}

pub fn by_region() -> Insight {
    Insight::new("by_region", "Sales by region", "orders")
        .with_selected_fields(["o_region"])
        .with_metric(sum_metric("total_sales", "sales"))
        .with_metric(InsightMetric::count("m_orders", "orders"))
}
