//! Lag aggregation over decoded controller responses.

use std::collections::BTreeSet;

use integration_tests::fixtures::{
    consuming_info, decode, duplicated_partition_info, orders_info, replica,
};
use lag_core::{aggregate, parse_lag, PartitionLag, TableLagSummary};

fn partition_set(summary: &TableLagSummary) -> BTreeSet<PartitionLag> {
    summary.partitions().iter().cloned().collect()
}

#[test]
fn test_orders_table_over_threshold() {
    let info = decode(&orders_info());

    let result = aggregate("orders_REALTIME", info.segments(), 70);
    assert_eq!(result.len(), 1);

    let summary = &result[0];
    assert_eq!(summary.table_name(), "orders_REALTIME");
    assert_eq!(summary.total_lag(), 80);
    assert_eq!(
        partition_set(summary),
        BTreeSet::from([
            PartitionLag::new("0", 50),
            PartitionLag::new("1", 30),
            PartitionLag::new("2", 0),
        ])
    );
}

#[test]
fn test_orders_table_under_threshold() {
    let info = decode(&orders_info());
    assert!(aggregate("orders_REALTIME", info.segments(), 81).is_empty());
}

#[test]
fn test_threshold_boundary() {
    let info = decode(&orders_info());
    assert_eq!(aggregate("orders_REALTIME", info.segments(), 80).len(), 1);
    assert!(aggregate("orders_REALTIME", info.segments(), 81).is_empty());
}

#[test]
fn test_empty_response_yields_nothing() {
    for body in [consuming_info(vec![]), serde_json::json!({})] {
        let info = decode(&body);
        for threshold in [0, 1, 1_000_000] {
            assert!(aggregate("orders_REALTIME", info.segments(), threshold).is_empty());
        }
    }
}

#[test]
fn test_partition_reported_by_two_segments_is_summed() {
    let info = decode(&duplicated_partition_info());

    let result = aggregate("events_REALTIME", info.segments(), 0);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].total_lag(), 200);
    assert_eq!(
        result[0].partitions(),
        &[PartitionLag::new("0", 100), PartitionLag::new("0", 100)]
    );
}

#[test]
fn test_total_equals_partition_sum() {
    let info = decode(&consuming_info(vec![
        (
            "seg_a",
            vec![
                replica("s0", &[("0", "15"), ("1", ""), ("2", "-3")]),
                replica("s1", &[("3", "UNAVAILABLE"), ("4", "9000")]),
            ],
        ),
        ("seg_b", vec![replica("s2", &[("0", "15")])]),
    ]));

    let result = aggregate("t_REALTIME", info.segments(), 0);
    let summary = &result[0];
    let sum: i64 = summary.partitions().iter().map(|p| p.lag).sum();

    assert_eq!(summary.total_lag(), sum);
    assert_eq!(summary.total_lag(), 9027);
    assert_eq!(summary.partitions().len(), 6);
}

#[test]
fn test_aggregate_twice_gives_same_content() {
    let info = decode(&consuming_info(vec![
        ("seg_a", vec![replica("s0", &[("0", "1"), ("1", "2")])]),
        ("seg_b", vec![replica("s1", &[("2", "3")]), replica("s2", &[("3", "4")])]),
    ]));

    let first = aggregate("t_REALTIME", info.segments(), 5);
    let second = aggregate("t_REALTIME", info.segments(), 5);

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].total_lag(), second[0].total_lag());
    assert_eq!(partition_set(&first[0]), partition_set(&second[0]));
}

#[test]
fn test_coercion_contract() {
    for s in ["0", "1", "42", "-42", "1000000000000"] {
        assert_eq!(parse_lag(s), s.parse::<i64>().unwrap());
    }
    for s in ["", "bad", "1e3", "0x10", "NaN"] {
        assert_eq!(parse_lag(s), 0);
    }
}
