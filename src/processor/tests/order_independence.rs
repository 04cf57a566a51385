//! Statistics must not depend on the order files are merged in

use super::{body_line, test_config, write_data_file};
use crate::aggregate::{YearAggregator, YearMap};
use crate::models::Granularity;
use crate::parser::RecordParser;
use crate::processor::PrecipProcessor;
use crate::stats::StatisticsCalculator;
use tempfile::TempDir;

fn file_maps(granularity: Granularity) -> Vec<YearMap> {
    let parser = RecordParser::new(granularity, 12);
    let bodies = [
        vec![body_line(2000, 1, 0.1), body_line(2001, 1, 0.7)],
        vec![body_line(2000, 2, 0.2), body_line(2002, 5, 3.3)],
        vec![body_line(2001, 2, 0.3), body_line(2000, 3, 1e-3)],
    ];
    bodies
        .iter()
        .map(|body| parser.parse_lines(body, 3).year_map)
        .collect()
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![vec![]];
    }
    let mut result = Vec::new();
    for rest in permutations(n - 1) {
        for position in 0..=rest.len() {
            let mut order = rest.clone();
            order.insert(position, n - 1);
            result.push(order);
        }
    }
    result
}

/// Merge the maps in every order and check the statistics never change
fn assert_merge_orders_identical(maps: &[YearMap]) {
    let orders = permutations(maps.len());
    assert_eq!(orders.len(), 6);

    let mut reference = None;
    for order in orders {
        let mut aggregator = YearAggregator::new();
        for index in order {
            aggregator.add(maps[index].clone());
        }
        let year_map = aggregator.finish();
        let stats = StatisticsCalculator::compute(&year_map);

        match &reference {
            None => reference = Some((year_map, stats)),
            Some((expected_map, expected_stats)) => {
                assert_eq!(&year_map, expected_map);
                assert_eq!(&stats, expected_stats);
            }
        }
    }
}

#[test]
fn test_all_merge_orders_identical() {
    assert_merge_orders_identical(&file_maps(Granularity::Daily));
}

#[test]
fn test_all_merge_orders_identical_monthly_sums() {
    let maps = file_maps(Granularity::MonthlySum);
    // One sum per line, never the daily values
    assert_eq!(maps[0].get(2000).unwrap().count(), 1);
    assert_merge_orders_identical(&maps);
}

#[tokio::test]
async fn test_worker_count_does_not_change_report() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..8 {
        let value = 0.1 * (i + 1) as f64;
        write_data_file(
            temp_dir.path(),
            &format!("station{}.dat", i),
            &[body_line(2000 + i % 3, 1, value), body_line(2001, 2, value)],
        );
    }

    let sequential = PrecipProcessor::new(
        temp_dir.path().to_path_buf(),
        test_config(Granularity::Daily).with_max_concurrent_files(1),
    )
    .unwrap()
    .process()
    .await
    .unwrap();

    let parallel = PrecipProcessor::new(
        temp_dir.path().to_path_buf(),
        test_config(Granularity::Daily).with_max_concurrent_files(8),
    )
    .unwrap()
    .process()
    .await
    .unwrap();

    assert_eq!(sequential.statistics, parallel.statistics);
    assert_eq!(sequential.year_map, parallel.year_map);
    assert_eq!(sequential.files, parallel.files);
}
