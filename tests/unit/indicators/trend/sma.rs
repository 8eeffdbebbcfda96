//! Unit tests for SMA indicator

use radar::indicators::trend::{calculate_sma, latest_sma};

#[test]
fn test_sma_window() {
    let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_latest_sma() {
    assert_eq!(latest_sma(&[10.0, 9.0, 11.0, 12.0, 13.0], 5), Some(11.0));
    assert_eq!(latest_sma(&[10.0, 9.0, 11.0, 12.0, 13.0], 2), Some(12.5));
}

#[test]
fn test_sma_insufficient_data() {
    assert_eq!(latest_sma(&[1.0, 2.0], 3), None);
    assert_eq!(latest_sma(&[1.0, 2.0], 0), None);
    assert!(calculate_sma(&[1.0, 2.0], 3).iter().all(Option::is_none));
}
