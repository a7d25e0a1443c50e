use daq_filter::{filter, summarize};
use domain::{ReadingValue, ValidRange};

/// 生成确定性的伪随机批次（线性同余）。
fn batches() -> Vec<Vec<f64>> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64 / (1u64 << 53) as f64) * 3000.0 - 1000.0
    };
    let mut batches = vec![Vec::new()];
    for len in 1..64 {
        batches.push((0..len).map(|_| next()).collect());
    }
    batches
}

#[test]
fn value_never_leaves_range() {
    let ranges = [
        ValidRange::exclusive(0.0, 1000.0),
        ValidRange::inclusive(-50.0, 150.0),
        ValidRange::inclusive(0.0, 10.0),
        ValidRange::inclusive(999.0, 999.5),
    ];
    for range in ranges {
        for batch in batches() {
            match filter(&batch, &range) {
                ReadingValue::Value(v) => assert!(range.contains(v), "{v} outside {range:?}"),
                ReadingValue::NoData(_) => {}
            }
        }
    }
}

#[test]
fn no_data_iff_every_sample_rejected() {
    let range = ValidRange::inclusive(-50.0, 150.0);
    for batch in batches() {
        let summary = summarize(&batch, &range);
        let all_rejected = batch.iter().all(|sample| !range.contains(*sample));
        assert_eq!(summary.value.is_no_data(), all_rejected);
        assert_eq!(summary.accepted + summary.rejected, batch.len());
    }
}

#[test]
fn identical_samples_at_bound_stay_in_range() {
    let range = ValidRange::inclusive(0.0, 0.1);
    let batch = vec![0.1; 7];
    assert_eq!(filter(&batch, &range), ReadingValue::Value(0.1));
}
