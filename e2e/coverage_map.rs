//! E2E Test Suite 04: Coverage maps
//!
//! Exercises the coverage log end to end: implicit records from reads,
//! suspension, explicit records, and summarisation into a sorted, merged
//! map.

use std::io::SeekFrom;

use binview::{default_coverage_compare, Accessor, CoverageForce, CoverageRecord};

fn rec(offset: usize, size: usize, usage1: u64, usage2: usize) -> CoverageRecord {
    CoverageRecord {
        offset,
        size,
        usage1,
        usage2,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: the full recording + summarisation sequence
// ─────────────────────────────────────────────────────────────────────────────

/// Single-byte reads log unit records that the summary merges; suspended
/// reads log nothing; an explicit record with its own usage pair stays
/// separate.
#[test]
fn record_suspend_summarise() {
    let data = vec![0u8; 65_536];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.allow_coverage(true);
    a.set_coverage_usage(0, 1);

    // Four unit reads at offsets 0..=3.
    for off in 0..4usize {
        a.read_u8().unwrap();
        let records = a.coverage_records();
        assert_eq!(records.last().copied(), Some(rec(off, 1, 0, 1)));
    }

    // Two reads under suspension: bytes 4 and 5, no records.
    a.suspend_coverage();
    a.read_u8().unwrap();
    a.read_u8().unwrap();
    assert_eq!(a.coverage_records().len(), 4);
    a.resume_coverage();

    // Byte 6 is recorded again.
    a.read_u8().unwrap();
    assert_eq!(a.coverage_records().last().copied(), Some(rec(6, 1, 0, 1)));

    // Explicit record at the cursor with a distinct usage pair.
    a.add_coverage_record(a.cursor(), Some(1), 2, 3, CoverageForce::OnlyIfEnabled);

    a.summarize_coverage();
    assert_eq!(
        a.coverage_records(),
        &[rec(0, 4, 0, 1), rec(6, 1, 0, 1), rec(7, 1, 2, 3)]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: summarisation properties
// ─────────────────────────────────────────────────────────────────────────────

/// Summarising twice changes nothing, and the output is sorted by the
/// default key.
#[test]
fn summarise_is_idempotent_and_sorted() {
    let data = vec![0u8; 256];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.allow_coverage(true);

    // Log out of order through explicit records.
    for (off, size, u1) in [(32usize, 8usize, 0u64), (0, 16, 0), (16, 16, 0), (40, 8, 5)] {
        a.add_coverage_record(off, Some(size), u1, 0, CoverageForce::OnlyIfEnabled);
    }
    a.summarize_coverage();
    let once = a.coverage_records().to_vec();
    assert_eq!(once, vec![rec(0, 40, 0, 0), rec(40, 8, 5, 0)]);

    a.summarize_coverage();
    assert_eq!(a.coverage_records(), &once[..]);

    for pair in a.coverage_records().windows(2) {
        assert_eq!(
            default_coverage_compare(&pair[0], &pair[1]),
            std::cmp::Ordering::Less
        );
    }
}

/// Caller-supplied ordering and merge rules replace the defaults: merging
/// everything with equal usage1 regardless of adjacency.
#[test]
fn summarise_with_custom_rules() {
    let data = vec![0u8; 64];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
    a.allow_coverage(true);
    for (off, u1) in [(0usize, 1u64), (50, 1), (10, 2)] {
        a.add_coverage_record(off, Some(4), u1, 0, CoverageForce::OnlyIfEnabled);
    }
    a.summarize_coverage_with(
        |x, y| x.usage1.cmp(&y.usage1).then(x.offset.cmp(&y.offset)),
        |into, next| {
            if into.usage1 != next.usage1 {
                return false;
            }
            let end = (into.offset + into.size).max(next.offset + next.size);
            into.size = end - into.offset;
            true
        },
    );
    assert_eq!(a.coverage_records(), &[rec(0, 54, 1, 0), rec(10, 4, 2, 0)]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: explicit record edge cases
// ─────────────────────────────────────────────────────────────────────────────

/// Out-of-window records vanish silently; forced records bypass the
/// enable flag but not suspension; open-ended records run to the window
/// end.
#[test]
fn explicit_record_bounds() {
    let data = vec![0u8; 32];
    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();

    // Disabled log: only forced records land.
    a.add_coverage_record(0, Some(4), 0, 0, CoverageForce::OnlyIfEnabled);
    assert!(a.coverage_records().is_empty());
    a.add_coverage_record(0, Some(4), 0, 0, CoverageForce::EvenIfDisabled);
    assert_eq!(a.coverage_records().len(), 1);

    // Out of window: dropped without error.
    a.add_coverage_record(33, Some(1), 0, 0, CoverageForce::EvenIfDisabled);
    a.add_coverage_record(30, Some(4), 0, 0, CoverageForce::EvenIfDisabled);
    assert_eq!(a.coverage_records().len(), 1);

    // Open-ended size.
    a.add_coverage_record(24, None, 9, 9, CoverageForce::EvenIfDisabled);
    assert_eq!(a.coverage_records().last().copied(), Some(rec(24, 8, 9, 9)));

    // Suspension beats force.
    a.suspend_coverage();
    a.add_coverage_record(0, Some(1), 0, 0, CoverageForce::EvenIfDisabled);
    assert_eq!(a.coverage_records().len(), 2);
    a.resume_coverage();
}

/// Failed reads log nothing; scanning string reads log the terminator too.
#[test]
fn implicit_records_match_consumption() {
    let mut payload = b"key\0".to_vec();
    payload.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);
    let mut a = Accessor::open_reading_bytes(&payload, 0, None).unwrap();
    a.allow_coverage(true);

    assert_eq!(a.read_c_string().unwrap(), b"key");
    assert_eq!(a.coverage_records(), &[rec(0, 4, 0, 0)]);

    a.read_u32_endian(binview::Endianness::Big).unwrap();
    assert_eq!(a.coverage_records().len(), 2);
    assert_eq!(a.coverage_records()[1], rec(4, 4, 0, 0));

    // Nothing left: the failed read leaves the log alone.
    assert!(a.read_u8().is_err());
    assert_eq!(a.coverage_records().len(), 2);

    // The default merge folds the two adjacent same-usage records.
    a.summarize_coverage();
    assert_eq!(a.coverage_records(), &[rec(0, 8, 0, 0)]);
}
