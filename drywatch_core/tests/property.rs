use drywatch_core::decode::{VALUE_ERROR, VALUE_INVALID, decode_digit_pair, decode_material};
use drywatch_core::filter::Debounce;
use proptest::prelude::*;

proptest! {
    /// The digit decoder is total: any byte pair yields a plain value, the
    /// error sentinel or the invalid sentinel, and never panics.
    #[test]
    fn digit_decode_is_total(high: u8, low: u8, is_temp: bool) {
        let v = decode_digit_pair(high, low, is_temp);
        // Tens reach 90 (plus 100 with the temperature decimal point); the
        // ones half may decode to the letter entry, i.e. 10.
        let plain_max = if is_temp { 200 } else { 100 };
        prop_assert!(
            u32::from(v) <= plain_max || v == VALUE_ERROR || v == VALUE_INVALID,
            "unexpected decode result {v}"
        );
    }

    /// The material decoder is total and only ever names a real table index.
    #[test]
    fn material_decode_is_total(region: [u8; 6]) {
        if let Some(idx) = decode_material(&region) {
            prop_assert!(idx < 12);
        }
    }

    /// A value is only ever forwarded when the required number of identical
    /// observations immediately precede it, and the same value is never
    /// forwarded twice in a row.
    #[test]
    fn debounce_requires_consecutive_agreement(
        values in proptest::collection::vec(0u8..4, 1..200),
        repeats in 1u8..6,
    ) {
        let mut filter: Debounce<u8> = Debounce::new(repeats);
        let mut history: Vec<u8> = Vec::new();
        let mut published: Vec<u8> = Vec::new();

        for &v in &values {
            history.push(v);
            if let Some(out) = filter.observe(v) {
                prop_assert_eq!(out, v);
                // The trailing `repeats` observations must all equal `v`.
                let n = usize::from(repeats);
                prop_assert!(history.len() >= n);
                prop_assert!(
                    history[history.len() - n..].iter().all(|&h| h == v),
                    "published {} without {} consecutive sightings", v, n
                );
                // No duplicate back-to-back publications.
                prop_assert_ne!(published.last().copied(), Some(v));
                published.push(out);
            }
        }
    }
}
