//! Property tests for the docid gap codec.
//!
//! Verifies:
//! 1. Encoding then decoding returns the original docids
//! 2. Every gap after the first is positive and the gaps sum to the last docid
//! 3. Any out-of-order input is rejected with its position
//! 4. Decoding never panics on arbitrary postings

use ciff::{absolute_postings, decode_postings, encode_postings, CiffError, Posting};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strictly increasing docids within the int32 range, with matching tfs.
fn sorted_postings_strategy() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    prop::collection::btree_set(0u32..=i32::MAX as u32, 0..200).prop_flat_map(|set| {
        let docids: Vec<u32> = set.into_iter().collect();
        let len = docids.len();
        (Just(docids), prop::collection::vec(1u32..1000, len))
    })
}

/// Dense runs: small gaps, the common case in real collections.
fn dense_postings_strategy() -> impl Strategy<Value = Vec<u32>> {
    (0u32..1000, prop::collection::vec(1u32..4, 1..500)).prop_map(|(start, gaps)| {
        let mut docid = start;
        let mut out = vec![docid];
        for gap in gaps {
            docid += gap;
            out.push(docid);
        }
        out
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_roundtrip((docids, tfs) in sorted_postings_strategy()) {
        let encoded = encode_postings(&docids, &tfs).unwrap();
        prop_assert_eq!(encoded.len(), docids.len());
        prop_assert_eq!(decode_postings(&encoded).unwrap(), docids);

        let tfs_back: Vec<u32> = encoded.iter().map(|p| p.tf).collect();
        prop_assert_eq!(tfs_back, tfs);
    }

    #[test]
    fn prop_gaps_positive_and_sum_to_last((docids, tfs) in sorted_postings_strategy()) {
        let encoded = encode_postings(&docids, &tfs).unwrap();
        for posting in encoded.iter().skip(1) {
            prop_assert!(posting.docid > 0);
        }
        let sum: u64 = encoded.iter().map(|p| p.docid as u64).sum();
        prop_assert_eq!(sum, docids.last().copied().unwrap_or(0) as u64);
    }

    #[test]
    fn prop_dense_roundtrip(docids in dense_postings_strategy()) {
        let tfs = vec![1; docids.len()];
        let encoded = encode_postings(&docids, &tfs).unwrap();
        prop_assert!(encoded.iter().skip(1).all(|p| p.docid < 4));
        prop_assert_eq!(decode_postings(&encoded).unwrap(), docids);
    }

    #[test]
    fn prop_swapped_pair_rejected(
        (docids, tfs) in sorted_postings_strategy().prop_filter("need two", |(d, _)| d.len() >= 2),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut docids = docids;
        let i = pick.index(docids.len() - 1);
        docids.swap(i, i + 1);

        match encode_postings(&docids, &tfs) {
            Err(CiffError::UnsortedInput { position, previous, current }) => {
                prop_assert_eq!(position, i + 1);
                prop_assert!(current < previous);
            }
            other => prop_assert!(false, "expected UnsortedInput, got {:?}", other),
        }
    }

    #[test]
    fn prop_decode_never_panics(raw in prop::collection::vec((any::<u32>(), 1u32..10), 0..50)) {
        let postings: Vec<Posting> = raw
            .into_iter()
            .map(|(docid, tf)| Posting { docid, tf })
            .collect();

        match decode_postings(&postings) {
            Ok(docids) => {
                prop_assert_eq!(docids.len(), postings.len());
                prop_assert!(docids.windows(2).all(|w| w[0] < w[1]));
            }
            Err(CiffError::CorruptDelta { position, .. }) => {
                prop_assert!(position >= 1 && position < postings.len());
                // The lazy iterator stops at the same place.
                let decoded = absolute_postings(&postings).take_while(|p| p.is_ok()).count();
                prop_assert_eq!(decoded, position);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
