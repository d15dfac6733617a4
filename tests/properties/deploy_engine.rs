//! Properties of the deploy engine primitives.
//!
//! Fingerprinting and atomic replacement must agree with naive byte
//! comparison for every input, not just the curated unit-test cases.

use std::fs;

use proptest::prelude::*;
use tempfile::tempdir;

use accdev::cancel::CancelToken;
use accdev::deploy::{replace_file, ReplaceOutcome};
use accdev::fingerprint::{fingerprint_file, Fingerprint};

fn file_content() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..4096)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// PROPERTY: Two fingerprints match exactly when the underlying bytes
    /// are equal.
    #[test]
    fn fingerprints_match_iff_content_matches(a in file_content(), b in file_content()) {
        let fp_a = Fingerprint::from_bytes(&a);
        let fp_b = Fingerprint::from_bytes(&b);
        prop_assert_eq!(fp_a.matches(&fp_b), a == b);
    }

    /// PROPERTY: Block-wise file hashing agrees with hashing the whole
    /// buffer in memory.
    #[test]
    fn file_fingerprint_agrees_with_bytes(content in file_content()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.accdb");
        fs::write(&path, &content).unwrap();

        let from_file = fingerprint_file(&path, &CancelToken::new()).unwrap();
        prop_assert!(from_file.matches(&Fingerprint::from_bytes(&content)));
    }

    /// PROPERTY: After a replacement the target holds exactly the source
    /// bytes, the source is untouched, and the outcome reports whether
    /// anything was written.
    #[test]
    fn replacement_leaves_target_with_source_content(
        source_content in file_content(),
        target_content in proptest::option::of(file_content()),
    ) {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.accdb");
        let target = dir.path().join("target.accdb");
        fs::write(&source, &source_content).unwrap();
        if let Some(existing) = &target_content {
            fs::write(&target, existing).unwrap();
        }

        let outcome = replace_file(&source, &target, &CancelToken::new());

        let expected = if target_content.as_deref() == Some(source_content.as_slice()) {
            ReplaceOutcome::UpToDate
        } else {
            ReplaceOutcome::Replaced
        };
        prop_assert_eq!(outcome, expected);
        prop_assert_eq!(&fs::read(&target).unwrap(), &source_content);
        prop_assert_eq!(&fs::read(&source).unwrap(), &source_content);
    }
}
