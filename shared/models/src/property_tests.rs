//! Property-based tests for classification and report ordering.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use crate::{ExpiryRecord, ReportEntry, ScanReport, ScanStats, TierThresholds, UrgencyTier};

prop_compose! {
    fn arb_reference_date()(offset in 0u64..20_000) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Days::new(offset)
    }
}

prop_compose! {
    fn arb_thresholds()(
        critical in 1u32..20,
        urgent_gap in 1u32..60,
        warning in 30u32..=180,
    ) -> TierThresholds {
        TierThresholds {
            critical_days: critical,
            urgent_days: critical + urgent_gap,
            warning_days: warning,
        }
    }
}

prop_compose! {
    fn arb_entry()(
        days in -400i64..400,
        label in "[A-Za-z]{1,12}",
        row in 2usize..500,
    ) -> ReportEntry {
        let reference = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let expiry = reference + chrono::Duration::days(days);
        ReportEntry::evaluate(
            ExpiryRecord::new("Sheet1", row, expiry).with_label(label),
            reference,
            &TierThresholds::default(),
        )
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Days-until-expiry is the plain calendar difference.
    #[test]
    fn prop_days_until_expiry_is_date_difference(
        reference in arb_reference_date(),
        delta in -1000i64..1000,
    ) {
        let expiry = reference + chrono::Duration::days(delta);
        let record = ExpiryRecord::new("Sheet1", 2, expiry);
        prop_assert_eq!(record.days_until(reference), delta);
    }

    /// Classification depends only on the day count and thresholds.
    #[test]
    fn prop_classification_is_deterministic(days in -1000i64..1000, thresholds in arb_thresholds()) {
        let first = UrgencyTier::classify(days, &thresholds);
        let second = UrgencyTier::classify(days, &thresholds);
        prop_assert_eq!(first, second);

        if days <= 0 {
            prop_assert_eq!(first, UrgencyTier::Expired);
        } else if days > i64::from(thresholds.warning_days) {
            prop_assert_eq!(first, UrgencyTier::Ok);
        } else {
            prop_assert!(first.is_reportable());
        }
    }

    /// Fewer remaining days never yields a less severe tier.
    #[test]
    fn prop_severity_is_monotonic(a in -500i64..500, b in -500i64..500, thresholds in arb_thresholds()) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            UrgencyTier::classify(near, &thresholds).severity()
                >= UrgencyTier::classify(far, &thresholds).severity()
        );
    }

    /// Sorting an already sorted report changes nothing.
    #[test]
    fn prop_sorting_is_idempotent(entries in prop::collection::vec(arb_entry(), 0..40)) {
        let mut once = entries.clone();
        ScanReport::sort_entries(&mut once);
        let mut twice = once.clone();
        ScanReport::sort_entries(&mut twice);
        prop_assert_eq!(&once, &twice);

        for pair in once.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.tier.severity() >= b.tier.severity());
            if a.tier == b.tier {
                prop_assert!(a.days_until_expiry <= b.days_until_expiry);
            }
        }
    }

    /// Per-tier counts always add up to the number of entries.
    #[test]
    fn prop_counts_match_entries(entries in prop::collection::vec(arb_entry(), 0..40)) {
        let total = entries.len();
        let report = ScanReport::new(
            "prop.xlsx",
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            TierThresholds::default(),
            entries,
            ScanStats::default(),
            Vec::new(),
        );
        prop_assert_eq!(report.counts().total(), total);
        prop_assert_eq!(report.stats().items_found, total);
    }
}
