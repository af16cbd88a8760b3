//! Property-based tests for report decoding and orientation integration.

use proptest::prelude::*;
use spacemouse::protocol::{decode, to_int16, Report, TAG_BUTTON, TAG_ROTATION, TAG_TRANSLATION};
use spacemouse::rotation::{incremental, is_orthonormal, mul, orthonormalize, SEED_ROTATION};
use spacemouse::{DeviceProfile, ReportLayout, SpaceMouseError};

fn profile(layout: ReportLayout) -> DeviceProfile {
    match layout {
        ReportLayout::Split => DeviceProfile::spacemouse_compact(),
        ReportLayout::Combined => DeviceProfile::spacemouse_wireless(),
    }
}

fn layout_strategy() -> impl Strategy<Value = ReportLayout> {
    prop_oneof![Just(ReportLayout::Split), Just(ReportLayout::Combined)]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// to_int16 agrees with i16 little-endian encoding for every byte pair.
    #[test]
    fn prop_int16_matches_le_encoding(lo in any::<u8>(), hi in any::<u8>()) {
        let value = to_int16(lo, hi);
        prop_assert_eq!(value.to_le_bytes(), [lo, hi]);
        prop_assert!((i16::MIN..=i16::MAX).contains(&value));
    }

    /// Any i16 survives encode/decode.
    #[test]
    fn prop_int16_roundtrip(value in any::<i16>()) {
        let [lo, hi] = value.to_le_bytes();
        prop_assert_eq!(to_int16(lo, hi), value);
    }

    /// Motion reports shorter than the profile length are always rejected.
    #[test]
    fn prop_short_motion_reports_malformed(
        layout in layout_strategy(),
        rest in proptest::collection::vec(any::<u8>(), 0..6usize),
    ) {
        let mut data = vec![TAG_TRANSLATION];
        data.extend(rest);
        let result = decode(&data, &profile(layout));
        let is_malformed = matches!(result, Err(SpaceMouseError::MalformedReport { .. }));
        prop_assert!(is_malformed);
    }

    /// Button reports decode as soon as the id byte is present.
    #[test]
    fn prop_short_button_reports_decode(
        layout in layout_strategy(),
        id in any::<u8>(),
        rest in proptest::collection::vec(any::<u8>(), 0..12usize),
    ) {
        let mut data = vec![TAG_BUTTON, id];
        data.extend(rest);
        prop_assert_eq!(decode(&data, &profile(layout)).unwrap(), Report::Button { id });
    }

    /// Full-length reports never fail to decode, whatever their content.
    #[test]
    fn prop_full_reports_decode(
        layout in layout_strategy(),
        data in proptest::collection::vec(any::<u8>(), 13..=64),
    ) {
        prop_assert!(decode(&data, &profile(layout)).is_ok());
    }

    /// Tags other than 1, 2, 3 are unrecognized, never errors.
    #[test]
    fn prop_unknown_tags_unrecognized(
        layout in layout_strategy(),
        tag in any::<u8>().prop_filter("known tag", |t| ![TAG_TRANSLATION, TAG_ROTATION, TAG_BUTTON].contains(t)),
        rest in proptest::collection::vec(any::<u8>(), 12),
    ) {
        let mut data = vec![tag];
        data.extend(rest);
        prop_assert_eq!(decode(&data, &profile(layout)).unwrap(), Report::Unrecognized { tag });
    }

    /// Translation z is the negated raw value in both layouts.
    #[test]
    fn prop_z_is_inverted(layout in layout_strategy(), z in any::<i16>()) {
        let mut data = vec![0u8; 13];
        data[0] = TAG_TRANSLATION;
        data[5..7].copy_from_slice(&z.to_le_bytes());
        let translation = match decode(&data, &profile(layout)).unwrap() {
            Report::Translation { x, y, z } => [x, y, z],
            Report::Motion { translation, .. } => translation,
            other => return Err(TestCaseError::fail(format!("unexpected {:?}", other))),
        };
        prop_assert_eq!(translation[2], -(z as f64));
    }

    /// The absolute rotation stays orthonormal over arbitrary update sequences.
    #[test]
    fn prop_rotation_stays_orthonormal(
        updates in proptest::collection::vec((any::<i16>(), any::<i16>(), any::<i16>()), 1..200),
        sensitivity in 0.01f64..4.0,
    ) {
        let scale = 0.05 * sensitivity;
        let mut m = SEED_ROTATION;
        for (roll, pitch, yaw) in updates {
            let delta = incremental(roll as f64 * scale, pitch as f64 * scale, yaw as f64 * scale);
            m = orthonormalize(&mul(&m, &delta));
            prop_assert!(is_orthonormal(&m, 1e-9), "drifted: {:?}", m);
        }
    }

    /// Each incremental rotation is itself orthonormal.
    #[test]
    fn prop_incremental_orthonormal(roll in -50.0f64..50.0, pitch in -50.0f64..50.0, yaw in -50.0f64..50.0) {
        prop_assert!(is_orthonormal(&incremental(roll, pitch, yaw), 1e-12));
    }
}
