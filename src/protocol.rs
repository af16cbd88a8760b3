use crate::profile::{DeviceProfile, ReportLayout};
use crate::{Result, SpaceMouseError};

// -- Report type tags (byte 0) --
pub const TAG_TRANSLATION: u8 = 0x01;
pub const TAG_ROTATION: u8 = 0x02;
pub const TAG_BUTTON: u8 = 0x03;

// -- Button ids (byte 1 of a button report) --
pub const BUTTON_TOGGLE: u8 = 1;
pub const BUTTON_RESET: u8 = 2;

/// Button reports only need the tag and the button id.
pub const BUTTON_REPORT_LENGTH: usize = 2;

/// One classified input report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    /// Translation half of a split-layout pair, [x, y, z].
    Translation { x: f64, y: f64, z: f64 },
    /// Rotation half of a split-layout pair.
    Rotation { roll: f64, pitch: f64, yaw: f64 },
    /// Combined-layout report carrying all six axes.
    Motion {
        translation: [f64; 3],
        rotation: [f64; 3],
    },
    Button { id: u8 },
    Unrecognized { tag: u8 },
}

/// Combine a little-endian byte pair into a signed 16-bit value.
pub fn to_int16(lo: u8, hi: u8) -> i16 {
    u16::from_le_bytes([lo, hi]) as i16
}

fn axis(data: &[u8], offset: usize) -> f64 {
    to_int16(data[offset], data[offset + 1]) as f64
}

/// Translation at bytes [1..6]: wire order is y, x, z; z points down on the device.
fn translation(data: &[u8]) -> [f64; 3] {
    let y = axis(data, 1);
    let x = axis(data, 3);
    let z = -axis(data, 5);
    [x, y, z]
}

/// Decode one raw report according to the profile's layout.
///
/// Report layouts:
/// - `[0]`: type tag (1 = translation/motion, 2 = rotation, 3 = buttons)
/// - Split, tag 1: `[1..2]` y, `[3..4]` x, `[5..6]` z
/// - Split, tag 2: `[1..2]` pitch, `[3..4]` roll, `[5..6]` yaw (negated)
/// - Combined, tag 1: translation as above, `[7..8]` roll, `[9..10]` pitch, `[11..12]` yaw
/// - Tag 3: `[1]` button id
///
/// All axes are int16 LE. Motion reports shorter than `profile.report_length`
/// (or the layout's own length, whichever is larger) are rejected with
/// `MalformedReport`. Button reports need `BUTTON_REPORT_LENGTH` bytes; the
/// device sends them shorter than motion reports.
pub fn decode(data: &[u8], profile: &DeviceProfile) -> Result<Report> {
    let Some(&tag) = data.first() else {
        return Err(SpaceMouseError::MalformedReport {
            expected: 1,
            actual: 0,
        });
    };

    let expected = match (profile.layout, tag) {
        (_, TAG_BUTTON) => BUTTON_REPORT_LENGTH,
        (ReportLayout::Split, TAG_TRANSLATION | TAG_ROTATION)
        | (ReportLayout::Combined, TAG_TRANSLATION) => {
            profile.report_length.max(profile.layout.report_length())
        }
        _ => 1,
    };
    if data.len() < expected {
        return Err(SpaceMouseError::MalformedReport {
            expected,
            actual: data.len(),
        });
    }

    let report = match (profile.layout, tag) {
        (_, TAG_BUTTON) => Report::Button { id: data[1] },
        (ReportLayout::Split, TAG_TRANSLATION) => {
            let [x, y, z] = translation(data);
            Report::Translation { x, y, z }
        }
        (ReportLayout::Split, TAG_ROTATION) => Report::Rotation {
            roll: axis(data, 3),
            pitch: axis(data, 1),
            yaw: -axis(data, 5),
        },
        (ReportLayout::Combined, TAG_TRANSLATION) => Report::Motion {
            translation: translation(data),
            rotation: [axis(data, 7), axis(data, 9), axis(data, 11)],
        },
        (_, tag) => Report::Unrecognized { tag },
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split() -> DeviceProfile {
        DeviceProfile::spacemouse_compact()
    }

    fn combined() -> DeviceProfile {
        DeviceProfile::spacemouse_wireless()
    }

    #[test]
    fn test_to_int16() {
        assert_eq!(to_int16(0x00, 0x00), 0);
        assert_eq!(to_int16(0x0A, 0x00), 10);
        assert_eq!(to_int16(0xFF, 0xFF), -1);
        assert_eq!(to_int16(0x00, 0x80), i16::MIN);
        assert_eq!(to_int16(0xFF, 0x7F), i16::MAX);
        assert_eq!(to_int16(0x5E, 0x01), 350);
    }

    #[test]
    fn test_split_translation() {
        let data = [1, 0, 0, 10, 0, 0, 0];
        let report = decode(&data, &split()).unwrap();
        assert_eq!(report, Report::Translation { x: 10.0, y: 0.0, z: 0.0 });

        // y = 5, x = -2, z raw = 7 -> -7
        let data = [1, 5, 0, 0xFE, 0xFF, 7, 0];
        let report = decode(&data, &split()).unwrap();
        assert_eq!(report, Report::Translation { x: -2.0, y: 5.0, z: -7.0 });
    }

    #[test]
    fn test_split_rotation_axis_mapping() {
        let data = [2, 1, 0, 2, 0, 3, 0];
        let report = decode(&data, &split()).unwrap();
        assert_eq!(
            report,
            Report::Rotation {
                roll: 2.0,
                pitch: 1.0,
                yaw: -3.0
            }
        );
    }

    #[test]
    fn test_combined_motion() {
        let data = [1, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 0xFA, 0xFF];
        let report = decode(&data, &combined()).unwrap();
        assert_eq!(
            report,
            Report::Motion {
                translation: [2.0, 1.0, -3.0],
                rotation: [4.0, 5.0, -6.0],
            }
        );
    }

    #[test]
    fn test_combined_rejects_rotation_tag() {
        let data = [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&data, &combined()).unwrap(),
            Report::Unrecognized { tag: 2 }
        );
    }

    #[test]
    fn test_buttons() {
        for profile in [split(), combined()] {
            let mut data = vec![0u8; profile.report_length];
            data[0] = TAG_BUTTON;
            data[1] = BUTTON_TOGGLE;
            assert_eq!(decode(&data, &profile).unwrap(), Report::Button { id: 1 });
            data[1] = BUTTON_RESET;
            assert_eq!(decode(&data, &profile).unwrap(), Report::Button { id: 2 });
        }
    }

    #[test]
    fn test_short_button_reports() {
        assert_eq!(decode(&[3, 2], &split()).unwrap(), Report::Button { id: 2 });
        assert_eq!(decode(&[3, 1, 0], &combined()).unwrap(), Report::Button { id: 1 });

        let err = decode(&[3], &combined()).unwrap_err();
        assert!(matches!(
            err,
            SpaceMouseError::MalformedReport {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_unknown_tag() {
        let data = [0x17, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&data, &split()).unwrap(),
            Report::Unrecognized { tag: 0x17 }
        );
    }

    #[test]
    fn test_short_report_is_malformed() {
        let err = decode(&[1, 0, 0], &split()).unwrap_err();
        assert!(matches!(
            err,
            SpaceMouseError::MalformedReport {
                expected: 7,
                actual: 3
            }
        ));

        assert!(decode(&[], &combined()).is_err());
        assert!(decode(&[1, 0, 0, 0, 0, 0, 0], &combined()).is_err());
        assert!(decode(&[2, 0, 0], &split()).is_err());
        assert_eq!(decode(&[0x17], &split()).unwrap(), Report::Unrecognized { tag: 0x17 });
    }

    #[test]
    fn test_long_report_accepted() {
        let mut data = [0u8; 64];
        data[0] = 1;
        data[3] = 10;
        assert_eq!(
            decode(&data, &split()).unwrap(),
            Report::Translation { x: 10.0, y: 0.0, z: 0.0 }
        );
    }
}
