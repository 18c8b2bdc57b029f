//! Face-width to distance calibration.
//!
//! A table pairs on-screen face widths (pixels) with the real camera distance
//! (centimeters) they were measured at. Widths strictly decrease while
//! distances strictly increase along the table.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Measurements taken with an A4-Tech PK-835 at 640x480. Other cameras need
/// their own table, see [`CalibrationTable::from_file`].
const DEFAULT_TABLE: [(u32, u32); 22] = [
    (403, 30),
    (330, 40),
    (275, 50),
    (236, 60),
    (205, 70),
    (182, 80),
    (164, 90),
    (150, 100),
    (130, 120),
    (115, 140),
    (103, 160),
    (94, 180),
    (86, 200),
    (80, 220),
    (74, 240),
    (69, 260),
    (65, 280),
    (61, 300),
    (57, 325),
    (55, 350),
    (53, 375),
    (51, 400),
];

static MEASUREMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").expect("valid measurement regex"));

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration table is empty")]
    Empty,

    #[error("width and distance lists differ in length ({widths} vs {distances})")]
    LengthMismatch { widths: usize, distances: usize },

    #[error("entry {index} breaks ordering: widths must decrease and distances increase")]
    NotMonotonic { index: usize },

    #[error("bad measurement count '{0}'")]
    BadCount(String),

    #[error("expected {expected} measurements, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("line {line}: expected 'distance-width', got '{text}'")]
    BadLine { line: usize, text: String },

    #[error("cannot read calibration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Estimated distance of a face from the camera, inclusive, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceRange {
    pub min: u32,
    pub max: u32,
}

impl DistanceRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for DistanceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationTable {
    widths_px: Vec<u32>,
    distances_cm: Vec<u32>,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        let (widths_px, distances_cm) = DEFAULT_TABLE.iter().copied().unzip();
        Self {
            widths_px,
            distances_cm,
        }
    }
}

impl CalibrationTable {
    pub fn new(widths_px: Vec<u32>, distances_cm: Vec<u32>) -> Result<Self, CalibrationError> {
        if widths_px.len() != distances_cm.len() {
            return Err(CalibrationError::LengthMismatch {
                widths: widths_px.len(),
                distances: distances_cm.len(),
            });
        }
        if widths_px.is_empty() {
            return Err(CalibrationError::Empty);
        }

        for i in 1..widths_px.len() {
            if widths_px[i] >= widths_px[i - 1] || distances_cm[i] <= distances_cm[i - 1] {
                return Err(CalibrationError::NotMonotonic { index: i });
            }
        }

        Ok(Self {
            widths_px,
            distances_cm,
        })
    }

    /// Reads a "camera data" file: a measurement count on the first line,
    /// followed by one `distance-width` pair per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        debug!("Reading calibration data from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CalibrationError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let count = match lines.next() {
            Some((_, line)) => line
                .trim()
                .parse::<usize>()
                .map_err(|_| CalibrationError::BadCount(line.trim().to_string()))?,
            None => return Err(CalibrationError::Empty),
        };

        let mut widths = Vec::new();
        let mut distances = Vec::new();
        for (idx, line) in lines {
            let caps = MEASUREMENT_RE
                .captures(line)
                .ok_or_else(|| CalibrationError::BadLine {
                    line: idx + 1,
                    text: line.to_string(),
                })?;
            // both groups are \d+ so only overflow can fail here
            let parse = |group: usize| {
                caps[group]
                    .parse::<u32>()
                    .map_err(|_| CalibrationError::BadLine {
                        line: idx + 1,
                        text: line.to_string(),
                    })
            };
            distances.push(parse(1)?);
            widths.push(parse(2)?);
        }

        if widths.len() != count {
            return Err(CalibrationError::CountMismatch {
                expected: count,
                found: widths.len(),
            });
        }

        Self::new(widths, distances)
    }

    pub fn len(&self) -> usize {
        self.widths_px.len()
    }

    /// Maps a detected face width to a distance range.
    ///
    /// Widths at or above the first entry clamp to `[0, nearest]`, widths at
    /// or below the last entry clamp to the farthest distance. In between,
    /// the bracketing pair is widened by half its distance gap on each side.
    pub fn estimate(&self, width_px: u32) -> DistanceRange {
        let last = self.len() - 1;

        if width_px >= self.widths_px[0] {
            return DistanceRange::new(0, self.distances_cm[0]);
        }
        if width_px <= self.widths_px[last] {
            return DistanceRange::new(self.distances_cm[last], self.distances_cm[last]);
        }

        let i = self
            .widths_px
            .windows(2)
            .position(|pair| width_px <= pair[0] && width_px >= pair[1])
            .expect("widths[0] > width > widths[last] always has a bracketing pair");

        let near = self.distances_cm[i];
        let far = self.distances_cm[i + 1];
        let margin = (far - near) / 2;
        DistanceRange::new(near.saturating_sub(margin), far.saturating_add(margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = CalibrationTable::default();
        let widths = table.widths_px.clone();
        let distances = table.distances_cm.clone();
        assert_eq!(table.len(), 22);
        assert!(CalibrationTable::new(widths, distances).is_ok());
    }

    #[test]
    fn test_wide_faces_clamp_to_nearest() {
        let table = CalibrationTable::default();
        assert_eq!(table.estimate(403), DistanceRange::new(0, 30));
        assert_eq!(table.estimate(404), DistanceRange::new(0, 30));
        assert_eq!(table.estimate(2000), DistanceRange::new(0, 30));
    }

    #[test]
    fn test_narrow_faces_clamp_to_farthest() {
        let table = CalibrationTable::default();
        assert_eq!(table.estimate(51), DistanceRange::new(400, 400));
        assert_eq!(table.estimate(10), DistanceRange::new(400, 400));
        assert_eq!(table.estimate(0), DistanceRange::new(400, 400));
    }

    #[test]
    fn test_first_pair_is_interpolated() {
        let table = CalibrationTable::default();
        assert_eq!(table.estimate(366), DistanceRange::new(25, 45));
        assert_eq!(table.estimate(402), DistanceRange::new(25, 45));
    }

    #[test]
    fn test_shared_boundary_uses_nearer_pair() {
        let table = CalibrationTable::default();
        // 330 closes the 403/330 pair and opens the 330/275 pair
        assert_eq!(table.estimate(330), DistanceRange::new(25, 45));
        assert_eq!(table.estimate(300), DistanceRange::new(35, 55));
    }

    #[test]
    fn test_odd_gap_rounds_margin_down() {
        let table = CalibrationTable::new(vec![100, 50, 10], vec![10, 25, 40]).unwrap();
        // margin = 15 / 2 = 7
        assert_eq!(table.estimate(70), DistanceRange::new(3, 32));
    }

    #[test]
    fn test_min_distance_is_monotonic() {
        let table = CalibrationTable::default();
        let mut previous = table.estimate(1000);
        for width in (0..1000).rev() {
            let range = table.estimate(width);
            assert!(
                range.min >= previous.min,
                "width {width}: min {} dropped below {}",
                range.min,
                previous.min
            );
            assert!(range.min <= range.max);
            previous = range;
        }
    }

    #[test]
    fn test_single_entry_table() {
        let table = CalibrationTable::new(vec![120], vec![80]).unwrap();
        assert_eq!(table.estimate(200), DistanceRange::new(0, 80));
        assert_eq!(table.estimate(120), DistanceRange::new(0, 80));
        assert_eq!(table.estimate(60), DistanceRange::new(80, 80));
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            CalibrationTable::new(vec![], vec![]),
            Err(CalibrationError::Empty)
        ));
        assert!(matches!(
            CalibrationTable::new(vec![10, 5], vec![1]),
            Err(CalibrationError::LengthMismatch { .. })
        ));
        assert!(matches!(
            CalibrationTable::new(vec![100, 100], vec![10, 20]),
            Err(CalibrationError::NotMonotonic { index: 1 })
        ));
        assert!(matches!(
            CalibrationTable::new(vec![100, 90, 80], vec![10, 30, 20]),
            Err(CalibrationError::NotMonotonic { index: 2 })
        ));
    }

    #[test]
    fn test_parse_camera_data() {
        let table = CalibrationTable::parse("3\n30-403\n 40 - 330 \n\n400-51\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.widths_px, vec![403, 330, 51]);
        assert_eq!(table.distances_cm, vec![30, 40, 400]);
        assert_eq!(table.estimate(366), DistanceRange::new(25, 45));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            CalibrationTable::parse(""),
            Err(CalibrationError::Empty)
        ));
        assert!(matches!(
            CalibrationTable::parse("-2\n"),
            Err(CalibrationError::BadCount(_))
        ));
        assert!(matches!(
            CalibrationTable::parse("2\n30-403\n"),
            Err(CalibrationError::CountMismatch {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            CalibrationTable::parse("1\n30:403\n"),
            Err(CalibrationError::BadLine { line: 2, .. })
        ));
        assert!(matches!(
            CalibrationTable::parse("2\n30-403\n20-330\n"),
            Err(CalibrationError::NotMonotonic { index: 1 })
        ));
    }

    #[test]
    fn test_extreme_distances_saturate() {
        let table = CalibrationTable::parse("2\n10-100\n4294967295-50\n").unwrap();
        let range = table.estimate(75);
        assert_eq!(range.min, 0);
        assert_eq!(range.max, u32::MAX);
        assert_eq!(table.estimate(50), DistanceRange::new(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_huge_count_is_a_mismatch() {
        assert!(matches!(
            CalibrationTable::parse("18446744073709551615\n30-403\n"),
            Err(CalibrationError::CountMismatch { found: 1, .. })
        ));
        assert!(matches!(
            CalibrationTable::parse("99999999999999999999999\n30-403\n"),
            Err(CalibrationError::BadCount(_))
        ));
        assert!(matches!(
            CalibrationTable::parse("1\n30-99999999999\n"),
            Err(CalibrationError::BadLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.dat");
        std::fs::write(&path, "2\n30-403\n40-330\n").unwrap();
        let table = CalibrationTable::from_file(&path).unwrap();
        assert_eq!(table.estimate(350), DistanceRange::new(25, 45));

        assert!(matches!(
            CalibrationTable::from_file(dir.path().join("missing.dat")),
            Err(CalibrationError::Io(_))
        ));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(DistanceRange::new(25, 45).to_string(), "25-45");
    }
}
