//! CSV trip loading and the featurized training matrix
//!
//! Trip files are read fully into memory. Rows are matched to the trip
//! schema by position; a header row, when present, must have the same width.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::errors::{Result, TrainerError};
use crate::trip::{Trip, TRIP_COLUMNS};

/// Load trip records from a comma-separated file
pub fn load_trips<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Vec<Trip>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TrainerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let format_error = |err: csv::Error| TrainerError::Format {
        path: path.to_path_buf(),
        line: err.position().map(|p| p.line()),
        message: err.to_string(),
    };

    if has_header {
        let headers = reader.headers().map_err(format_error)?;
        if headers.len() != TRIP_COLUMNS.len() {
            return Err(TrainerError::Format {
                path: path.to_path_buf(),
                line: Some(1),
                message: format!(
                    "expected {} columns ({}), header has {}",
                    TRIP_COLUMNS.len(),
                    TRIP_COLUMNS.join(","),
                    headers.len()
                ),
            });
        }
    }

    let mut trips = Vec::new();
    for record in reader.records() {
        let record = record.map_err(format_error)?;
        let line = record.position().map(|p| p.line());

        if record.len() != TRIP_COLUMNS.len() {
            return Err(TrainerError::Format {
                path: path.to_path_buf(),
                line,
                message: format!(
                    "expected {} columns, got {}",
                    TRIP_COLUMNS.len(),
                    record.len()
                ),
            });
        }

        let trip: Trip = record.deserialize(None).map_err(|err| TrainerError::Format {
            path: path.to_path_buf(),
            line,
            message: err.to_string(),
        })?;
        trips.push(trip);
    }

    info!("Loaded {} trips from {}", trips.len(), path.display());
    Ok(trips)
}

/// Featurized table: fixed-point feature rows and labels
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<i64>>,
    pub labels: Vec<i64>,
    pub feature_count: usize,
}

impl Dataset {
    pub fn new(features: Vec<Vec<i64>>, labels: Vec<i64>, feature_count: usize) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(TrainerError::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some((i, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_count)
        {
            return Err(TrainerError::Dataset(format!(
                "row {i} has {} features, expected {feature_count}",
                row.len()
            )));
        }

        Ok(Self {
            features,
            labels,
            feature_count,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// (min, max) of every feature column
    pub fn feature_stats(&self) -> Vec<(i64, i64)> {
        let mut stats = vec![(i64::MAX, i64::MIN); self.feature_count];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    const HEADER: &str =
        "vendor_id,rate_code,passenger_count,trip_time_in_secs,trip_distance,payment_type,fare_amount";

    #[test]
    fn test_load_with_header() {
        let file = write_csv(&[
            HEADER,
            "CMT,1,1,639,4.3,CRD,14.5",
            "VTS, 2 ,3,1800,17.1,CSH,52",
        ]);
        let trips = load_trips(file.path(), true).unwrap();

        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0], Trip {
            fare_amount: 14.5,
            ..Trip::unlabeled("CMT", "1", 1, 639, 4.3, "CRD")
        });
        assert_eq!(trips[1].rate_code, "2");
        assert_eq!(trips[1].fare_amount, 52.0);
    }

    #[test]
    fn test_load_without_header() {
        let file = write_csv(&["CMT,1,1,639,4.3,CRD,14.5"]);
        let trips = load_trips(file.path(), false).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].trip_time, 639);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = write_csv(&[HEADER]);
        assert!(load_trips(file.path(), true).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_column_count_is_format_error() {
        let file = write_csv(&[HEADER, "CMT,1,1,639,4.3,CRD"]);
        let err = load_trips(file.path(), true).unwrap_err();
        match err {
            TrainerError::Format { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_header_width_is_format_error() {
        let file = write_csv(&["vendor_id,fare_amount", "CMT,14.5"]);
        assert!(matches!(
            load_trips(file.path(), true),
            Err(TrainerError::Format { .. })
        ));
    }

    #[test]
    fn test_bad_value_is_format_error() {
        let file = write_csv(&[HEADER, "CMT,1,one,639,4.3,CRD,14.5"]);
        let err = load_trips(file.path(), true).unwrap_err();
        assert!(matches!(err, TrainerError::Format { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_trips("does/not/exist.csv", true).unwrap_err();
        assert!(matches!(err, TrainerError::Io { .. }));
    }

    #[test]
    fn test_dataset_shape_checks() {
        assert!(Dataset::new(vec![vec![1, 2]], vec![1, 2], 2).is_err());
        assert!(Dataset::new(vec![vec![1, 2], vec![3]], vec![1, 2], 2).is_err());

        let dataset = Dataset::new(vec![vec![1, 20], vec![3, 10]], vec![5, 6], 2).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.feature_stats(), vec![(1, 3), (10, 20)]);
    }
}
