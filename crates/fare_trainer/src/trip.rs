//! Trip record schema
//!
//! One row of the taxi trip CSV and the prediction produced for it.

use serde::{Deserialize, Serialize};
use taxi_fare_core::fixed;

/// CSV column order, as found in the trip data files
pub const TRIP_COLUMNS: [&str; 7] = [
    "vendor_id",
    "rate_code",
    "passenger_count",
    "trip_time_in_secs",
    "trip_distance",
    "payment_type",
    "fare_amount",
];

/// One trip observation.
///
/// `fare_amount` is the label: it must be the true value for training and
/// evaluation and is ignored when predicting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub vendor_id: String,
    pub rate_code: String,
    pub passenger_count: i32,
    #[serde(rename = "trip_time_in_secs")]
    pub trip_time: i32,
    pub trip_distance: f32,
    pub payment_type: String,
    pub fare_amount: f32,
}

impl Trip {
    /// Build a trip for prediction; the fare placeholder is zero
    pub fn unlabeled(
        vendor_id: &str,
        rate_code: &str,
        passenger_count: i32,
        trip_time: i32,
        trip_distance: f32,
        payment_type: &str,
    ) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            rate_code: rate_code.to_string(),
            passenger_count,
            trip_time,
            trip_distance,
            payment_type: payment_type.to_string(),
            fare_amount: 0.0,
        }
    }
}

/// Scored fare for one trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripFarePrediction {
    pub fare_amount: f32,
}

/// Named column of a [`Trip`], used to describe pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    VendorId,
    RateCode,
    PassengerCount,
    TripTime,
    TripDistance,
    PaymentType,
    FareAmount,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::VendorId,
        Column::RateCode,
        Column::PassengerCount,
        Column::TripTime,
        Column::TripDistance,
        Column::PaymentType,
        Column::FareAmount,
    ];

    pub fn name(self) -> &'static str {
        TRIP_COLUMNS[self as usize]
    }

    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Column::VendorId | Column::RateCode | Column::PaymentType
        )
    }

    /// String value of a categorical column
    pub fn category(self, trip: &Trip) -> Option<&str> {
        match self {
            Column::VendorId => Some(&trip.vendor_id),
            Column::RateCode => Some(&trip.rate_code),
            Column::PaymentType => Some(&trip.payment_type),
            _ => None,
        }
    }

    /// Fixed-point value of a numeric column
    pub fn numeric(self, trip: &Trip) -> Option<i64> {
        match self {
            Column::PassengerCount => Some(fixed::from_int(trip.passenger_count as i64)),
            Column::TripTime => Some(fixed::from_int(trip.trip_time as i64)),
            Column::TripDistance => Some(fixed::from_f32(trip.trip_distance)),
            Column::FareAmount => Some(fixed::from_f32(trip.fare_amount)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_follow_csv_order() {
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.name(), TRIP_COLUMNS[i]);
        }
    }

    #[test]
    fn test_column_accessors() {
        let trip = Trip::unlabeled("CMT", "1", 2, 639, 4.3, "CRD");

        assert_eq!(Column::VendorId.category(&trip), Some("CMT"));
        assert_eq!(Column::RateCode.category(&trip), Some("1"));
        assert_eq!(Column::TripDistance.category(&trip), None);

        assert_eq!(Column::PassengerCount.numeric(&trip), Some(2_000_000));
        assert_eq!(Column::TripDistance.numeric(&trip), Some(4_300_000));
        assert_eq!(Column::FareAmount.numeric(&trip), Some(0));
        assert_eq!(Column::PaymentType.numeric(&trip), None);
    }

    #[test]
    fn test_categorical_columns() {
        let categorical: Vec<_> = Column::ALL.into_iter().filter(|c| c.is_categorical()).collect();
        assert_eq!(
            categorical,
            vec![Column::VendorId, Column::RateCode, Column::PaymentType]
        );
    }
}
