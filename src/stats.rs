//! Statistics stages run on every filtered dataset.
//!
//! None of them aggregates anything yet: each hands the dataset back as it
//! received it.

use log::debug;

use crate::data::model::TripDataset;

/// Time-of-day stage. Returns the trips unchanged.
pub fn time_stats(dataset: TripDataset) -> TripDataset {
    passthrough("time", dataset)
}

/// Station stage. Returns the trips unchanged.
pub fn station_stats(dataset: TripDataset) -> TripDataset {
    passthrough("station", dataset)
}

/// Trip duration stage. Returns the trips unchanged.
pub fn trip_duration_stats(dataset: TripDataset) -> TripDataset {
    passthrough("trip duration", dataset)
}

/// User stage. Returns the trips unchanged.
pub fn user_stats(dataset: TripDataset) -> TripDataset {
    passthrough("user", dataset)
}

/// Run all four stages in order.
pub fn run_all(dataset: TripDataset) -> TripDataset {
    user_stats(trip_duration_stats(station_stats(time_stats(dataset))))
}

fn passthrough(stage: &str, dataset: TripDataset) -> TripDataset {
    debug!("{stage} stats: {} trips", dataset.len());
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FieldValue, TripRecord};
    use chrono::NaiveDate;

    #[test]
    fn test_stages_return_dataset_unchanged() {
        let ts = NaiveDate::from_ymd_opt(2017, 5, 5)
            .unwrap()
            .and_hms_opt(17, 45, 0)
            .unwrap();
        let ds = TripDataset::new(
            vec!["Start Time".into(), "End Time".into(), "User Type".into()],
            vec![TripRecord {
                start_time: ts,
                end_time: ts,
                fields: vec![
                    FieldValue::Text(ts.to_string()),
                    FieldValue::Text(ts.to_string()),
                    FieldValue::Text("Customer".into()),
                ],
            }],
        );

        assert_eq!(time_stats(ds.clone()), ds);
        assert_eq!(station_stats(ds.clone()), ds);
        assert_eq!(trip_duration_stats(ds.clone()), ds);
        assert_eq!(user_stats(ds.clone()), ds);
        assert_eq!(run_all(ds.clone()), ds);
    }
}
