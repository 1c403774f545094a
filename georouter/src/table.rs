use serde::Serialize;

use crate::coords::Coordinate;

/// The origin/destination columns attached to a row when `append_od` is
/// requested. Sourced from the caller's original pair list, never from the
/// deduplicated batch dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OdColumns {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub destination_lat: f64,
    pub destination_lon: f64,
}

impl OdColumns {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        OdColumns {
            origin_lat: origin.lat(),
            origin_lon: origin.lon(),
            destination_lat: destination.lat(),
            destination_lon: destination.lon(),
        }
    }
}

/// One output row. Serialized column names follow the tabular convention
/// the original client exposed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub od: Option<OdColumns>,

    #[serde(rename = "distance (m)")]
    pub distance_m: Option<f64>,

    #[serde(rename = "duration (s)")]
    pub duration_s: Option<f64>,
}

/// An ordered table with exactly one row per requested origin-destination
/// pair, in the caller's input order.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DistanceTable {
    rows: Vec<TableRow>,
}

impl DistanceTable {
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        DistanceTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &TableRow {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_column_names() {
        let row = TableRow {
            od: None,
            distance_m: Some(1200.0),
            duration_s: Some(60.0),
        };

        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["distance (m)"], 1200.0);
        assert_eq!(json["duration (s)"], 60.0);
    }

    #[test]
    fn test_od_columns_flattened() {
        let origin = Coordinate::new(42.0, -71.0).unwrap();
        let destination = Coordinate::new(43.0, -72.0).unwrap();
        let row = TableRow {
            od: Some(OdColumns::new(origin, destination)),
            distance_m: None,
            duration_s: None,
        };

        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["origin_lat"], 42.0);
        assert_eq!(json["destination_lon"], -72.0);
        assert_eq!(json["duration (s)"], serde_json::Value::Null);
    }
}
