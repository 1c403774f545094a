//! Reassembles per-batch rectangular matrices into one table, one row per
//! original origin-destination pair.
//!
//! Clustering destroys the input interleaving, so each batch carries its
//! pairs' original row indices and every cell is written straight to its
//! final position. An earlier generation of this client concatenated batch
//! frames in cluster emission order and reversed the result once at the end,
//! which only restores input order when emission order happens to be its
//! exact reverse; the explicit index bookkeeping here holds for arbitrary
//! groupings.

use fxhash::FxHashMap;

use crate::batch::OdBatch;
use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;
use crate::table::{DistanceTable, OdColumns, TableRow};

fn position_map(coords: &[Coordinate]) -> FxHashMap<Coordinate, usize> {
    coords
        .iter()
        .enumerate()
        .map(|(position, &coordinate)| (coordinate, position))
        .collect()
}

/// Merge resolved batches back into input order. `append_od` attaches the
/// original (non-deduplicated) coordinates to each row.
pub fn assemble(
    resolved: &[(OdBatch, RectMatrix)],
    pair_count: usize,
    append_od: bool,
) -> Result<DistanceTable, RoutingError> {
    let mut rows: Vec<Option<TableRow>> = vec![None; pair_count];

    for (batch, matrix) in resolved {
        let origin_positions = position_map(matrix.origins());
        let destination_positions = position_map(matrix.destinations());

        for pair in &batch.pairs {
            let origin_index = *origin_positions.get(&pair.origin).ok_or_else(|| {
                RoutingError::MalformedResponse(format!(
                    "matrix is missing origin ({}, {})",
                    pair.origin.lat(),
                    pair.origin.lon()
                ))
            })?;
            let destination_index =
                *destination_positions.get(&pair.destination).ok_or_else(|| {
                    RoutingError::MalformedResponse(format!(
                        "matrix is missing destination ({}, {})",
                        pair.destination.lat(),
                        pair.destination.lon()
                    ))
                })?;

            rows[pair.index] = Some(TableRow {
                od: append_od.then(|| OdColumns::new(pair.origin, pair.destination)),
                distance_m: matrix.distance(origin_index, destination_index),
                duration_s: matrix.duration(origin_index, destination_index),
            });
        }
    }

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.ok_or_else(|| {
                RoutingError::MalformedResponse(format!("no batch produced row {index}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DistanceTable::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::build_batches;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    /// Deterministic fake matrix: cell value encodes its origin and
    /// destination so misrouted cells are visible.
    fn fake_matrix(origins: &[Coordinate], destinations: &[Coordinate]) -> RectMatrix {
        let mut durations = Vec::new();
        let mut distances = Vec::new();
        for origin in origins {
            for destination in destinations {
                let value = origin.lat() * 1000.0 + destination.lat();
                durations.push(Some(value));
                distances.push(Some(value * 2.0));
            }
        }
        RectMatrix::new(origins.to_vec(), destinations.to_vec(), durations, distances).unwrap()
    }

    fn resolve(origins: &[Coordinate], destinations: &[Coordinate], max: Option<usize>) -> DistanceTable {
        let batches = build_batches(origins, destinations, max).unwrap();
        let resolved: Vec<(OdBatch, RectMatrix)> = batches
            .into_iter()
            .map(|batch| {
                let matrix = fake_matrix(&batch.origins, &batch.destinations);
                (batch, matrix)
            })
            .collect();
        assemble(&resolved, origins.len(), true).unwrap()
    }

    #[test]
    fn test_rows_match_input_order() {
        let a = coord(1.0, 1.0);
        let b = coord(2.0, 2.0);
        let x = coord(10.0, 10.0);
        let y = coord(20.0, 20.0);

        let origins = [a, a, b, b];
        let destinations = [x, y, x, y];
        let table = resolve(&origins, &destinations, Some(10));

        assert_eq!(table.len(), 4);
        for (i, row) in table.iter().enumerate() {
            let od = row.od.unwrap();
            assert_eq!(od.origin_lat, origins[i].lat());
            assert_eq!(od.destination_lat, destinations[i].lat());
            let expected = origins[i].lat() * 1000.0 + destinations[i].lat();
            assert_eq!(row.duration_s, Some(expected));
        }
    }

    /// Interleaving where reversing the concatenated cluster output would
    /// scramble rows: three origin clusters visited out of input order.
    #[test]
    fn test_interleaved_clusters_restore_order() {
        let a = coord(1.0, 1.0);
        let b = coord(2.0, 2.0);
        let c = coord(3.0, 3.0);
        let x = coord(10.0, 10.0);
        let y = coord(20.0, 20.0);

        // clusters are a -> {0, 3}, b -> {1, 5}, c -> {2, 4}; a naive
        // concatenate-then-reverse would emit row 4 before row 5
        let origins = [a, b, c, a, c, b];
        let destinations = [x, x, x, y, y, y];
        let table = resolve(&origins, &destinations, Some(10));

        for (i, row) in table.iter().enumerate() {
            let expected = origins[i].lat() * 1000.0 + destinations[i].lat();
            assert_eq!(row.duration_s, Some(expected), "row {i}");
        }
    }

    #[test]
    fn test_null_cells_survive_assembly() {
        let a = coord(1.0, 1.0);
        let x = coord(10.0, 10.0);

        let batches = build_batches(&[a], &[x], None).unwrap();
        let matrix = RectMatrix::new(vec![a], vec![x], vec![None], vec![None]).unwrap();
        let table = assemble(&[(batches[0].clone(), matrix)], 1, false).unwrap();

        assert_eq!(table.row(0).duration_s, None);
        assert_eq!(table.row(0).distance_m, None);
        assert_eq!(table.row(0).od, None);
    }

    #[test]
    fn test_missing_dimension_is_an_error() {
        let a = coord(1.0, 1.0);
        let x = coord(10.0, 10.0);
        let wrong = coord(99.0, 99.0);

        let batches = build_batches(&[a], &[x], None).unwrap();
        let matrix = RectMatrix::new(vec![a], vec![wrong], vec![None], vec![None]).unwrap();
        let result = assemble(&[(batches[0].clone(), matrix)], 1, false);

        assert!(matches!(result, Err(RoutingError::MalformedResponse(_))));
    }

    #[test]
    fn test_empty_input_empty_table() {
        let table = assemble(&[], 0, true).unwrap();
        assert!(table.is_empty());
    }
}
