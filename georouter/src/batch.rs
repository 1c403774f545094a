//! Splits paired origin-destination queries into batches small enough for a
//! provider's matrix endpoint.
//!
//! Pairs sharing the same coordinate on one side are clustered so a single
//! rectangular matrix request (one fixed coordinate against many varying
//! ones) covers many pairs at once. Clustering happens on the side whose
//! values repeat the most, which keeps the fixed side of each request small
//! and the varying side large. Vendors price and limit by matrix cells, not
//! by call count, so this is where the savings are.

use fxhash::FxHashMap;
use tracing::debug;

use crate::coords::Coordinate;
use crate::error::ValidationError;

/// One origin-destination pair at its position in the caller's input.
/// Identity is the position: duplicate coordinates are valid and independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdPair {
    pub index: usize,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

/// The coordinate side used to cluster pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Origin,
    Destination,
}

/// A provider-sized slice of one cluster, ready for a single matrix request.
///
/// `origins` and `destinations` are deduplicated in descending frequency
/// order (ties by first occurrence) and carry every coordinate the member
/// pairs reference, so each member's cell exists in the rectangular result.
#[derive(Debug, Clone)]
pub struct OdBatch {
    pub origins: Vec<Coordinate>,
    pub destinations: Vec<Coordinate>,
    pub pairs: Vec<OdPair>,
}

impl OdBatch {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn from_pairs(pairs: Vec<OdPair>) -> OdBatch {
        let origins = ranked_dedup(pairs.iter().map(|pair| pair.origin));
        let destinations = ranked_dedup(pairs.iter().map(|pair| pair.destination));

        OdBatch {
            origins,
            destinations,
            pairs,
        }
    }
}

/// Deduplicate keeping a deterministic order: most frequent value first,
/// ties broken by first occurrence. This mirrors pandas' `value_counts()`
/// ordering, which downstream vendors saw from the original client.
fn ranked_dedup(coords: impl Iterator<Item = Coordinate>) -> Vec<Coordinate> {
    let mut counts: FxHashMap<Coordinate, usize> = FxHashMap::default();
    let mut first_seen = Vec::new();

    for coordinate in coords {
        let count = counts.entry(coordinate).or_insert(0);
        if *count == 0 {
            first_seen.push(coordinate);
        }
        *count += 1;
    }

    // stable sort keeps first-occurrence order within equal counts
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
}

fn distinct_count(coords: impl Iterator<Item = Coordinate>) -> usize {
    let mut seen: FxHashMap<Coordinate, ()> = FxHashMap::default();
    for coordinate in coords {
        seen.insert(coordinate, ());
    }
    seen.len()
}

/// Choose the clustering side: group by origin when there are at least as
/// many distinct destinations as distinct origins, otherwise by destination.
pub fn choose_group_key(pairs: &[OdPair]) -> GroupKey {
    let distinct_origins = distinct_count(pairs.iter().map(|pair| pair.origin));
    let distinct_destinations = distinct_count(pairs.iter().map(|pair| pair.destination));

    if distinct_destinations >= distinct_origins {
        GroupKey::Origin
    } else {
        GroupKey::Destination
    }
}

/// Build the ordered batch list for an index-aligned paired query.
///
/// Clusters appear in first-appearance order of their key coordinate, and a
/// cluster larger than `max_batch_size` is cut into contiguous slices in
/// grouped order. `None` means unbounded: one batch per cluster. No pair is
/// dropped, duplicated, or moved to another batch.
pub fn build_batches(
    origins: &[Coordinate],
    destinations: &[Coordinate],
    max_batch_size: Option<usize>,
) -> Result<Vec<OdBatch>, ValidationError> {
    if origins.len() != destinations.len() {
        return Err(ValidationError::LengthMismatch {
            origins: origins.len(),
            destinations: destinations.len(),
        });
    }

    let pairs: Vec<OdPair> = origins
        .iter()
        .zip(destinations.iter())
        .enumerate()
        .map(|(index, (&origin, &destination))| OdPair {
            index,
            origin,
            destination,
        })
        .collect();

    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let group_key = choose_group_key(&pairs);

    // stable grouping: clusters keep the first-appearance order of their key
    let mut cluster_of: FxHashMap<Coordinate, usize> = FxHashMap::default();
    let mut clusters: Vec<Vec<OdPair>> = Vec::new();

    for pair in pairs {
        let key = match group_key {
            GroupKey::Origin => pair.origin,
            GroupKey::Destination => pair.destination,
        };

        let cluster_index = *cluster_of.entry(key).or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[cluster_index].push(pair);
    }

    let mut batches = Vec::new();
    for cluster in clusters {
        match max_batch_size {
            Some(limit) if limit > 0 && cluster.len() > limit => {
                for slice in cluster.chunks(limit) {
                    batches.push(OdBatch::from_pairs(slice.to_vec()));
                }
            }
            _ => batches.push(OdBatch::from_pairs(cluster)),
        }
    }

    debug!(
        group_key = ?group_key,
        batches = batches.len(),
        max_batch_size = ?max_batch_size,
        "partitioned od pairs"
    );

    Ok(batches)
}
