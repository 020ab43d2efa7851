use crate::conditions::error::ClusterError;
use crate::types::interval::TimeInterval;
use chrono::{DateTime, Utc};
use log::debug;
use std::ops::RangeInclusive;

/// Groups indices into maximal runs of consecutive values.
///
/// The indices are sorted and deduplicated first. A gap of more than one starts a new
/// group, so `[1, 2, 3, 7, 8, 9]` becomes `[1..=3, 7..=9]`.
pub fn cluster(indices: &[usize]) -> Vec<RangeInclusive<usize>> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut groups: Vec<RangeInclusive<usize>> = Vec::new();
    for index in sorted {
        match groups.last_mut() {
            Some(group) if index - *group.end() <= 1 => *group = *group.start()..=index,
            _ => groups.push(index..=index),
        }
    }
    groups
}

/// Clusters `indices` and turns every cluster into a time interval over `times`.
///
/// Each interval reaches halfway to the neighbouring samples on either side. The first
/// and last samples of the sequence have no neighbour to share a gap with, so a cluster
/// touching either end of the sequence stops at that sample's own time. Adjacent clusters
/// therefore abut without overlapping.
///
/// A cluster that collapses to a zero-width interval (a lone sample in a one-sample
/// sequence) is dropped.
///
/// # Errors
///
/// Returns [`ClusterError::IndexOutOfRange`] if an index does not point into `times`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use meteogram::cluster_and_get_start_end_times;
///
/// let t0 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
/// let times: Vec<_> = (0..12).map(|h| t0 + TimeDelta::hours(h)).collect();
///
/// let intervals = cluster_and_get_start_end_times(&[1, 2, 3, 7, 8, 9], &times).unwrap();
/// assert_eq!(intervals.len(), 2);
/// assert_eq!(intervals[0].start, t0 + TimeDelta::minutes(30));
/// assert_eq!(intervals[0].end, t0 + TimeDelta::minutes(210));
/// ```
pub fn cluster_and_get_start_end_times(
    indices: &[usize],
    times: &[DateTime<Utc>],
) -> Result<Vec<TimeInterval>, ClusterError> {
    if let Some(&index) = indices.iter().find(|&&i| i >= times.len()) {
        return Err(ClusterError::IndexOutOfRange {
            index,
            len: times.len(),
        });
    }

    let mut intervals = Vec::new();
    for group in cluster(indices) {
        let (first, last) = (*group.start(), *group.end());
        let start = if first > 0 {
            times[first] - (times[first] - times[first - 1]) / 2
        } else {
            times[first]
        };
        let end = if last + 1 < times.len() {
            times[last] + (times[last + 1] - times[last]) / 2
        } else {
            times[last]
        };

        let interval = TimeInterval::new(start, end);
        if interval.is_degenerate() {
            debug!("Dropping zero-width cluster at {}", start);
            continue;
        }
        intervals.push(interval);
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    fn unit_times(count: i64) -> Vec<DateTime<Utc>> {
        (0..count).map(|h| t0() + TimeDelta::hours(h)).collect()
    }

    fn hours(h: f64) -> DateTime<Utc> {
        t0() + TimeDelta::minutes((h * 60.0) as i64)
    }

    #[test]
    fn groups_consecutive_indices() {
        assert_eq!(cluster(&[1, 2, 3, 7, 8, 9]), vec![1..=3, 7..=9]);
        assert_eq!(cluster(&[4]), vec![4..=4]);
        assert_eq!(cluster(&[9, 3, 2, 2, 1]), vec![1..=3, 9..=9]);
        assert!(cluster(&[]).is_empty());
    }

    #[test]
    fn extends_halfway_to_neighbours() {
        let intervals = cluster_and_get_start_end_times(&[1, 2, 3, 7, 8, 9], &unit_times(12)).unwrap();
        assert_eq!(
            intervals,
            vec![
                TimeInterval::new(hours(0.5), hours(3.5)),
                TimeInterval::new(hours(6.5), hours(9.5)),
            ]
        );
    }

    #[test]
    fn no_indices_means_no_intervals() {
        assert!(cluster_and_get_start_end_times(&[], &unit_times(12)).unwrap().is_empty());
        assert!(cluster_and_get_start_end_times(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn sequence_edges_stop_at_the_sample() {
        let times = unit_times(4);
        let first = cluster_and_get_start_end_times(&[0], &times).unwrap();
        assert_eq!(first, vec![TimeInterval::new(hours(0.0), hours(0.5))]);

        let last = cluster_and_get_start_end_times(&[3], &times).unwrap();
        assert_eq!(last, vec![TimeInterval::new(hours(2.5), hours(3.0))]);

        let all = cluster_and_get_start_end_times(&[0, 1, 2, 3], &times).unwrap();
        assert_eq!(all, vec![TimeInterval::new(hours(0.0), hours(3.0))]);
    }

    #[test]
    fn uneven_spacing_uses_each_neighbour_gap() {
        // Hourly samples switching to three-hourly after 03:00.
        let times: Vec<_> = [0, 1, 2, 3, 6, 9].iter().map(|&h| t0() + TimeDelta::hours(h)).collect();
        let intervals = cluster_and_get_start_end_times(&[3, 4], &times).unwrap();
        assert_eq!(intervals, vec![TimeInterval::new(hours(2.5), hours(7.5))]);
    }

    #[test]
    fn lone_sample_in_single_point_sequence_is_dropped() {
        assert!(cluster_and_get_start_end_times(&[0], &unit_times(1)).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        assert_eq!(
            cluster_and_get_start_end_times(&[2, 12], &unit_times(12)),
            Err(ClusterError::IndexOutOfRange { index: 12, len: 12 })
        );
    }
}
