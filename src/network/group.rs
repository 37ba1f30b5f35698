//! # Group resolution
//!
//! Turns the pair records of the overlap scan into one group label per observation, such
//! that two observations share a label if and only if a chain of matched pairs connects
//! them.
//!
//! Algorithm
//! -----------------
//! Observations are addressed by their flat position `day_start[i] + local_index`, where
//! `day_start` is the exclusive prefix sum of the per-file counts. Pairs are visited in
//! scan order:
//!
//! * both unlabelled: both receive a fresh label,
//! * one unlabelled: it takes the label of the other,
//! * same label: nothing to do,
//! * different labels: the merge is deferred.
//!
//! Deferred merges are then resolved on a translation table initialised to the identity,
//! in discovery order, each merge rewriting every entry equal to the first representative
//! into the second one ([`apply_replace`]). Labels are not renumbered afterwards: the
//! surviving labels are a subset of the minted ones.
use tracing::trace;

use crate::constants::{GroupLabel, NOGROUP};
use crate::network::scan::PairRecord;

/// Replace every occurrence of `from` by `to` in `table`.
pub fn apply_replace(table: &mut [GroupLabel], from: GroupLabel, to: GroupLabel) {
    for value in table.iter_mut().filter(|v| **v == from) {
        *value = to;
    }
}

/// Exclusive prefix sum of the per-file counts.
pub fn day_start(nb_obs: &[u32]) -> Vec<usize> {
    nb_obs
        .iter()
        .scan(0usize, |acc, &n| {
            let start = *acc;
            *acc += n as usize;
            Some(start)
        })
        .collect()
}

/// Group label of every observation, in flat file order.
///
/// Arguments
/// ---------
/// * `records`: pair records in scan order.
/// * `nb_obs`: observation count of every file.
///
/// Return
/// ------
/// * One label per observation, [`NOGROUP`] for the observations matched with nothing.
///
/// Panics if a record references a file or a local index out of range.
pub fn get_group_array(records: &[PairRecord], nb_obs: &[u32]) -> Vec<GroupLabel> {
    let starts = day_start(nb_obs);
    let total: usize = nb_obs.iter().map(|&n| n as usize).sum();

    let mut gr = vec![NOGROUP; total];
    let mut merges: Vec<(GroupLabel, GroupLabel)> = Vec::new();
    let mut id_free: GroupLabel = 1;

    for record in records {
        let (count_i, count_j) = (nb_obs[record.i], nb_obs[record.j]);
        for (a, b) in record.pairs() {
            assert!(
                a < count_i && b < count_j,
                "pair ({a}, {b}) out of range for files {} ({count_i} obs) and {} ({count_j} obs)",
                record.i,
                record.j
            );
            let pos_a = starts[record.i] + a as usize;
            let pos_b = starts[record.j] + b as usize;

            match (gr[pos_a], gr[pos_b]) {
                (NOGROUP, NOGROUP) => {
                    gr[pos_a] = id_free;
                    gr[pos_b] = id_free;
                    id_free += 1;
                }
                (NOGROUP, label) => gr[pos_a] = label,
                (label, NOGROUP) => gr[pos_b] = label,
                (la, lb) if la == lb => {}
                (la, lb) => merges.push((la, lb)),
            }
        }
    }

    trace!(
        "{} labels minted, {} merges to resolve",
        id_free - 1,
        merges.len()
    );

    let mut transfer: Vec<GroupLabel> = (0..id_free).collect();
    for (a, b) in merges {
        let (ta, tb) = (transfer[a as usize], transfer[b as usize]);
        if ta != tb {
            apply_replace(&mut transfer, ta, tb);
        }
    }

    gr.iter().map(|&g| transfer[g as usize]).collect()
}

#[cfg(test)]
mod test_group_array {
    use super::*;

    #[test]
    fn test_apply_replace() {
        let mut table = vec![0, 1, 2, 1, 3];
        apply_replace(&mut table, 1, 3);
        assert_eq!(table, vec![0, 3, 2, 3, 3]);
    }

    #[test]
    fn test_day_start() {
        assert_eq!(day_start(&[2, 0, 3, 1]), vec![0, 2, 2, 5]);
        assert!(day_start(&[]).is_empty());
    }

    #[test]
    fn test_chain_over_three_files() {
        let records = vec![
            PairRecord::new(0, 1, vec![0], vec![0]),
            PairRecord::new(1, 2, vec![1], vec![1]),
        ];
        let groups = get_group_array(&records, &[2, 2, 2]);
        assert_eq!(groups, vec![1, 0, 1, 2, 0, 2]);

        let records = vec![
            PairRecord::new(0, 1, vec![0], vec![0]),
            PairRecord::new(1, 2, vec![0], vec![1]),
        ];
        let groups = get_group_array(&records, &[2, 2, 2]);
        let label = groups[0];
        assert_ne!(label, NOGROUP);
        for k in [0, 2, 5] {
            assert_eq!(groups[k], label);
        }
        for k in [1, 3, 4] {
            assert_eq!(groups[k], NOGROUP);
        }
    }

    #[test]
    fn test_chains_merge() {
        // two chains built independently, joined by the last record
        let records = vec![
            PairRecord::new(0, 1, vec![0, 1], vec![0, 1]),
            PairRecord::new(1, 2, vec![0, 1], vec![0, 1]),
            PairRecord::new(2, 3, vec![0, 1], vec![0, 0]),
        ];
        let groups = get_group_array(&records, &[2, 2, 2, 1]);
        assert!(groups.iter().all(|&g| g == groups[0]));
        assert_ne!(groups[0], NOGROUP);
    }

    #[test]
    fn test_merges_resolve_in_order() {
        // labels 1, 2, 3 minted, then 2~1 and 3~1 merged: everything ends in 1
        let records = vec![
            PairRecord::new(0, 1, vec![0, 1, 2], vec![0, 1, 2]),
            PairRecord::new(1, 2, vec![0, 1], vec![0, 0]),
            PairRecord::new(1, 2, vec![2], vec![0]),
        ];
        let groups = get_group_array(&records, &[3, 3, 1]);
        assert_eq!(groups, vec![1; 7]);

        let records = vec![
            PairRecord::new(0, 1, vec![0, 1, 2], vec![0, 1, 2]),
            PairRecord::new(1, 2, vec![1], vec![0]),
            PairRecord::new(1, 2, vec![0], vec![0]),
            PairRecord::new(1, 2, vec![2], vec![0]),
        ];
        // 1~2 then 3~2: everything ends in 2
        let groups = get_group_array(&records, &[3, 3, 1]);
        assert_eq!(groups, vec![2; 7]);
    }

    #[test]
    fn test_no_records() {
        assert_eq!(get_group_array(&[], &[2, 1]), vec![NOGROUP; 3]);
        assert!(get_group_array(&[], &[]).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_pair_panics() {
        let records = vec![PairRecord::new(0, 1, vec![3], vec![0])];
        get_group_array(&records, &[2, 2]);
    }
}
