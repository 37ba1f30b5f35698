use eddynet::constants::NOGROUP;
use eddynet::network::{
    get_group_array, get_next_index, sort_order, translate_links, PairRecord, SplitIndex,
};
use proptest::prelude::*;

/// Pair records in scan order for the given counts and window, built from raw seeds.
fn records_from(
    nb_obs: &[u32],
    window: usize,
    seeds: &[(usize, usize, u32, u32)],
) -> Vec<PairRecord> {
    let n = nb_obs.len();
    let mut records = Vec::new();
    for i in 0..n {
        for j in i + 1..(i + window + 1).min(n) {
            let (mut ii, mut ij) = (Vec::new(), Vec::new());
            if nb_obs[i] > 0 && nb_obs[j] > 0 {
                for &(si, sj, a, b) in seeds {
                    if si % n == i && i + 1 + sj % window == j {
                        ii.push(a % nb_obs[i]);
                        ij.push(b % nb_obs[j]);
                    }
                }
            }
            records.push(PairRecord::new(i, j, ii, ij));
        }
    }
    records
}

/// Connected components of the pair graph, by plain union-find over flat positions.
fn components(records: &[PairRecord], nb_obs: &[u32]) -> (Vec<usize>, Vec<bool>) {
    let starts: Vec<usize> = nb_obs
        .iter()
        .scan(0usize, |acc, &n| {
            let s = *acc;
            *acc += n as usize;
            Some(s)
        })
        .collect();
    let total: usize = nb_obs.iter().map(|&n| n as usize).sum();
    let mut parent: Vec<usize> = (0..total).collect();
    let mut matched = vec![false; total];

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for record in records {
        for (a, b) in record.pairs() {
            let pa = starts[record.i] + a as usize;
            let pb = starts[record.j] + b as usize;
            matched[pa] = true;
            matched[pb] = true;
            let (ra, rb) = (find(&mut parent, pa), find(&mut parent, pb));
            parent[ra] = rb;
        }
    }
    let roots = (0..total).map(|x| find(&mut parent, x)).collect();
    (roots, matched)
}

fn scan_input() -> impl Strategy<Value = (Vec<u32>, usize, Vec<(usize, usize, u32, u32)>)> {
    (
        prop::collection::vec(0u32..5, 1..7),
        1usize..4,
        prop::collection::vec((0usize..16, 0usize..16, 0u32..16, 0u32..16), 0..30),
    )
}

proptest! {
    #[test]
    fn prop_grouping_is_idempotent((nb_obs, window, seeds) in scan_input()) {
        let records = records_from(&nb_obs, window, &seeds);
        let first = get_group_array(&records, &nb_obs);
        let second = get_group_array(&records, &nb_obs);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_labels_match_components((nb_obs, window, seeds) in scan_input()) {
        let records = records_from(&nb_obs, window, &seeds);
        let groups = get_group_array(&records, &nb_obs);
        let (roots, matched) = components(&records, &nb_obs);

        let total: usize = nb_obs.iter().map(|&n| n as usize).sum();
        prop_assert_eq!(groups.len(), total);
        for p in 0..total {
            prop_assert_eq!(groups[p] == NOGROUP, !matched[p]);
            for q in 0..total {
                if matched[p] && matched[q] {
                    prop_assert_eq!(groups[p] == groups[q], roots[p] == roots[q]);
                }
            }
        }
    }

    #[test]
    fn prop_next_index_is_stable(groups in prop::collection::vec(0u32..6, 0..40)) {
        let new_i = get_next_index(&groups);
        let mut seen = vec![false; groups.len()];
        for &row in &new_i {
            prop_assert!(!seen[row as usize]);
            seen[row as usize] = true;
        }
        for a in 0..groups.len() {
            for b in a + 1..groups.len() {
                if groups[a] == groups[b] {
                    prop_assert!(new_i[a] < new_i[b]);
                } else {
                    prop_assert_eq!(groups[a] < groups[b], new_i[a] < new_i[b]);
                }
            }
        }
    }

    #[test]
    fn prop_links_follow_their_targets(
        rows in prop::collection::vec((0u32..3, 0u32..3, 0u32..100, -1i32..20), 1..20)
    ) {
        let n = rows.len() as i32;
        let links: Vec<i32> = rows.iter().map(|r| if r.3 < n { r.3 } else { -1 }).collect();
        let split = SplitIndex::new(
            rows.iter().map(|r| r.0).collect(),
            rows.iter().map(|r| r.1).collect(),
            rows.iter().map(|r| r.2 as f64).collect(),
            links.clone(),
            vec![-1; rows.len()],
        )
        .unwrap();

        let order = sort_order(&split);
        let translated = translate_links(&links, &order).unwrap();
        for (k, &value) in translated.iter().enumerate() {
            prop_assert!(value >= -1 && value < n);
            let original = links[order[k]];
            if original == -1 {
                prop_assert_eq!(value, -1);
            } else {
                prop_assert_eq!(order[value as usize] as i32, original);
            }
        }
    }
}
