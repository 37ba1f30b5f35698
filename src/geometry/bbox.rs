use crate::geometry::{BBox, BboxFilter};
use crate::observations::ContourSet;

/// Bounding-box intersection filter.
///
/// Sweep over `x`: the boxes of both sets are visited by increasing `xmin`, each one is
/// tested against the boxes of the other set still open at its `xmin`, i.e. with
/// `xmax >= xmin`. Boxes closed before the sweep position are dropped and never tested
/// again. Candidate pairs come out ordered by `(ia, ib)`.
/// Empty contours have no box and never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct BboxIntersection;

impl BboxFilter for BboxIntersection {
    fn candidates(&self, a: &ContourSet, b: &ContourSet) -> (Vec<u32>, Vec<u32>) {
        // (box, index, from `a`)
        let mut events: Vec<(BBox, u32, bool)> = boxes(a)
            .into_iter()
            .enumerate()
            .filter_map(|(k, bbox)| bbox.map(|bbox| (bbox, k as u32, true)))
            .chain(
                boxes(b)
                    .into_iter()
                    .enumerate()
                    .filter_map(|(k, bbox)| bbox.map(|bbox| (bbox, k as u32, false))),
            )
            .collect();
        events.sort_by(|l, r| l.0.xmin.total_cmp(&r.0.xmin));

        let mut open_a: Vec<(u32, BBox)> = Vec::new();
        let mut open_b: Vec<(u32, BBox)> = Vec::new();
        let mut pairs: Vec<(u32, u32)> = Vec::new();
        for (bbox, k, from_a) in events {
            let (own, other) = if from_a {
                (&mut open_a, &mut open_b)
            } else {
                (&mut open_b, &mut open_a)
            };
            other.retain(|(_, open)| open.xmax >= bbox.xmin);
            pairs.extend(
                other
                    .iter()
                    .filter(|(_, open)| bbox.intersects(open))
                    .map(|&(j, _)| if from_a { (k, j) } else { (j, k) }),
            );
            own.push((k, bbox));
        }

        pairs.sort_unstable();
        pairs.into_iter().unzip()
    }
}

fn boxes(contours: &ContourSet) -> Vec<Option<BBox>> {
    contours
        .x
        .iter()
        .zip(&contours.y)
        .map(|(x, y)| BBox::from_contour(x, y))
        .collect()
}
