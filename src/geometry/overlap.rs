use geo::{Area, BooleanOps, Coord, LineString, Polygon};

use crate::geometry::OverlapRatio;
use crate::observations::ContourSet;

/// Polygon overlap ratio of contour pairs.
///
/// The ratio is the area of the intersection divided by the area of the union, or by the
/// area of the smaller polygon when `minimal_area` is set. Contours with fewer than three
/// vertices, and pairs with a zero denominator, score `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticeOverlap {
    pub minimal_area: bool,
}

impl VerticeOverlap {
    pub fn new(minimal_area: bool) -> Self {
        VerticeOverlap { minimal_area }
    }

    /// Ratio of a single pair of contours.
    pub fn ratio(&self, xa: &[f64], ya: &[f64], xb: &[f64], yb: &[f64]) -> f64 {
        let (Some(pa), Some(pb)) = (polygon(xa, ya), polygon(xb, yb)) else {
            return 0.0;
        };

        let (area_a, area_b) = (pa.unsigned_area(), pb.unsigned_area());
        // a flat polygon intersects nothing
        if area_a == 0.0 || area_b == 0.0 {
            return 0.0;
        }

        let intersection = pa.intersection(&pb).unsigned_area();
        let denominator = if self.minimal_area {
            area_a.min(area_b)
        } else {
            pa.union(&pb).unsigned_area()
        };

        if denominator > 0.0 {
            (intersection / denominator).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl OverlapRatio for VerticeOverlap {
    fn ratios(&self, a: &ContourSet, ia: &[u32], b: &ContourSet, ib: &[u32]) -> Vec<f64> {
        ia.iter()
            .zip(ib)
            .map(|(&i, &j)| {
                let (xa, ya) = a.contour(i as usize);
                let (xb, yb) = b.contour(j as usize);
                self.ratio(xa, ya, xb, yb)
            })
            .collect()
    }
}

fn polygon(x: &[f64], y: &[f64]) -> Option<Polygon<f64>> {
    if x.len() < 3 || x.len() != y.len() {
        return None;
    }
    let exterior: LineString<f64> = x
        .iter()
        .zip(y)
        .map(|(&x, &y)| Coord { x, y })
        .collect();
    Some(Polygon::new(exterior, vec![]))
}
