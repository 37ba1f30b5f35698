//! # Geometry strategies used by the overlap scan
//!
//! The scan never computes geometry itself. It asks two injected strategies:
//!
//! * a [`BboxFilter`], which prunes the cross product of two contour sets to the candidate
//!   pairs whose bounding boxes intersect,
//! * an [`OverlapRatio`], which scores each candidate pair.
//!
//! Defaults are [`BboxIntersection`] (sweep on `xmin`) and [`VerticeOverlap`] (polygon
//! intersection over union, computed with `geo`). Any closure with the matching signature
//! is a strategy as well, which keeps tests free of real polygons.
use crate::observations::ContourSet;

pub mod bbox;
pub mod overlap;

pub use bbox::BboxIntersection;
pub use overlap::VerticeOverlap;

/// Candidate pairs between the contours of two files.
pub trait BboxFilter {
    /// Return
    /// ------
    /// * `(ia, ib)` of equal length: contour `ia[k]` of `a` may overlap contour `ib[k]` of `b`.
    fn candidates(&self, a: &ContourSet, b: &ContourSet) -> (Vec<u32>, Vec<u32>);
}

/// Overlap score of candidate contour pairs.
pub trait OverlapRatio {
    /// Return
    /// ------
    /// * One ratio per pair `(ia[k], ib[k])`, in `[0, 1]`.
    fn ratios(&self, a: &ContourSet, ia: &[u32], b: &ContourSet, ib: &[u32]) -> Vec<f64>;
}

impl<F> BboxFilter for F
where
    F: Fn(&ContourSet, &ContourSet) -> (Vec<u32>, Vec<u32>),
{
    fn candidates(&self, a: &ContourSet, b: &ContourSet) -> (Vec<u32>, Vec<u32>) {
        self(a, b)
    }
}

impl<F> OverlapRatio for F
where
    F: Fn(&ContourSet, &[u32], &ContourSet, &[u32]) -> Vec<f64>,
{
    fn ratios(&self, a: &ContourSet, ia: &[u32], b: &ContourSet, ib: &[u32]) -> Vec<f64> {
        self(a, ia, b, ib)
    }
}

/// Axis-aligned bounding box of a contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BBox {
    /// `None` for an empty contour.
    pub fn from_contour(x: &[f64], y: &[f64]) -> Option<BBox> {
        if x.is_empty() || y.is_empty() {
            return None;
        }
        let (xmin, xmax) = min_max(x);
        let (ymin, ymax) = min_max(y);
        Some(BBox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Closed-interval test: boxes touching on an edge intersect.
    #[inline]
    pub fn intersects(&self, other: &BBox) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
