use serde::{Deserialize, Serialize};

/// Which contour of an observation is used to compute overlaps.
///
/// * `Effective` – outermost closed contour (`contour_lon_e`, `contour_lat_e`).
/// * `Speed` – contour of maximal mean speed, inside the effective one (`contour_lon_s`, `contour_lat_s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourKind {
    #[default]
    Effective,
    Speed,
}

impl ContourKind {
    /// `Speed` for the inner contour, `Effective` otherwise.
    pub fn from_intern(intern: bool) -> Self {
        if intern {
            ContourKind::Speed
        } else {
            ContourKind::Effective
        }
    }

    pub fn x_field(self) -> &'static str {
        match self {
            ContourKind::Effective => "contour_lon_e",
            ContourKind::Speed => "contour_lon_s",
        }
    }

    pub fn y_field(self) -> &'static str {
        match self {
            ContourKind::Effective => "contour_lat_e",
            ContourKind::Speed => "contour_lat_s",
        }
    }

    pub fn field_names(self) -> [&'static str; 2] {
        [self.x_field(), self.y_field()]
    }
}

/// Decoded contours of every observation of one file.
///
/// `x[k]` and `y[k]` are the boundary coordinates of observation `k`, in boundary order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourSet {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
}

impl ContourSet {
    /// Panics if `x` and `y` do not describe the same number of contours.
    pub fn new(x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must hold one entry per contour");
        ContourSet { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn contour(&self, k: usize) -> (&[f64], &[f64]) {
        (&self.x[k], &self.y[k])
    }
}
