use std::fmt;

use itertools::Itertools;

use crate::constants::{GroupLabel, NOGROUP};

/// Outcome of a grouping run, logged once the labels are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSummary {
    /// Observations without any group.
    pub alone: usize,
    pub total: usize,
    /// Distinct labels, [`NOGROUP`] included when present.
    pub groups: usize,
}

impl GroupSummary {
    pub fn from_groups(groups: &[GroupLabel]) -> Self {
        GroupSummary {
            alone: groups.iter().filter(|&&g| g == NOGROUP).count(),
            total: groups.len(),
            groups: groups.iter().unique().count(),
        }
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} alone / {} obs, {} groups",
            self.alone, self.total, self.groups
        )
    }
}

/// Distribution of the network sizes (observations per non-[`NOGROUP`] label).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub networks: usize,
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

impl GroupStats {
    /// `None` when no observation belongs to a network.
    pub fn from_groups(groups: &[GroupLabel]) -> Option<Self> {
        let mut sizes: Vec<usize> = groups
            .iter()
            .filter(|&&g| g != NOGROUP)
            .counts()
            .into_values()
            .collect();
        if sizes.is_empty() {
            return None;
        }
        sizes.sort_unstable();

        #[inline]
        fn q_index(n: usize, q: f64) -> usize {
            let pos = q * (n as f64 - 1.0);
            let idx = pos.round() as isize;
            idx.clamp(0, (n as isize) - 1) as usize
        }

        let n = sizes.len();
        Some(GroupStats {
            networks: n,
            min: sizes[0],
            p25: sizes[q_index(n, 0.25)],
            median: sizes[q_index(n, 0.50)],
            p95: sizes[q_index(n, 0.95)],
            max: sizes[n - 1],
        })
    }
}

impl fmt::Display for GroupStats {
    /// Compact by default; multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Observations per network ({} networks)", self.networks)?;
            writeln!(f, "-----------------------------------------")?;
            writeln!(f, "min    : {}", self.min)?;
            writeln!(f, "p25    : {}", self.p25)?;
            writeln!(f, "median : {}", self.median)?;
            writeln!(f, "p95    : {}", self.p95)?;
            write!(f, "max    : {}", self.max)
        } else {
            write!(
                f,
                "networks={}, min={}, p25={}, median={}, p95={}, max={}",
                self.networks, self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}
