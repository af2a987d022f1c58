use serde::Serialize;

use crate::error::{ReduceError, Result};

/// Partition of `{0, …, n-1}` into active and frozen DOF indices.
///
/// Both sets are strictly increasing; together they cover the full range
/// with no overlap. Constructed only through [`DofSelection::new`], which
/// validates the raw user input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DofSelection {
    dof: usize,
    active: Vec<usize>,
    frozen: Vec<usize>,
}

impl DofSelection {
    /// Sort `raw` and validate it against a `dof`-joint model.
    ///
    /// Unsorted input is accepted. Empty input, repeated indices and
    /// indices `>= dof` are rejected.
    pub fn new(raw: &[usize], dof: usize) -> Result<Self> {
        if raw.is_empty() {
            return Err(ReduceError::EmptyDofSet);
        }
        let mut active = raw.to_vec();
        active.sort_unstable();

        if let Some(pair) = active.windows(2).find(|w| w[0] == w[1]) {
            return Err(ReduceError::DuplicateDof(pair[0]));
        }
        if let Some(&last) = active.last()
            && last >= dof
        {
            return Err(ReduceError::DofOutOfRange { index: last, dof });
        }

        let frozen = (0..dof)
            .filter(|i| active.binary_search(i).is_err())
            .collect();

        Ok(Self {
            dof,
            active,
            frozen,
        })
    }

    /// Full-order DOF count `N`.
    pub fn dof(&self) -> usize {
        self.dof
    }

    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Number of active DOF, `k`.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// True when no joint is frozen.
    pub fn is_full(&self) -> bool {
        self.frozen.is_empty()
    }

    /// Frozen joints as position-symbol indices.
    pub fn frozen_positions(&self) -> &[usize] {
        &self.frozen
    }

    /// Frozen joints as velocity-symbol indices, offset by `N` in the
    /// combined position+velocity ordering.
    pub fn frozen_velocities(&self) -> Vec<usize> {
        self.frozen.iter().map(|i| i + self.dof).collect()
    }

    /// Frozen positions followed by frozen velocities.
    pub fn frozen_state_indices(&self) -> Vec<usize> {
        let mut out = self.frozen.clone();
        out.extend(self.frozen_velocities());
        out
    }

    /// Active indices concatenated in order, e.g. `{1, 3}` → `"13"`.
    pub fn suffix(&self) -> String {
        self.active.iter().map(usize::to_string).collect()
    }
}
