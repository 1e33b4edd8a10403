//! Projection of a rebuilt diagram onto the visible variables.

use log::{debug, warn};

use crate::bdd::Bdd;
use crate::builder::engine_var;
use crate::model::{base_name, VariableOrdering, VisibleSet};
use crate::reference::Ref;

/// Partition of the variable order into visible and free (hidden) indices.
///
/// Both lists are ascending and together cover `0..ordering.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableProjector {
    visible: Vec<usize>,
    free: Vec<usize>,
}

impl VariableProjector {
    pub fn new(ordering: &VariableOrdering, visible: &VisibleSet) -> Self {
        let mut visible_indices = Vec::new();
        let mut free = Vec::new();
        for (index, name) in ordering.names().enumerate() {
            if visible.is_visible(name) {
                debug!("visible: {:2} -> {}", index, name);
                visible_indices.push(index);
            } else {
                free.push(index);
            }
        }

        let mut unmatched: Vec<&str> = visible
            .iter()
            .filter(|&base| !ordering.names().any(|name| base_name(name) == base))
            .collect();
        unmatched.sort_unstable();
        for base in unmatched {
            warn!("visible name {:?} matches no variable of the dump", base);
        }

        Self {
            visible: visible_indices,
            free,
        }
    }

    /// Indices of the visible variables, ascending.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Indices of the variables to quantify away, ascending.
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    /// Conjunction of the positive literals of all free variables.
    ///
    /// The cube is the constant true when every variable is visible.
    pub fn free_cube(&self, bdd: &Bdd) -> Ref {
        bdd.apply_and_many(self.free.iter().map(|&i| bdd.mk_var(engine_var(i))))
    }

    /// Existentially quantify every free variable out of `root`.
    ///
    /// The result depends on visible variables only.
    pub fn abstract_root(&self, bdd: &Bdd, root: Ref) -> Ref {
        let cube = self.free_cube(bdd);
        bdd.exists(root, cube)
    }
}
