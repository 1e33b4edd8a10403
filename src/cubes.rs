//! Iterator over the satisfying cubes of a BDD.
//!
//! Every path from the root to the 1-terminal is one cube: the variables
//! tested along the path get their branch value, every other variable is a
//! don't-care. Paths of a BDD are mutually exclusive, so the cubes are
//! disjoint and together cover exactly the satisfying assignments.
//!
//! The traversal is depth-first and takes the low (0) branch before the high
//! (1) branch, so the order is deterministic for a given diagram.
//!
//! # Example
//!
//! ```
//! use bdd_abstract::bdd::Bdd;
//! use bdd_abstract::types::{cube_to_string, Ternary};
//!
//! let bdd = Bdd::default();
//! let x1 = bdd.mk_var(1);
//! let x3 = bdd.mk_var(3);
//! let f = bdd.apply_or(x1, x3);
//!
//! let cubes: Vec<String> = bdd.cubes(f, 3).map(|c| cube_to_string(&c)).collect();
//! assert_eq!(cubes, vec!["0-1", "1--"]);
//! ```

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::Ternary;

impl Bdd {
    /// Returns an iterator over the satisfying cubes of `f`.
    ///
    /// Each cube has `num_vars` entries; entry `i` describes variable `i + 1`.
    ///
    /// # Panics
    ///
    /// The iterator panics if `f` depends on a variable above `num_vars`.
    pub fn cubes(&self, f: Ref, num_vars: usize) -> BddCubes<'_> {
        BddCubes::new(self, f, num_vars)
    }
}

/// Which branch of a decision node to explore next.
#[derive(Debug, Clone, Copy)]
enum Branch {
    Low,
    High,
}

#[derive(Debug)]
struct StackFrame {
    node: Ref,
    /// `None` once both branches are explored.
    next_branch: Option<Branch>,
}

/// An iterator over satisfying cubes, created by [`Bdd::cubes()`].
pub struct BddCubes<'a> {
    bdd: &'a Bdd,
    stack: Vec<StackFrame>,
    /// Cube of the current path; reset to don't-care when backtracking.
    cube: Vec<Ternary>,
}

impl<'a> BddCubes<'a> {
    pub fn new(bdd: &'a Bdd, f: Ref, num_vars: usize) -> Self {
        BddCubes {
            bdd,
            stack: vec![StackFrame {
                node: f,
                next_branch: Some(Branch::Low),
            }],
            cube: vec![Ternary::DontCare; num_vars],
        }
    }

    fn var_position(&self, node: Ref) -> usize {
        let var = self.bdd.variable(node.index()) as usize;
        assert!(
            var <= self.cube.len(),
            "Variable {} is out of range for cubes of {} variables",
            var,
            self.cube.len()
        );
        var - 1
    }
}

impl Iterator for BddCubes<'_> {
    type Item = Vec<Ternary>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last()?;
            let node = frame.node;
            let next_branch = frame.next_branch;

            if self.bdd.is_one(node) {
                self.stack.pop();
                return Some(self.cube.clone());
            }
            if self.bdd.is_zero(node) {
                self.stack.pop();
                continue;
            }

            let pos = self.var_position(node);
            let (value, child, after) = match next_branch {
                Some(Branch::Low) => (Ternary::Zero, self.bdd.low_node(node), Some(Branch::High)),
                Some(Branch::High) => (Ternary::One, self.bdd.high_node(node), None),
                None => {
                    self.cube[pos] = Ternary::DontCare;
                    self.stack.pop();
                    continue;
                }
            };

            self.cube[pos] = value;
            if let Some(frame) = self.stack.last_mut() {
                frame.next_branch = after;
            }
            self.stack.push(StackFrame {
                node: child,
                next_branch: Some(Branch::Low),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::cube_to_string;

    use super::*;

    fn cubes(bdd: &Bdd, f: Ref, n: usize) -> Vec<String> {
        bdd.cubes(f, n).map(|c| cube_to_string(&c)).collect()
    }

    #[test]
    fn test_cubes_constants() {
        let bdd = Bdd::default();

        assert_eq!(cubes(&bdd, bdd.one, 3), vec!["---"]);
        assert!(cubes(&bdd, bdd.zero, 3).is_empty());
        assert_eq!(cubes(&bdd, bdd.one, 0), vec![""]);
    }

    #[test]
    fn test_cubes_single_variable() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(2);

        assert_eq!(cubes(&bdd, x, 2), vec!["-1"]);
        assert_eq!(cubes(&bdd, -x, 2), vec!["-0"]);
    }

    #[test]
    fn test_cubes_xor() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let xor = bdd.apply_ite(x, -y, y);

        assert_eq!(cubes(&bdd, xor, 2), vec!["01", "10"]);
    }

    #[test]
    fn test_cubes_negated_function() {
        let bdd = Bdd::default();
        let f = bdd.apply_and_many([-bdd.mk_var(1), -bdd.mk_var(2), -bdd.mk_var(3)]);

        assert_eq!(cubes(&bdd, f, 3), vec!["000"]);
        // ~f = x1 | x2 | x3: three disjoint paths.
        assert_eq!(cubes(&bdd, -f, 3), vec!["001", "01-", "1--"]);
    }

    #[test]
    fn test_cubes_cover_satisfying_set() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let f = bdd.apply_or(bdd.apply_and(x1, -x2), x3);

        let total: usize = bdd
            .cubes(f, 3)
            .map(|c| 1 << c.iter().filter(|t| t.is_dont_care()).count())
            .sum();
        let count = (0..8u32)
            .filter(|bits| {
                let a: Vec<bool> = (0..3).map(|i| bits & (1 << i) != 0).collect();
                bdd.evaluate(f, &a)
            })
            .count();
        assert_eq!(total, count);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cubes_too_few_variables() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(4);
        bdd.cubes(x, 2).for_each(drop);
    }
}
