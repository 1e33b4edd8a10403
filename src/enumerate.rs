//! Enumeration of concrete visible assignments.
//!
//! The satisfying cubes of the abstracted diagram are produced by
//! [`Bdd::cubes()`]. Each cube is projected onto the visible variables, and
//! every don't-care left in the projection is expanded into both values, so a
//! projection with `k` don't-cares yields `2^k` bit strings.
//!
//! The output order is the cube order of [`Bdd::cubes()`], then counter order
//! within each cube: the `j`-th don't-care takes bit `j` of a counter running
//! from `0` to `2^k - 1`. The order is deterministic but not sorted.

use crate::bdd::Bdd;
use crate::cubes::BddCubes;
use crate::reference::Ref;
use crate::types::Ternary;

/// Iterator over the concrete expansions of one projected cube.
#[derive(Debug, Clone)]
pub struct Unfold {
    template: Vec<Ternary>,
    /// Positions of the don't-cares in `template`, left to right.
    dont_cares: Vec<usize>,
    /// Counter bits, least significant first, one per don't-care.
    counter: Vec<bool>,
    done: bool,
}

/// Project `cube` onto the `visible` positions and expand its don't-cares.
///
/// # Panics
///
/// Panics if a visible index is out of range for `cube`.
///
/// # Examples
///
/// ```
/// use bdd_abstract::enumerate::unfold;
/// use bdd_abstract::types::Ternary::{DontCare, One, Zero};
///
/// let cube = [DontCare, One, DontCare, Zero];
/// let unfolded: Vec<String> = unfold(&cube, &[0, 1, 2]).collect();
/// assert_eq!(unfolded, vec!["010", "110", "011", "111"]);
/// ```
pub fn unfold(cube: &[Ternary], visible: &[usize]) -> Unfold {
    let template: Vec<Ternary> = visible.iter().map(|&i| cube[i]).collect();
    let dont_cares: Vec<usize> = template
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_dont_care())
        .map(|(pos, _)| pos)
        .collect();
    let counter = vec![false; dont_cares.len()];
    Unfold {
        template,
        dont_cares,
        counter,
        done: false,
    }
}

impl Unfold {
    /// Number of don't-cares among the visible positions.
    pub fn num_dont_cares(&self) -> usize {
        self.dont_cares.len()
    }

    fn render(&self) -> String {
        let mut bits: Vec<char> = self
            .template
            .iter()
            .map(|t| match t {
                Ternary::Zero => '0',
                Ternary::One => '1',
                Ternary::DontCare => '-',
            })
            .collect();
        for (&pos, &bit) in self.dont_cares.iter().zip(&self.counter) {
            bits[pos] = if bit { '1' } else { '0' };
        }
        bits.into_iter().collect()
    }

    /// Advance the counter; returns `false` on wrap-around.
    fn increment(&mut self) -> bool {
        for bit in self.counter.iter_mut() {
            if !*bit {
                *bit = true;
                return true;
            }
            *bit = false;
        }
        false
    }
}

impl Iterator for Unfold {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.render();
        self.done = !self.increment();
        Some(res)
    }
}

/// Lazy sequence of visible bit strings, created by [`enumerate()`].
pub struct Assignments<'a> {
    cubes: BddCubes<'a>,
    visible: &'a [usize],
    current: Option<Unfold>,
    num_cubes: usize,
}

impl Assignments<'_> {
    /// Number of engine cubes consumed so far.
    pub fn num_cubes(&self) -> usize {
        self.num_cubes
    }
}

impl Iterator for Assignments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(assignment) = self.current.as_mut().and_then(Iterator::next) {
                return Some(assignment);
            }
            let cube = self.cubes.next()?;
            self.num_cubes += 1;
            self.current = Some(unfold(&cube, self.visible));
        }
    }
}

/// Enumerate the assignments of `root` over the `visible` variable indices.
///
/// `num_vars` is the length of the variable order; index `i` is engine
/// variable `i + 1`. Each item has exactly `visible.len()` characters.
///
/// # Examples
///
/// ```
/// use bdd_abstract::bdd::Bdd;
/// use bdd_abstract::enumerate::enumerate;
///
/// let bdd = Bdd::default();
/// let f = bdd.apply_and(bdd.mk_var(1), -bdd.mk_var(3));
/// let lines: Vec<String> = enumerate(&bdd, f, 3, &[0, 2]).collect();
/// assert_eq!(lines, vec!["10"]);
/// ```
pub fn enumerate<'a>(bdd: &'a Bdd, root: Ref, num_vars: usize, visible: &'a [usize]) -> Assignments<'a> {
    Assignments {
        cubes: bdd.cubes(root, num_vars),
        visible,
        current: None,
        num_cubes: 0,
    }
}
