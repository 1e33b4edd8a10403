//! Rebuilding a parsed dump inside the BDD manager.
//!
//! Every dumped decision node `(var, then, else)` becomes
//! `ite(x_{var+1}, then, else)` over the already rebuilt children. Because
//! the result goes through [`Bdd::apply_ite`], it is canonical no matter how
//! redundant or oddly ordered the dump was.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::model::{Child, GraphModel};
use crate::reference::Ref;

/// Engine variable of the variable at `index` in the ordering.
pub fn engine_var(index: usize) -> u32 {
    index as u32 + 1
}

struct Builder<'a> {
    model: &'a GraphModel,
    bdd: &'a Bdd,
    built: HashMap<u64, Ref>,
}

impl<'a> Builder<'a> {
    fn new(model: &'a GraphModel, bdd: &'a Bdd) -> Self {
        Self {
            model,
            bdd,
            built: HashMap::new(),
        }
    }

    fn child(&self, child: Child) -> Option<Ref> {
        match child {
            Child::False => Some(self.bdd.zero),
            Child::True => Some(self.bdd.one),
            Child::Node(address) => self.built.get(&address).copied(),
        }
    }

    /// Build the node at `address` and everything below it.
    ///
    /// Children are built before their parents using an explicit stack, so
    /// deep dumps do not overflow the call stack.
    fn build(&mut self, address: u64) -> Result<Ref> {
        let mut stack = vec![(address, false)];
        let mut visiting = HashSet::new();

        while let Some((current, expanded)) = stack.pop() {
            if self.built.contains_key(&current) {
                continue;
            }
            let node = self
                .model
                .nodes
                .get(&current)
                .ok_or(Error::UnknownNode { address: current })?;

            if !expanded {
                if !visiting.insert(current) {
                    return Err(Error::CyclicGraph { address: current });
                }
                stack.push((current, true));
                for child in [node.else_child, node.then_child] {
                    if let Child::Node(next) = child {
                        if !self.built.contains_key(&next) {
                            stack.push((next, false));
                        }
                    }
                }
                continue;
            }

            // Both children are built at this point.
            let then_child = self
                .child(node.then_child)
                .ok_or(Error::CyclicGraph { address: current })?;
            let else_child = self
                .child(node.else_child)
                .ok_or(Error::CyclicGraph { address: current })?;
            let var = self.bdd.mk_var(engine_var(node.var));
            let res = self.bdd.apply_ite(var, then_child, else_child);
            self.built.insert(current, res);
            visiting.remove(&current);
        }

        self.built
            .get(&address)
            .copied()
            .ok_or(Error::UnknownNode { address })
    }
}

/// Rebuild the function of `model` in `bdd` and return its root.
///
/// All decision nodes are rebuilt in ascending address order; the node with
/// the largest address is the root. A model without decision nodes denotes a
/// constant when it declares exactly one terminal.
///
/// # Errors
///
/// - [`Error::EmptyGraph`] when there is nothing to rebuild.
/// - [`Error::CyclicGraph`] when the edges form a cycle.
/// - [`Error::UnknownNode`] when an edge leads outside the model.
pub fn build(model: &GraphModel, bdd: &Bdd) -> Result<Ref> {
    if let Some(value) = model.constant() {
        debug!("dump denotes the constant {}", value);
        return Ok(if value { bdd.one } else { bdd.zero });
    }
    let root = model.root().ok_or(Error::EmptyGraph)?;

    let mut builder = Builder::new(model, bdd);
    for &address in model.nodes.keys() {
        builder.build(address)?;
    }
    let res = builder.build(root)?;

    debug!(
        "rebuilt {} dumped nodes into a diagram of {} nodes",
        model.nodes.len(),
        bdd.size(res)
    );
    Ok(res)
}
