//! BDD to dump conversion.
//!
//! Writes a diagram in the same DOT-like dialect that [`crate::parser`]
//! reads, so an abstracted diagram can be saved and fed back in.
//!
//! The dialect has no complemented edges, so a node reached both regularly
//! and through a negated edge is written twice. Addresses are hexadecimal
//! and assigned in post-order: `1` is FALSE, `2` is TRUE, and decision nodes
//! are numbered from `3` so that the root gets the largest address.
//!
//! # Examples
//!
//! ```
//! use bdd_abstract::bdd::Bdd;
//! use bdd_abstract::builder::build;
//! use bdd_abstract::model::VariableOrdering;
//! use bdd_abstract::parser::parse_str;
//!
//! let bdd = Bdd::default();
//! let f = bdd.apply_or(bdd.mk_var(1), -bdd.mk_var(2));
//! let ordering: VariableOrdering = ["a", "b"].into_iter().collect();
//!
//! let dump = bdd.to_dump(f, &ordering).unwrap();
//! let model = parse_str(&dump).unwrap();
//! assert_eq!(build(&model, &bdd).unwrap(), f);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use crate::bdd::Bdd;
use crate::model::VariableOrdering;
use crate::reference::Ref;

const FALSE_ADDRESS: u64 = 1;
const TRUE_ADDRESS: u64 = 2;

/// A decision node as it appears in the dump.
struct DumpNode {
    address: u64,
    variable: u32,
    then_address: u64,
    else_address: u64,
}

#[derive(Default)]
struct Numbering {
    addresses: HashMap<Ref, u64>,
    nodes: Vec<DumpNode>,
    uses_false: bool,
    uses_true: bool,
}

impl Bdd {
    fn number(&self, node: Ref, numbering: &mut Numbering) -> u64 {
        if self.is_zero(node) {
            numbering.uses_false = true;
            return FALSE_ADDRESS;
        }
        if self.is_one(node) {
            numbering.uses_true = true;
            return TRUE_ADDRESS;
        }
        if let Some(&address) = numbering.addresses.get(&node) {
            return address;
        }

        let else_address = self.number(self.low_node(node), numbering);
        let then_address = self.number(self.high_node(node), numbering);
        let address = numbering.nodes.len() as u64 + 3;
        numbering.nodes.push(DumpNode {
            address,
            variable: self.variable(node.index()),
            then_address,
            else_address,
        });
        numbering.addresses.insert(node, address);
        address
    }

    /// Write the diagram rooted at `root` as a dump.
    ///
    /// Variable `v` is written under the name at index `v - 1` of `ordering`.
    /// Variables beyond the ordering are named `x<v>`. Every variable of the
    /// ordering gets a rank, so reading the dump back yields the same order.
    pub fn to_dump(&self, root: Ref, ordering: &VariableOrdering) -> Result<String, std::fmt::Error> {
        let mut numbering = Numbering::default();
        let root_address = self.number(root, &mut numbering);

        let max_var = numbering.nodes.iter().map(|n| n.variable as usize).max().unwrap_or(0);
        let names: Vec<String> = (1..=max_var.max(ordering.len()))
            .map(|v| match ordering.name_of(v - 1) {
                Some(name) => name.to_string(),
                None => format!("x{}", v),
            })
            .collect();

        let mut levels = BTreeMap::<u32, Vec<u64>>::new();
        for node in numbering.nodes.iter() {
            levels.entry(node.variable).or_default().push(node.address);
        }

        let mut dump = String::new();
        writeln!(dump, "digraph \"DD\" {{")?;
        writeln!(dump, "size = \"7.5,10\"")?;
        writeln!(dump, "center = true;")?;
        writeln!(dump, "edge [dir = none];")?;

        // Invisible chain of rank labels.
        writeln!(dump, "{{ node [shape = plaintext];")?;
        writeln!(dump, "  edge [style = invis];")?;
        writeln!(dump, "  \"CONST NODES\" [style = invis];")?;
        for name in names.iter() {
            write!(dump, "\" {} \" -> ", name)?;
        }
        writeln!(dump, "\"CONST NODES\";")?;
        writeln!(dump, "}}")?;

        // Root label.
        writeln!(dump, "{{ rank = same; node [shape = box]; edge [style = invis];")?;
        writeln!(dump, "\"F0\"; }}")?;
        writeln!(dump, "\"F0\" -> \"{:x}\" [style = solid];", root_address)?;

        for (i, name) in names.iter().enumerate() {
            writeln!(dump, "{{ rank = same; \" {} \";", name)?;
            if let Some(addresses) = levels.get(&(i as u32 + 1)) {
                for address in addresses {
                    writeln!(dump, "\"{:x}\";", address)?;
                }
            }
            writeln!(dump, "}}")?;
        }

        // Terminals share one line, so they are not taken for nodes of the last rank.
        writeln!(dump, "{{ rank = same; \"CONST NODES\";")?;
        write!(dump, "{{ node [shape = box];")?;
        if numbering.uses_false {
            write!(dump, " \"{:x}\";", FALSE_ADDRESS)?;
        }
        if numbering.uses_true {
            write!(dump, " \"{:x}\";", TRUE_ADDRESS)?;
        }
        writeln!(dump)?;
        writeln!(dump, "}}")?;
        writeln!(dump, "}}")?;

        if numbering.uses_false {
            writeln!(dump, "\"{:x}\" [label = \"FALSE\"];", FALSE_ADDRESS)?;
        }
        if numbering.uses_true {
            writeln!(dump, "\"{:x}\" [label = \"TRUE\"];", TRUE_ADDRESS)?;
        }

        for node in numbering.nodes.iter().rev() {
            writeln!(dump, "\"{:x}\" -> \"{:x}\";", node.address, node.then_address)?;
            writeln!(
                dump,
                "\"{:x}\" -> \"{:x}\" [style = dashed];",
                node.address, node.else_address
            )?;
        }

        writeln!(dump, "}}")?;
        Ok(dump)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::builder::build;
    use crate::parser::parse_str;

    fn round_trip(bdd: &Bdd, f: Ref, ordering: &VariableOrdering) -> Ref {
        let dump = bdd.to_dump(f, ordering).unwrap();
        let model = parse_str(&dump).unwrap();
        assert_eq!(&model.ordering, ordering);
        build(&model, bdd).unwrap()
    }

    #[test]
    fn test_to_dump_and() {
        let bdd = Bdd::default();
        let f = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2));
        let ordering: VariableOrdering = ["a", "b"].into_iter().collect();

        let dump = bdd.to_dump(f, &ordering).unwrap();
        let expected = r#"digraph "DD" {
size = "7.5,10"
center = true;
edge [dir = none];
{ node [shape = plaintext];
  edge [style = invis];
  "CONST NODES" [style = invis];
" a " -> " b " -> "CONST NODES";
}
{ rank = same; node [shape = box]; edge [style = invis];
"F0"; }
"F0" -> "4" [style = solid];
{ rank = same; " a ";
"4";
}
{ rank = same; " b ";
"3";
}
{ rank = same; "CONST NODES";
{ node [shape = box]; "1"; "2";
}
}
"1" [label = "FALSE"];
"2" [label = "TRUE"];
"4" -> "3";
"4" -> "1" [style = dashed];
"3" -> "2";
"3" -> "1" [style = dashed];
}
"#;
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_to_dump_round_trip() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        let ordering: VariableOrdering = ["p.0", "p.1", "q"].into_iter().collect();

        let xor = bdd.apply_ite(x1, -x2, x2);
        let f = bdd.apply_ite(xor, -x3, x3);
        assert_eq!(round_trip(&bdd, f, &ordering), f);
        assert_eq!(round_trip(&bdd, -f, &ordering), -f);

        let g = bdd.apply_or(bdd.apply_and(x1, -x3), -x2);
        assert_eq!(round_trip(&bdd, g, &ordering), g);
    }

    #[test]
    fn test_to_dump_complemented_nodes_are_expanded() {
        let bdd = Bdd::default();
        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        // x1 ? x2 : ~x2 refers to the same stored node twice.
        let f = bdd.apply_ite(x1, x2, -x2);
        let ordering: VariableOrdering = ["a", "b"].into_iter().collect();

        let model = parse_str(&bdd.to_dump(f, &ordering).unwrap()).unwrap();
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.root(), Some(5));
    }

    #[test]
    fn test_to_dump_constants() {
        let bdd = Bdd::default();
        let ordering: VariableOrdering = ["a"].into_iter().collect();

        let model = parse_str(&bdd.to_dump(bdd.one, &ordering).unwrap()).unwrap();
        assert!(model.nodes.is_empty());
        assert_eq!(model.constant(), Some(true));

        let model = parse_str(&bdd.to_dump(bdd.zero, &ordering).unwrap()).unwrap();
        assert_eq!(model.constant(), Some(false));
    }

    #[test]
    fn test_to_dump_variables_beyond_ordering() {
        let bdd = Bdd::default();
        let f = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(3));
        let ordering: VariableOrdering = ["a"].into_iter().collect();

        let dump = bdd.to_dump(f, &ordering).unwrap();
        let model = parse_str(&dump).unwrap();
        assert_eq!(model.ordering.names().collect::<Vec<_>>(), vec!["a", "x2", "x3"]);
        assert_eq!(build(&model, &bdd).unwrap(), f);
    }
}
