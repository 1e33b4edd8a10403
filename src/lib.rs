//! # bdd-abstract: projecting model checker BDDs onto visible variables
//!
//! Model checkers such as NuSMV can dump the BDD of a state set (for example
//! the reachable states) as a DOT-like text file. This crate reads such a
//! dump back, rebuilds it as a canonical **reduced ordered BDD**, quantifies
//! away every variable that is not *visible*, and lists the remaining
//! assignments as plain bit strings.
//!
//! ## Pipeline
//!
//! 1. [`parser`] turns the dump into a [`GraphModel`][crate::model::GraphModel]:
//!    the variable order, the decision nodes and the two terminals.
//! 2. [`builder`] rebuilds the model inside the [`Bdd`][crate::bdd::Bdd] manager.
//! 3. [`projector`] splits the variables into visible and free ones and
//!    existentially quantifies the free ones.
//! 4. [`enumerate`] walks the satisfying cubes of the result and expands the
//!    don't-cares of the visible positions.
//!
//! ```rust
//! use bdd_abstract::bdd::Bdd;
//! use bdd_abstract::builder::build;
//! use bdd_abstract::enumerate::enumerate;
//! use bdd_abstract::model::VisibleSet;
//! use bdd_abstract::parser::parse_str;
//! use bdd_abstract::projector::VariableProjector;
//!
//! let dump = r#"
//! { rank = same; " pc.0 ";
//! "5";
//! }
//! { rank = same; " tmp ";
//! "4";
//! }
//! "1" [label = "FALSE"];
//! "2" [label = "TRUE"];
//! "5" -> "4";
//! "5" -> "1" [style = dashed];
//! "4" -> "2";
//! "4" -> "1" [style = dashed];
//! "#;
//!
//! let model = parse_str(dump).unwrap();
//! let visible = VisibleSet::parse("pc\n");
//!
//! let bdd = Bdd::default();
//! let root = build(&model, &bdd).unwrap();
//! let projector = VariableProjector::new(&model.ordering, &visible);
//! let abstracted = projector.abstract_root(&bdd, root);
//!
//! let lines: Vec<String> = enumerate(
//!     &bdd,
//!     abstracted,
//!     model.ordering.len(),
//!     projector.visible_indices(),
//! )
//! .collect();
//! assert_eq!(lines, vec!["1"]);
//! ```
//!
//! ## The engine
//!
//! The [`bdd`] module holds a small embedded BDD engine: hash-consed nodes
//! with complemented edges, an ITE-based apply, existential quantification,
//! cube iteration ([`cubes`]) and model counting ([`sat`]). Variables are
//! 1-indexed; the variable at index `i` of the dump's order is engine
//! variable `i + 1`.

pub mod bdd;
pub mod builder;
pub mod cache;
pub mod cubes;
pub mod dot;
pub mod enumerate;
pub mod error;
pub mod model;
pub mod node;
pub mod parser;
pub mod projector;
pub mod reference;
pub mod sat;
pub mod table;
pub mod types;
pub mod utils;
