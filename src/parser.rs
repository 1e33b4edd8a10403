//! Reader for the DOT-like BDD dump of a model checker.
//!
//! The dump is written by NuSMV (`dump_fsm -r`) and looks like this:
//!
//! ```text
//! digraph "DD" {
//! { rank = same; " x ";
//! "a3";
//! }
//! { rank = same; " y ";
//! "a2";
//! }
//! "a0" [label = "FALSE"];
//! "a1" [label = "TRUE"];
//! "a3" -> "a2";
//! "a3" -> "a0" [style = dashed];
//! "a2" -> "a1";
//! "a2" -> "a0" [style = dashed];
//! }
//! ```
//!
//! Five line shapes are recognized, each anchored at the start of the line:
//!
//! | Shape          | Pattern                                | Meaning                         |
//! |----------------|----------------------------------------|---------------------------------|
//! | rank           | `{ rank = same; " NAME ";`             | next variable, new context      |
//! | false terminal | `... "HEX" [label = "FALSE"];`         | address of the 0 terminal       |
//! | true terminal  | `... "HEX" [label = "TRUE"];`          | address of the 1 terminal       |
//! | node           | `"HEX";`                               | node testing the context var    |
//! | edge           | `"HEX" -> "HEX";` (+ `[style = dashed]`) | 1-edge (0-edge when dashed)   |
//!
//! The shapes are checked independently, so one line may match several.
//! Lines matching no shape (headers, styling, the root label) are skipped.
//! Lines that match a shape but are inconsistent with the rest of the dump
//! are rejected with their line number, see [`Malformed`].

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, trace};
use regex::{Captures, Regex};

use crate::error::{Error, Malformed, Result};
use crate::model::{Child, DecisionNode, GraphModel, VariableOrdering, VisibleSet};

struct Patterns {
    rank: Regex,
    false_terminal: Regex,
    true_terminal: Regex,
    node: Regex,
    edge: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        rank: Regex::new(r#"^\{ rank = same; " (.*) ";"#).expect("valid rank pattern"),
        false_terminal: Regex::new(r#"^.*"([0-9a-f]+)" \[label = "FALSE"\];"#)
            .expect("valid terminal pattern"),
        true_terminal: Regex::new(r#"^.*"([0-9a-f]+)" \[label = "TRUE"\];"#)
            .expect("valid terminal pattern"),
        node: Regex::new(r#"^"([0-9a-f]+)";"#).expect("valid node pattern"),
        edge: Regex::new(r#"^"([0-9a-f]+)" -> "([0-9a-f]+)"( \[style = dashed\])?;"#)
            .expect("valid edge pattern"),
    })
}

/// A declaration together with the line it came from.
#[derive(Debug, Clone, Copy)]
struct Located<T> {
    value: T,
    line: usize,
}

/// State of the single-pass scan over the dump.
#[derive(Debug, Default)]
struct ParserState {
    /// 1-based number of the line being processed.
    line: usize,
    /// Variable of the innermost rank declaration seen so far.
    current_var: Option<usize>,
    ordering: VariableOrdering,
    labels: BTreeMap<u64, Located<usize>>,
    then_edges: BTreeMap<u64, Located<u64>>,
    else_edges: BTreeMap<u64, Located<u64>>,
    false_terminal: Option<Located<u64>>,
    true_terminal: Option<Located<u64>>,
}

impl ParserState {
    fn malformed(&self, kind: Malformed) -> Error {
        Error::malformed(self.line, kind)
    }

    fn address(&self, caps: &Captures, group: usize) -> Result<u64> {
        let text = &caps[group];
        u64::from_str_radix(text, 16).map_err(|_| {
            self.malformed(Malformed::BadAddress {
                text: text.to_string(),
            })
        })
    }

    fn feed(&mut self, text: &str) -> Result<()> {
        self.line += 1;
        let patterns = patterns();
        let mut matched = false;

        if let Some(caps) = patterns.rank.captures(text) {
            matched = true;
            self.declare_rank(&caps[1]);
        }
        if let Some(caps) = patterns.node.captures(text) {
            matched = true;
            let address = self.address(&caps, 1)?;
            self.declare_node(address)?;
        }
        if let Some(caps) = patterns.false_terminal.captures(text) {
            matched = true;
            let address = self.address(&caps, 1)?;
            self.declare_terminal(false, address)?;
        }
        if let Some(caps) = patterns.true_terminal.captures(text) {
            matched = true;
            let address = self.address(&caps, 1)?;
            self.declare_terminal(true, address)?;
        }
        if let Some(caps) = patterns.edge.captures(text) {
            matched = true;
            let source = self.address(&caps, 1)?;
            let target = self.address(&caps, 2)?;
            self.declare_edge(source, target, caps.get(3).is_some())?;
        }

        if !matched {
            trace!("line {}: skipped", self.line);
        }
        Ok(())
    }

    fn declare_rank(&mut self, name: &str) {
        let index = self.ordering.insert(name);
        debug!("--> {:2} -> {}", index, name);
        self.current_var = Some(index);
    }

    fn declare_node(&mut self, address: u64) -> Result<()> {
        let var = self
            .current_var
            .ok_or_else(|| self.malformed(Malformed::NoRankContext { address }))?;
        match self.labels.get(&address) {
            Some(prev) if prev.value != var => {
                Err(self.malformed(Malformed::NodeRedeclared { address }))
            }
            Some(_) => Ok(()),
            None => {
                let line = self.line;
                self.labels.insert(address, Located { value: var, line });
                Ok(())
            }
        }
    }

    fn declare_terminal(&mut self, value: bool, address: u64) -> Result<()> {
        let line = self.line;
        let (slot, terminal) = if value {
            (&mut self.true_terminal, "TRUE")
        } else {
            (&mut self.false_terminal, "FALSE")
        };
        match *slot {
            Some(prev) if prev.value != address => Err(Error::malformed(
                line,
                Malformed::ConflictingTerminal {
                    terminal,
                    address,
                    previous: prev.value,
                },
            )),
            Some(_) => Ok(()),
            None => {
                *slot = Some(Located {
                    value: address,
                    line,
                });
                Ok(())
            }
        }
    }

    fn declare_edge(&mut self, source: u64, target: u64, dashed: bool) -> Result<()> {
        let line = self.line;
        let (edges, kind) = if dashed {
            (&mut self.else_edges, "0")
        } else {
            (&mut self.then_edges, "1")
        };
        match edges.get(&source) {
            Some(prev) if prev.value != target => Err(Error::malformed(
                line,
                Malformed::ConflictingEdge {
                    kind,
                    source_address: source,
                    previous: prev.value,
                },
            )),
            Some(_) => Ok(()),
            None => {
                edges.insert(
                    source,
                    Located {
                        value: target,
                        line,
                    },
                );
                Ok(())
            }
        }
    }

    /// Resolve edge targets and check that the dump describes a complete graph.
    ///
    /// All problems are collected and the one on the earliest line is reported.
    fn finish(self) -> Result<GraphModel> {
        let ParserState {
            ordering,
            mut labels,
            then_edges,
            else_edges,
            false_terminal,
            true_terminal,
            ..
        } = self;

        let mut problems: Vec<(usize, Malformed)> = Vec::new();

        // Without any terminal labels, "0" and "1" are the terminals.
        let (false_address, true_address) = match (false_terminal, true_terminal) {
            (None, None) => {
                debug!("no terminal labels, using \"0\" and \"1\"");
                (Some(0), Some(1))
            }
            (f, t) => (f.map(|f| f.value), t.map(|t| t.value)),
        };
        if let (Some(f), Some(t)) = (false_terminal, true_terminal) {
            if f.value == t.value {
                problems.push((f.line.max(t.line), Malformed::AmbiguousTerminal { address: f.value }));
            }
        }

        // A terminal listed as a plain node is still a terminal.
        labels.retain(|&address, _| {
            let terminal = Some(address) == false_address || Some(address) == true_address;
            if terminal {
                debug!("terminal \"{:x}\" also declared as a node", address);
            }
            !terminal
        });

        let resolve = |address: u64| {
            if Some(address) == false_address {
                Some(Child::False)
            } else if Some(address) == true_address {
                Some(Child::True)
            } else if labels.contains_key(&address) {
                Some(Child::Node(address))
            } else {
                None
            }
        };

        for edges in [&then_edges, &else_edges] {
            for (&source, edge) in edges {
                if !labels.contains_key(&source) {
                    problems.push((edge.line, Malformed::UndeclaredSource { address: source }));
                }
                if resolve(edge.value).is_none() {
                    problems.push((
                        edge.line,
                        Malformed::UndeclaredTarget {
                            address: edge.value,
                        },
                    ));
                }
            }
        }

        let mut nodes = BTreeMap::new();
        for (&address, label) in &labels {
            let mut child = |edges: &BTreeMap<u64, Located<u64>>, kind: &'static str| {
                let target = edges.get(&address).map(|edge| edge.value);
                if target.is_none() {
                    problems.push((label.line, Malformed::MissingEdge { kind, address }));
                }
                target.and_then(resolve)
            };
            let then_child = child(&then_edges, "1");
            let else_child = child(&else_edges, "0");
            if let (Some(then_child), Some(else_child)) = (then_child, else_child) {
                nodes.insert(
                    address,
                    DecisionNode {
                        var: label.value,
                        then_child,
                        else_child,
                    },
                );
            }
        }

        if let Some((line, kind)) = problems.into_iter().min_by_key(|(line, _)| *line) {
            return Err(Error::malformed(line, kind));
        }

        debug!(
            "parsed {} variables and {} decision nodes",
            ordering.len(),
            nodes.len()
        );

        Ok(GraphModel {
            ordering,
            nodes,
            false_terminal: false_address,
            true_terminal: true_address,
        })
    }
}

/// Parse a dump held in memory.
pub fn parse_str(text: &str) -> Result<GraphModel> {
    let mut state = ParserState::default();
    for line in text.lines() {
        state.feed(line)?;
    }
    state.finish()
}

/// Parse a dump file line by line.
pub fn parse_file(path: impl AsRef<Path>) -> Result<GraphModel> {
    let path = path.as_ref();
    let file_access = |source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(file_access)?;
    let mut state = ParserState::default();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(file_access)?;
        state.feed(&line)?;
    }
    state.finish()
}

/// Read the list of visible base names, one per non-blank line.
pub fn read_visible_file(path: impl AsRef<Path>) -> Result<VisibleSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(VisibleSet::parse(&text))
}
