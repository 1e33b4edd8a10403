use std::io;
use std::path::PathBuf;

/// Structural problem found on a line that matched one of the dump shapes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    #[error("node \"{address:x}\" declared before any rank")]
    NoRankContext { address: u64 },

    #[error("address \"{text}\" does not fit into 64 bits")]
    BadAddress { text: String },

    #[error("{terminal} terminal redeclared as \"{address:x}\" (was \"{previous:x}\")")]
    ConflictingTerminal {
        terminal: &'static str,
        address: u64,
        previous: u64,
    },

    #[error("address \"{address:x}\" is declared as both FALSE and TRUE")]
    AmbiguousTerminal { address: u64 },

    #[error("node \"{address:x}\" redeclared under another rank")]
    NodeRedeclared { address: u64 },

    #[error("second {kind}-edge from \"{source_address:x}\" (already points to \"{previous:x}\")")]
    ConflictingEdge {
        kind: &'static str,
        source_address: u64,
        previous: u64,
    },

    #[error("edge from undeclared node \"{address:x}\"")]
    UndeclaredSource { address: u64 },

    #[error("edge to undeclared node \"{address:x}\"")]
    UndeclaredTarget { address: u64 },

    #[error("node \"{address:x}\" has no {kind}-edge")]
    MissingEdge { kind: &'static str, address: u64 },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {kind}")]
    MalformedLine { line: usize, kind: Malformed },

    #[error("the graph has no decision nodes")]
    EmptyGraph,

    #[error("node \"{address:x}\" is part of a cycle")]
    CyclicGraph { address: u64 },

    #[error("edge to node \"{address:x}\" which is not in the graph")]
    UnknownNode { address: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(line: usize, kind: Malformed) -> Self {
        Error::MalformedLine { line, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::malformed(7, Malformed::UndeclaredTarget { address: 0x1f3 });
        assert_eq!(err.to_string(), "line 7: edge to undeclared node \"1f3\"");

        let err = Error::malformed(
            3,
            Malformed::MissingEdge {
                kind: "0",
                address: 0xa2,
            },
        );
        assert_eq!(err.to_string(), "line 3: node \"a2\" has no 0-edge");

        assert_eq!(Error::EmptyGraph.to_string(), "the graph has no decision nodes");
    }

    #[test]
    fn test_file_access_keeps_source() {
        let err = Error::FileAccess {
            path: PathBuf::from("missing.dot"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "cannot read missing.dot: not found");
        assert!(std::error::Error::source(&err).is_some());
    }
}
