use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "codequery",
    version,
    about = "Structural and semantic queries over an audited codebase",
    after_help = "NOTE: The index is built by the extraction pipeline and read here as-is. \
                  Dependency and dead-code queries additionally need the graph store \
                  (graphs.db); without it they report 'unavailable' rather than empty results."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find symbol definitions by exact name
    Symbol {
        /// Symbol name (case-sensitive)
        name: String,
        /// Restrict to one symbol kind (function, class, ...)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Find who calls a symbol, transitively up to a depth
    Callers {
        /// Symbol name
        symbol: String,
        /// Traversal depth (1-5)
        #[arg(short, long, default_value = "1")]
        depth: u32,
    },

    /// Find what a symbol calls
    Callees {
        /// Symbol name (substring-matched against recorded caller tokens)
        symbol: String,
    },

    /// Show direct import dependencies of a file.
    ///
    /// Requires the graph store; reports it unavailable otherwise.
    Deps {
        /// File path (substring match)
        file: String,
        /// Which side to show: incoming, outgoing, or both
        #[arg(short, long, default_value = "both")]
        direction: String,
    },

    /// Show variables a function reads and writes
    Dataflow {
        /// Function name
        function: String,
    },

    /// Trace a variable through assignment def-use chains
    Trace {
        /// Variable name
        variable: String,
        /// Starting file (substring match)
        #[arg(short, long)]
        file: String,
        /// Traversal depth (1-5)
        #[arg(short, long, default_value = "3")]
        depth: u32,
    },

    /// Track a function's returned variables into assignments elsewhere
    Taint {
        /// Function name
        function: String,
    },

    /// Report API endpoints and the controls guarding them
    Coverage {
        /// Optional route filter (substring match)
        route: Option<String>,
    },

    /// Detect unreachable modules and symbols.
    ///
    /// Builds the import graph from the graph store, finds entry points via
    /// naming conventions, registration markers, framework components and
    /// test files, then reports everything unreachable. Connected dead
    /// modules are grouped into zombie clusters.
    Deadcode {
        /// Restrict analysis to sources matching this substring
        #[arg(long)]
        path_filter: Option<String>,
        /// Also report uncalled symbols within live modules
        #[arg(long)]
        symbols: bool,
    },

    /// Show index statistics
    Stats,
}
