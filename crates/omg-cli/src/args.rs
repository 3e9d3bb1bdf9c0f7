use clap::{Parser, Subcommand, ValueEnum};

use omg_core::config::{CoreConfig, MergePolicy};

#[derive(Parser, Debug, Clone)]
#[command(name = "omg", version, about = "OpenMetaGraph CLI")]
pub struct Cli {
    /// Emit JSON output on stdout (and JSON log lines on stderr).
    #[arg(long, global = true)]
    pub json: bool,

    /// Store root directory.
    #[arg(long, global = true, default_value = ".omg")]
    pub store_root: String,

    /// Log filter, e.g. `info` or `omg_query=debug`. Falls back to RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    /// What to do when merged schemas define a key differently.
    #[arg(long, global = true, value_enum, default_value_t = MergeArg::Reject)]
    pub merge_policy: MergeArg,

    /// Maximum alias nesting followed during resolution.
    #[arg(long, global = true, default_value_t = 32)]
    pub max_alias_depth: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeArg {
    Reject,
    LastWins,
}

impl Cli {
    pub fn core_config(&self) -> CoreConfig {
        let mut cfg = CoreConfig::default();
        cfg.merge.policy = match self.merge_policy {
            MergeArg::Reject => MergePolicy::Reject,
            MergeArg::LastWins => MergePolicy::LastWins,
        };
        cfg.limits.max_alias_depth = self.max_alias_depth;
        cfg
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a schema from a JSON file of per-kind key lists.
    PutSchema {
        /// Path to a JSON file: {name, strings, numbers, files, nodes}.
        input: String,
    },

    /// Create an alias pointing at schema or alias addresses.
    PutAlias {
        #[arg(long)]
        name: String,
        /// Target addresses (`ipfs://` prefixes accepted).
        #[arg(required = true)]
        schemas: Vec<String>,
    },

    /// Materialize and store a document from a nested JSON payload.
    CreateDocument {
        /// Schema or alias addresses the payload must satisfy.
        #[arg(long = "schema", required = true)]
        schemas: Vec<String>,
        /// Path to the JSON payload.
        input: String,
    },

    /// Read a document through the typed surface.
    Get {
        address: String,
        #[arg(long = "schema", required = true)]
        schemas: Vec<String>,
        /// Field selection, e.g. "title inner { data }". Defaults to everything.
        #[arg(long)]
        select: Option<String>,
    },

    /// Print the compiled types for a schema set.
    Types {
        #[arg(long = "schema", required = true)]
        schemas: Vec<String>,
    },

    /// Print a stored resource as canonical JSON.
    Cat { address: String },

    /// Run an operation envelope ({"op": ...}) from a JSON file.
    Exec {
        #[arg(long = "schema")]
        schemas: Vec<String>,
        input: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_with_selection() {
        let cli = Cli::parse_from([
            "omg", "--json", "get", "abc", "--schema", "s1", "--schema", "ipfs://s2", "--select",
            "title inner { data }",
        ]);
        assert!(cli.json);
        let Command::Get { address, schemas, select } = cli.command else {
            panic!("expected get");
        };
        assert_eq!(address, "abc");
        assert_eq!(schemas, vec!["s1", "ipfs://s2"]);
        assert_eq!(select.as_deref(), Some("title inner { data }"));
    }

    #[test]
    fn merge_policy_flag_reaches_config() {
        let cli = Cli::parse_from(["omg", "--merge-policy", "last-wins", "types", "--schema", "s"]);
        assert_eq!(cli.core_config().merge.policy, MergePolicy::LastWins);
    }
}
