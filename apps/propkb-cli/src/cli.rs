use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "propkb", about = "Search a knowledge base of past proposals")]
pub struct Cli {
    /// Directory of past proposals (overrides knowledge_base.directory)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Use the hashing embedder instead of loading a model
    #[arg(long, global = true)]
    pub fake_embeddings: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and index the corpus, then report what was found
    Ingest,
    /// Hybrid (dense + sparse) search
    Search(QueryArgs),
    /// Two-hop search that refines the query with the best first-hop hits
    MultiHop(QueryArgs),
    /// List section names, most common first
    Sections {
        /// Only show this many names
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print every section with the given name
    Section {
        name: String,
    },
    /// Prices quoted in the commercial sections of the corpus
    Prices,
    /// Split an RFP into sections and list its requirements, deliverables,
    /// deadlines and evaluation weights
    Analyze {
        file: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
pub struct QueryArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results (defaults to retrieval.default_k)
    #[arg(short, long)]
    pub k: Option<usize>,
}

impl QueryArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_global_flags() {
        let cli = Cli::try_parse_from(["propkb", "search", "cloud", "migration", "-k", "3", "--dir", "/tmp/p", "--fake-embeddings"])
            .expect("parse");
        assert!(cli.fake_embeddings);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/p")));
        let Command::Search(args) = cli.command else { panic!("expected search") };
        assert_eq!(args.text(), "cloud migration");
        assert_eq!(args.k, Some(3));
    }

    #[test]
    fn multi_hop_and_section_names() {
        let cli = Cli::try_parse_from(["propkb", "multi-hop", "support"]).expect("parse");
        assert!(matches!(cli.command, Command::MultiHop(_)));
        let cli = Cli::try_parse_from(["propkb", "section", "Scope"]).expect("parse");
        assert!(matches!(cli.command, Command::Section { name } if name == "Scope"));
        assert!(Cli::try_parse_from(["propkb", "search"]).is_err());
    }

    #[test]
    fn analyze_takes_a_file() {
        let cli = Cli::try_parse_from(["propkb", "analyze", "rfp.txt"]).expect("parse");
        assert!(matches!(cli.command, Command::Analyze { file } if file == PathBuf::from("rfp.txt")));
        assert!(Cli::try_parse_from(["propkb", "analyze"]).is_err());
    }
}
