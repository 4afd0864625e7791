//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "enlink",
    version,
    author = "neur0map",
    about = "Link named entities in text to knowledge base articles",
    long_about = "enlink extracts named entities from text with a hosted language model (or takes \
                  them precomputed), resolves the link-worthy ones against Wikipedia and rewrites \
                  the text with markdown links."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/enlink/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite text with links for its named entities
    Enrich {
        /// Text to enrich (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// JSON file with precomputed mentions ({"person": [...], ...});
        /// skips the language model
        #[arg(short, long, value_name = "JSON")]
        mentions: Option<PathBuf>,

        /// Comma-separated labels to link (overrides the configured whitelist)
        #[arg(short, long, value_name = "LABELS")]
        whitelist: Option<String>,

        /// Print the enriched text and per-mention outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract named entities and print them as JSON
    Extract {
        /// Text to analyze (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Resolve a single mention to its canonical reference
    Resolve {
        /// Mention to look up
        mention: String,
    },

    /// List recognized entity labels
    Labels,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_enrich() {
        let cli = Cli::try_parse_from([
            "enlink",
            "enrich",
            "In Germany, in 1440",
            "--mentions",
            "m.json",
            "--whitelist",
            "gpe,person",
        ])
        .unwrap();

        match cli.command {
            Commands::Enrich {
                text,
                mentions,
                whitelist,
                json,
                ..
            } => {
                assert_eq!(text.as_deref(), Some("In Germany, in 1440"));
                assert_eq!(mentions, Some(PathBuf::from("m.json")));
                assert_eq!(whitelist.as_deref(), Some("gpe,person"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Cli::try_parse_from(["enlink", "extract", "text", "--file", "in.txt"]);
        assert!(result.is_err());
    }
}
