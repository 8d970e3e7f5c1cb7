//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for lexiquest
#[derive(Parser, Debug)]
#[command(name = "lexiquest")]
#[command(author, version, about = "Co-create a story while playing vocabulary challenges")]
#[command(long_about = r#"
LexiQuest tells a story together with you. Between story turns it asks short
word challenges ("which two of these three words go together, and why?") and
scores your answers.

Configuration files are loaded from (in priority order):
1. LEXIQUEST_* environment variables
2. --config <path>        Explicit config file
3. ./lexiquest.toml       Project-level config
4. ~/.config/lexiquest/config.toml   Global config

Example:
  lexiquest
  lexiquest --session LQ-chat_1a2b3c4d
  lexiquest -m llama3.2 --ephemeral
"#)]
pub struct Cli {
    /// Resume (or start) the session with this id
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Use this model for every role
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Keep sessions in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Directory for session checkpoints
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Print plain progress lines instead of a spinner
    #[arg(long)]
    pub no_spinner: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "lexiquest",
            "-vv",
            "--session",
            "LQ-chat_1a2b3c4d",
            "--ephemeral",
            "-m",
            "gemma3",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.session.as_deref(), Some("LQ-chat_1a2b3c4d"));
        assert_eq!(cli.model.as_deref(), Some("gemma3"));
        assert!(cli.ephemeral);
        assert!(!cli.quiet);
    }
}
