//! REPL (Read-Eval-Print Loop) for an interactive story session

use crate::output::report::{AssessmentReport, ExportFormat};
use crate::{ProgressReporter, SimpleProgress};
use colored::Colorize;
use lexiquest_application::{ProgressNotifier, RunTurnInput, RunTurnUseCase, TurnOutput};
use lexiquest_domain::SessionState;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use uuid::Uuid;

/// Fresh session id of the form `LQ-chat_<8 hex>`.
pub fn new_session_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("LQ-chat_{}", &hex[..8])
}

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Reset,
    Report,
    Export(PathBuf),
    Session,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        match name {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/reset" => Command::Reset,
            "/report" => Command::Report,
            "/export" if !arg.is_empty() => Command::Export(PathBuf::from(arg)),
            "/session" => Command::Session,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Interactive story REPL
pub struct StoryRepl {
    use_case: RunTurnUseCase,
    session_id: String,
    show_progress: bool,
    plain_progress: bool,
}

impl StoryRepl {
    /// Create a new StoryRepl bound to `session_id`
    pub fn new(use_case: RunTurnUseCase, session_id: impl Into<String>) -> Self {
        Self {
            use_case,
            session_id: session_id.into(),
            show_progress: true,
            plain_progress: false,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Use plain progress lines instead of a spinner
    pub fn with_plain_progress(mut self, plain: bool) -> Self {
        self.plain_progress = plain;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("lexiquest").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome().await;

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    self.process_input(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              LexiQuest - Story              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", self.session_id.cyan());

        match self.use_case.load(&self.session_id).await {
            Ok(Some(state)) => Self::print_resume(&state),
            Ok(None) => println!("Say hello to begin your story."),
            Err(e) => eprintln!("{} {}", "Could not load session:".red(), e),
        }

        println!();
        Self::print_help();
    }

    fn print_resume(state: &SessionState) {
        println!(
            "Resuming after {} exchange(s), {} item(s) assessed.",
            state.exchanges, state.assessment.score_summary.total_items
        );
        if let Some(last) = state.last_narration() {
            println!();
            println!("{}", last);
        }
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /report           - Show assessment results");
        println!("  /export <path>    - Save results as CSV (or JSON for *.json)");
        println!("  /reset            - Start a new story");
        println!("  /session          - Show the session id");
        println!("  /quit, /exit, /q  - Exit");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, line: &str) -> bool {
        match Command::parse(line) {
            Command::Quit => {
                println!("Bye!");
                true
            }
            Command::Help => {
                println!();
                Self::print_help();
                false
            }
            Command::Reset => {
                let previous = std::mem::replace(&mut self.session_id, new_session_id());
                println!(
                    "Started a new story ({}). The previous session {} is kept.",
                    self.session_id.cyan(),
                    previous
                );
                false
            }
            Command::Session => {
                println!("{}", self.session_id);
                false
            }
            Command::Report => {
                if let Some(state) = self.load_state().await {
                    println!();
                    print!("{}", AssessmentReport::new(&state.assessment).render());
                }
                false
            }
            Command::Export(path) => {
                if let Some(state) = self.load_state().await {
                    match AssessmentReport::new(&state.assessment).export(&path) {
                        Ok(format) => {
                            let kind = match format {
                                ExportFormat::Csv => "CSV",
                                ExportFormat::Json => "JSON",
                            };
                            println!("Wrote {} report to {}", kind, path.display());
                        }
                        Err(e) => eprintln!("{} {}", "Export failed:".red(), e),
                    }
                }
                false
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn load_state(&self) -> Option<SessionState> {
        match self.use_case.load(&self.session_id).await {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                println!("Nothing to report yet; the story has not started.");
                None
            }
            Err(e) => {
                eprintln!("{} {}", "Could not load session:".red(), e);
                None
            }
        }
    }

    async fn process_input(&self, text: &str) {
        println!();

        let input = RunTurnInput::new(self.session_id.clone(), text);

        let result = if self.show_progress {
            let progress: Box<dyn ProgressNotifier> = if self.plain_progress {
                Box::new(SimpleProgress)
            } else {
                Box::new(ProgressReporter::new())
            };
            self.use_case
                .execute_with_progress(input, progress.as_ref())
                .await
        } else {
            self.use_case.execute(input).await
        };

        match result {
            Ok(output) => Self::print_output(&output),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }

    fn print_output(output: &TurnOutput) {
        let text = output.reply_text();
        if output.refused {
            println!("{}", text.yellow());
        } else {
            println!("{}", text);
        }
        if output.ended {
            println!();
            println!("{}", "Use /report to see how you did.".dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_id_format() {
        let id = new_session_id();
        let hex = id.strip_prefix("LQ-chat_").unwrap();
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_session_id(), id);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/reset"), Command::Reset);
        assert_eq!(Command::parse("/report"), Command::Report);
        assert_eq!(
            Command::parse("/export  results/run1.csv"),
            Command::Export(PathBuf::from("results/run1.csv"))
        );
        assert_eq!(
            Command::parse("/export"),
            Command::Unknown("/export".to_string())
        );
        assert_eq!(
            Command::parse("/dance"),
            Command::Unknown("/dance".to_string())
        );
    }
}
