use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
};
use tracing::error;
use wordsprint::{
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{run_app, CrosstermEventSource},
    ui::TuiTerminal,
};

/// timed word-level typing test for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the words shown, separated by spaces, before the clock runs out. Backspace on an empty word reopens the previous one. Esc or Ctrl-C ends the test early."
)]
pub struct Cli {
    /// number of seconds to run test
    #[clap(short = 's', long)]
    number_of_secs: Option<u64>,

    /// custom prompt to use (words separated by whitespace)
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// milliseconds between input polls
    #[clap(long)]
    poll_ms: Option<u64>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay command line flags on stored defaults
    fn apply(&self, mut config: Config) -> Config {
        if let Some(secs) = self.number_of_secs {
            config.time_limit_secs = secs;
        }
        if let Some(prompt) = &self.prompt {
            config.words = prompt.clone();
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let settings = match config.validate() {
        Ok(settings) => settings,
        Err(err) => Cli::command()
            .error(ErrorKind::ValueValidation, err)
            .exit(),
    };

    if cli.save_config {
        store.save(&config)?;
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(err) => {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
            return Err(err.into());
        }
    };

    let mut tui = TuiTerminal::new(terminal, CrosstermEventSource::new());
    let outcome = run_app(&mut tui, settings);

    disable_raw_mode()?;
    execute!(tui.terminal_mut().backend_mut(), LeaveAlternateScreen)?;
    tui.terminal_mut().show_cursor()?;

    if let Err(err) = &outcome {
        error!(%err, "session_failed");
    }
    outcome?;

    Ok(())
}
