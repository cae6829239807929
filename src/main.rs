use clap::Parser;
use env_logger::Env;
use libquizzical::session::QuizSession;
use libquizzical::trivia::{
    category_name, CustomizeSelection, Difficulty, OpenTdbClient, DEFAULT_API_URL,
    DEFAULT_CATEGORY,
};
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

mod cli;
#[cfg(feature = "gui")]
mod gui;
mod libquizzical;

#[derive(Parser, Debug)]
#[command(name = "Quizzical")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "error")]
    log_level: String,
    /// Category preselected on the customize screen.
    #[arg(long, default_value_t = DEFAULT_CATEGORY)]
    category: u32,
    /// Difficulty preselected on the customize screen.
    #[arg(long)]
    difficulty: Option<Difficulty>,
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    /// HTTP timeout in seconds.
    #[arg(long, default_value = "10")]
    timeout: u64,
    /// Use the terminal even when the window frontend is available.
    #[arg(long)]
    cli: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[cfg(feature = "gui")]
    #[error("cannot start window: {0}")]
    Gui(#[from] eframe::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();
    debug!("[Setup] {:?}", args);

    let category = match category_name(args.category) {
        Some(_) => args.category,
        None => {
            warn!(
                "[Setup] Unknown category {}, using {}",
                args.category, DEFAULT_CATEGORY
            );
            DEFAULT_CATEGORY
        }
    };
    let session = QuizSession::with_selection(CustomizeSelection {
        category,
        difficulty: args.difficulty,
    });
    let source = OpenTdbClient::new(args.api_url, Duration::from_secs(args.timeout))?;

    cfg_if::cfg_if! {
        if #[cfg(feature = "gui")] {
            if args.cli {
                cli::cli_loop(&source, session)
            } else {
                gui::init_gui(std::sync::Arc::new(source), session)
            }
        } else {
            if args.cli {
                debug!("[Setup] Terminal frontend is the only one built in");
            }
            cli::cli_loop(&source, session)
        }
    }
}
