use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

use termchat::core::config::{self, CliOverrides};
use termchat::core::session::SessionStore;
use termchat::core::state::ExitMode;
use termchat::login::{establish_session, prompt_on_terminal};
use termchat::messaging::{HttpMessenger, MessagingClient};
use termchat::tui;

#[derive(Parser)]
#[command(name = "termchat", about = "Tabbed terminal chat client")]
struct Args {
    /// Chat server base URL
    #[arg(short, long)]
    server: Option<String>,

    /// Where the login token is kept between runs
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Ignore any saved login and ask for credentials
    #[arg(long)]
    fresh_login: bool,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {e}, using defaults");
            Default::default()
        }
    };
    let config = config::resolve(
        &file_config,
        &CliOverrides {
            server: args.server,
            session_file: args.session_file,
            fresh_login: args.fresh_login,
        },
    );

    // Initialize file logger - the terminal belongs to the TUI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    info!("termchat starting up against {}", config.server_url);

    let client: Arc<dyn MessagingClient> =
        Arc::new(HttpMessenger::new(config.server_url.clone(), config.request_timeout));
    let store = SessionStore::new(config.session_file.clone());

    let auth = establish_session(client.as_ref(), &store, prompt_on_terminal, config.fresh_login)
        .await?;
    let me = client
        .fetch_user_info(&auth.user_id)
        .await
        .map_err(|e| io::Error::other(format!("could not load your profile: {e}")))?;

    let mode = tui::run(&config, client.clone(), me)?;

    if mode == ExitMode::Logout {
        if let Err(e) = client.logout().await {
            warn!("Logout failed: {}", e);
        }
        if let Err(e) = store.clear() {
            warn!("Could not remove saved session: {}", e);
        }
        println!("Logged out.");
    }
    info!("termchat exiting");
    Ok(())
}
