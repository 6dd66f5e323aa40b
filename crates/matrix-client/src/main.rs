use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use matrix_client::command::{self, Command, HELP};
use matrix_client::render::toast_line;
use matrix_client::toast::{self, ToastFeed};
use matrix_client::{ApiClient, ClientConfig, SessionContext, SessionStore, Shell, WallApi};

/// matrix-wall: terminal client for the Matrix wall board
#[derive(Parser)]
#[command(name = "matrix-wall")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server root, e.g. http://localhost:8001 (overrides MATRIX_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Where the session is kept (overrides MATRIX_SESSION_FILE)
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Path to open first
    #[arg(long, default_value = "/")]
    start: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they never interleave with the screen.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matrix_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().with_overrides(cli.api_url, cli.session_file);

    let api = ApiClient::new(&config.api_url)
        .with_context(|| format!("cannot use API URL '{}'", config.api_url))?;
    info!("Using API at {}", api.base_url());

    let session = SessionContext::load(SessionStore::new(&config.session_file));
    let (toaster, mut feed) = toast::channel();
    let mut shell = Shell::new(api, session, toaster);

    shell
        .handle_interruptible(Command::Go(cli.start), tokio::signal::ctrl_c())
        .await;
    draw(&shell, &mut feed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", shell.route());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        match command {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            command => {
                shell
                    .handle_interruptible(command, tokio::signal::ctrl_c())
                    .await
            }
        }

        draw(&shell, &mut feed);
    }

    println!();
    Ok(())
}

fn draw<A: WallApi>(shell: &Shell<A>, feed: &mut ToastFeed) {
    println!();
    print!("{}", shell.render());
    for toast in feed.drain() {
        println!("{}", toast_line(&toast));
    }
}
