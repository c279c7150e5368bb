//! `oriana` - terminal front end for the Oriana support assistant.

mod app;
mod cli;
mod repl;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, Command, SessionArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Chat(args) => {
            let mut app = prepare(&args).await?;
            repl::run(&mut app).await
        }
        Command::Ask { question, session } => {
            let mut app = prepare(&session).await?;
            if let Some(reply) = app.ask(&question).await {
                println!("{}", reply.text);
            }
            Ok(())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn prepare(args: &SessionArgs) -> anyhow::Result<App> {
    let mut app = App::new(args)?;
    for path in &args.ingest {
        let record = app.ingest(path).await?;
        println!("Ingested {} ({} chunks)", record.name, record.chunks_count);
    }
    Ok(app)
}
