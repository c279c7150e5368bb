//! Interactive chat loop.

use std::path::Path;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

use crate::app::App;

const HELP: &str = "\
Commands:
  /ingest <file>  upload a document (admin login required)
  /key <api-key>  set the Gemini API key (admin login required)
  /kb             show knowledge base contents
  /files          list ingested files
  /clear          reset the conversation
  /quit           exit";

/// Run the chat loop until EOF or `/quit`.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    if let Some(welcome) = app.chat().messages().first() {
        println!("{}", welcome.text);
    }
    if !app.is_configured() {
        println!("(API key missing: set GOOGLE_API_KEY or use /key to enable answers)");
    }
    println!("Type /help for commands.\n");

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with("/key") {
            let _ = editor.add_history_entry(line);
        }

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{HELP}"),
            ("/clear", _) => {
                app.clear();
                println!("Conversation cleared.");
            }
            ("/kb", _) => {
                let snapshot = app.knowledge().await;
                println!("{} chunks loaded", snapshot.total_chunks);
                for (file, count) in snapshot.files {
                    println!("  {file}: {count} chunks");
                }
            }
            ("/files", _) => {
                for record in app.files().await {
                    println!(
                        "  {} ({} bytes, {}) - {} chunks",
                        record.name, record.size, record.content_type, record.chunks_count
                    );
                }
            }
            ("/key", "") => println!("usage: /key <api-key>"),
            ("/key", key) => match app.set_api_key(key).await {
                Ok(()) => println!("API key saved."),
                Err(e) => {
                    error!(error = %e, "API key update failed");
                    println!("Could not set API key: {e:#}");
                }
            },
            ("/ingest", "") => println!("usage: /ingest <file>"),
            ("/ingest", path) => match app.ingest(Path::new(path)).await {
                Ok(record) => println!("Ingested {} ({} chunks)", record.name, record.chunks_count),
                Err(e) => {
                    error!(error = %e, "ingestion failed");
                    println!("Upload failed: {e:#}");
                }
            },
            _ => {
                if let Some(reply) = app.ask(line).await {
                    println!("oriana> {}\n", reply.text);
                }
            }
        }
    }

    Ok(())
}
