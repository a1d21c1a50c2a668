//! Snippet command handlers.
//!
//! Every handler opens the configured store and runs the connection probe
//! before doing anything else.

use crate::terminal::{render_text, TerminalView};
use anyhow::{bail, Context};
use snipstash_core::render::render_list_html;
use snipstash_core::view::ListView;
use snipstash_core::{open_store, Config, Session, SnippetInput};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Where the code for `add` comes from.
#[derive(Debug)]
pub enum CodeSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl CodeSource {
    pub async fn read(self) -> anyhow::Result<String> {
        match self {
            CodeSource::Inline(code) => Ok(code),
            CodeSource::File(path) => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
            CodeSource::Stdin => {
                let mut code = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut code)
                    .await
                    .context("Failed to read code from stdin")?;
                Ok(code)
            }
        }
    }
}

/// Open the store and probe it.
async fn connect(config: &Config, assume_yes: bool) -> anyhow::Result<(Session, Arc<TerminalView>)> {
    let store = open_store(config)?;
    let view = Arc::new(TerminalView::new(assume_yes));
    let session = Session::new(store, view.clone(), config.session_options());
    session.probe().await?;
    Ok((session, view))
}

/// `snipstash probe`
pub async fn handle_probe(config: &Config) -> anyhow::Result<()> {
    let (_session, view) = connect(config, false).await?;
    println!("{}", view.connection().label());
    Ok(())
}

/// `snipstash list`
pub async fn handle_list(config: &Config, html: bool) -> anyhow::Result<()> {
    let (_session, view) = connect(config, false).await?;

    let list = view.list();
    if html {
        print!("{}", render_list_html(&list));
    } else {
        print!("{}", render_text(&list));
    }

    if let ListView::Error(message) = list {
        bail!("Failed to load saved items: {message}");
    }
    Ok(())
}

/// `snipstash add`
pub async fn handle_add(config: &Config, date: String, code: CodeSource) -> anyhow::Result<()> {
    let (session, _view) = connect(config, false).await?;
    let code = code.read().await?;

    let id = session.create(&SnippetInput::new(date, code)).await?;
    info!(id = %id, "Saved snippet");
    println!("{id}");
    Ok(())
}

/// `snipstash delete`
pub async fn handle_delete(config: &Config, id: &str, yes: bool) -> anyhow::Result<()> {
    let (session, _view) = connect(config, yes).await?;

    match session.delete(id).await {
        Ok(()) => {
            println!("Deleted {id}");
            Ok(())
        }
        Err(e) if e.is_aborted() => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
