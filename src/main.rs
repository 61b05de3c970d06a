use anyhow::Context as _;
use clap::Parser;
use log::info;

use client::Client;
use config::{ApiArgs, Cli, Command, OptionalFields};
use frontend::{BookForm, Shelf, ShelfError};
use server::{AppState, BookStore, make_app};

mod client;
mod config;
mod datamodel;
mod frontend;
mod server;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Serve { bind, database } => serve(bind, database).await,
        Command::List { api } => {
            let mut shelf = shelf(api);
            shelf.load().await?;
            info!("listed {} books", shelf.rows().len());
            print!("{}", shelf.table());
            Ok(())
        }
        Command::Add {
            api,
            title,
            author,
            fields,
        } => {
            let mut shelf = shelf(api);
            shelf.form = BookForm {
                title,
                author,
                ..BookForm::default()
            };
            fill(&mut shelf.form, fields);
            shelf.submit().await?;
            print!("{}", shelf.table());
            Ok(())
        }
        Command::Edit {
            api,
            id,
            title,
            author,
            fields,
        } => {
            let mut shelf = shelf(api);
            if !shelf.begin_edit(id).await? {
                anyhow::bail!("no book with id {id}");
            }
            info!("{} #{id}", shelf.submit_label());
            if let Some(title) = title {
                shelf.form.title = title;
            }
            if let Some(author) = author {
                shelf.form.author = author;
            }
            fill(&mut shelf.form, fields);
            shelf.submit().await?;
            print!("{}", shelf.table());
            Ok(())
        }
        Command::Delete { api, id } => {
            let mut shelf = shelf(api);
            match shelf.delete(id).await {
                Err(ShelfError::Client(err)) if err.is_not_found() => {
                    anyhow::bail!("no book with id {id}")
                }
                res => res?,
            }
            print!("{}", shelf.table());
            Ok(())
        }
    }
}

async fn serve(bind: std::net::SocketAddr, database: std::path::PathBuf) -> anyhow::Result<()> {
    let store = BookStore::open(&database)
        .with_context(|| format!("failed to open database `{}`", database.display()))?;
    let app = make_app(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn shelf(api: ApiArgs) -> Shelf {
    Shelf::new(Client::new(api.url))
}

fn fill(form: &mut BookForm, fields: OptionalFields) {
    if let Some(genre) = fields.genre {
        form.genre = genre;
    }
    if let Some(rating) = fields.rating {
        form.rating = rating;
    }
    if let Some(note) = fields.note {
        form.note = note;
    }
}
