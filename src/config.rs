use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about = "Personal bookshelf: REST service and table client", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookshelf serve --database books.db
    bookshelf add --title Siddhartha --author 'Hermann Hesse' --rating 5
    bookshelf edit 3 --note 'lent to Anna'
    bookshelf list")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the books HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "BOOKSHELF_BIND", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,

        /// SQLite database file, or `:memory:`
        #[arg(long, env = "BOOKSHELF_DATABASE", default_value = "bookshelf.db")]
        database: PathBuf,
    },

    /// Print every book as a table
    List {
        #[command(flatten)]
        api: ApiArgs,
    },

    /// Add a new book
    Add {
        #[command(flatten)]
        api: ApiArgs,

        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        #[command(flatten)]
        fields: OptionalFields,
    },

    /// Edit an existing book; fields not given keep their value
    Edit {
        #[command(flatten)]
        api: ApiArgs,

        /// Id of the book to edit
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[command(flatten)]
        fields: OptionalFields,
    },

    /// Delete a book
    Delete {
        #[command(flatten)]
        api: ApiArgs,

        /// Id of the book to delete
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Base URL of the books service
    #[arg(long = "api", env = "BOOKSHELF_API", default_value = "http://127.0.0.1:5000/")]
    pub url: Url,
}

#[derive(Args, Debug, Default)]
pub struct OptionalFields {
    #[arg(long)]
    pub genre: Option<String>,

    /// Rating from 1 to 5
    #[arg(long)]
    pub rating: Option<String>,

    #[arg(long)]
    pub note: Option<String>,
}
