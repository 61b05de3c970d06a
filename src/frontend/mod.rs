//! Form-and-table front end over the books API.
//!
//! The server owns every record; `Shelf` only remembers the rows it last
//! rendered and which book, if any, the form is currently editing. Each
//! mutation is followed by a full reload.

use log::debug;

use crate::client::{Client, ClientError};
use crate::datamodel::{BookId, BookPatch};

mod form;
mod table;

pub use form::{BookForm, FormError};
pub use table::{Row, Table};

pub const ADD_LABEL: &str = "Add Book";
pub const UPDATE_LABEL: &str = "Update Book";

#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Form(#[from] FormError),
}

pub struct Shelf {
    client: Client,
    edit_id: Option<BookId>,
    pub form: BookForm,
    rows: Vec<Row>,
}

impl Shelf {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            edit_id: None,
            form: BookForm::default(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn table(&self) -> Table<'_> {
        Table(&self.rows)
    }

    #[cfg(test)]
    pub fn edit_id(&self) -> Option<BookId> {
        self.edit_id
    }

    pub fn submit_label(&self) -> &'static str {
        if self.edit_id.is_some() {
            UPDATE_LABEL
        } else {
            ADD_LABEL
        }
    }

    /// Re-fetches the collection and replaces the rendered rows.
    pub async fn load(&mut self) -> Result<(), ShelfError> {
        let books = self.client.list_books().await?;
        self.rows = books.iter().map(Row::from).collect();
        debug!("rendered {} rows", self.rows.len());
        Ok(())
    }

    /// Puts the form into edit mode for `id`. Returns `false` and leaves the
    /// form untouched when no such book exists.
    pub async fn begin_edit(&mut self, id: BookId) -> Result<bool, ShelfError> {
        let books = self.client.list_books().await?;
        let Some(book) = books.iter().find(|b| b.id == id) else {
            return Ok(false);
        };

        self.form = BookForm::from_book(book);
        self.edit_id = Some(id);
        Ok(true)
    }

    /// Creates or updates depending on edit mode, then resets the form and
    /// reloads. On error the form and edit mode are kept.
    pub async fn submit(&mut self) -> Result<(), ShelfError> {
        let book = self.form.to_new_book()?;

        match self.edit_id {
            Some(id) => {
                self.client
                    .update_book(id, &BookPatch::from(book))
                    .await?;
                self.edit_id = None;
            }
            None => {
                self.client.create_book(&book).await?;
            }
        }

        self.form.reset();
        self.load().await
    }

    pub async fn delete(&mut self, id: BookId) -> Result<(), ShelfError> {
        self.client.delete_book(id).await?;
        self.load().await
    }
}
