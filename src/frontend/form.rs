use std::num::ParseIntError;

use crate::datamodel::{Book, NewBook};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("rating `{value}` is not a number: {source}")]
    Rating {
        value: String,
        source: ParseIntError,
    },
}

/// The raw text of the book form, one string per input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub rating: String,
    pub note: String,
}

impl BookForm {
    /// Fills every input from `book`; missing values become empty text.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone().unwrap_or_default(),
            rating: book.rating.map(|r| r.to_string()).unwrap_or_default(),
            note: book.note.clone().unwrap_or_default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Converts the inputs into a request body. Range and presence checks
    /// are left to the server.
    pub fn to_new_book(&self) -> Result<NewBook, FormError> {
        let rating = match self.rating.trim() {
            "" => None,
            value => Some(value.parse::<i64>().map_err(|source| FormError::Rating {
                value: value.to_owned(),
                source,
            })?),
        };

        Ok(NewBook {
            title: self.title.trim().to_owned(),
            author: self.author.trim().to_owned(),
            genre: optional(&self.genre),
            rating,
            note: optional(&self.note),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}
