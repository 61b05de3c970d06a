use serde::{Deserialize, Deserializer, Serialize};

pub type BookId = i64;

/// A requested rating that does not fit the stored column.
#[derive(Debug, thiserror::Error)]
#[error("rating {0} does not fit a book record")]
pub struct RatingOutOfRange(pub i64);

/// Narrows a request rating to its stored width.
pub fn narrow_rating(rating: Option<i64>) -> Result<Option<u8>, RatingOutOfRange> {
    rating
        .map(|r| u8::try_from(r).map_err(|_| RatingOutOfRange(r)))
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub rating: Option<u8>,
    pub note: Option<String>,
}

/// Body of `POST /books`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `PUT /books/{id}`.
///
/// Only keys present in the body are written. For the nullable columns the
/// outer `Option` tracks presence and the inner one the value, so `null`
/// clears the column while a missing key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<NewBook> for BookPatch {
    /// A patch that overwrites every column, as the edit form does.
    fn from(book: NewBook) -> Self {
        Self {
            title: Some(book.title),
            author: Some(book.author),
            genre: Some(book.genre),
            rating: Some(book.rating),
            note: Some(book.note),
        }
    }
}

impl Book {
    pub fn apply(&mut self, patch: BookPatch) -> Result<(), RatingOutOfRange> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(rating) = patch.rating {
            self.rating = narrow_rating(rating)?;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
        Ok(())
    }
}
