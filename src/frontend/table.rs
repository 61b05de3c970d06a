use std::fmt::{self, Write as _};

use crate::datamodel::{Book, BookId};

const HEADERS: [&str; 6] = ["#", "Title", "Author", "Genre", "Rating", "Note"];

/// One rendered table row. `id` is what the edit and delete actions target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub rating: String,
    pub note: String,
}

impl From<&Book> for Row {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone().unwrap_or_default(),
            rating: book.rating.map(|r| format!("{r}/5")).unwrap_or_default(),
            note: book.note.clone().unwrap_or_default(),
        }
    }
}

impl Row {
    fn cells(&self) -> [String; 6] {
        [
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.genre.clone(),
            self.rating.clone(),
            self.note.clone(),
        ]
    }
}

/// Plain-text table, columns padded to their widest cell.
pub struct Table<'a>(pub &'a [Row]);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<[String; 6]> = self.0.iter().map(Row::cells).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for cells in &rows {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let headers = HEADERS.map(str::to_owned);
        for cells in std::iter::once(&headers).chain(&rows) {
            let mut line = String::new();
            for (cell, width) in cells.iter().zip(widths) {
                let _ = write!(line, "{cell:<width$}  ");
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
