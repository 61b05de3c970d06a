use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::info;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::datamodel::{Book, BookId, BookPatch, NewBook, RatingOutOfRange, narrow_rating};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    genre TEXT,
    rating INTEGER,
    note TEXT
);";

const SELECT_COLUMNS: &str = "SELECT id, title, author, genre, rating, note FROM books";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock was poisoned")]
    Poisoned,

    #[error(transparent)]
    Rating(#[from] RatingOutOfRange),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite-backed book table. One connection, serialized by a mutex.
pub struct BookStore {
    conn: Mutex<Connection>,
}

impl BookStore {
    /// Opens the database at `path`, where `:memory:` selects a private
    /// in-memory database, and creates the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        info!("opened book store at `{}`", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn list(&self) -> StoreResult<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
        let books = stmt
            .query_map([], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    #[cfg(test)]
    pub fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        let conn = self.conn()?;
        get_with(&conn, id)
    }

    pub fn create(&self, book: NewBook) -> StoreResult<Book> {
        let rating = narrow_rating(book.rating)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO books (title, author, genre, rating, note) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![book.title, book.author, book.genre, rating, book.note],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Book {
            id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            rating,
            note: book.note,
        })
    }

    /// Applies `patch` to the stored row. Returns `None` for an unknown id.
    pub fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Option<Book>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(mut book) = get_with(&tx, id)? else {
            return Ok(None);
        };
        book.apply(patch)?;
        tx.execute(
            "UPDATE books SET title = ?2, author = ?3, genre = ?4, rating = ?5, note = ?6
             WHERE id = ?1",
            params![
                book.id,
                book.title,
                book.author,
                book.genre,
                book.rating,
                book.note
            ],
        )?;
        tx.commit()?;

        Ok(Some(book))
    }

    /// Removes the row. Returns the deleted book, or `None` for an unknown id.
    pub fn delete(&self, id: BookId) -> StoreResult<Option<Book>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(book) = get_with(&tx, id)? else {
            return Ok(None);
        };
        tx.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(Some(book))
    }

    /// Round trip to the database, used by the readiness probes.
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn get_with(conn: &Connection, id: BookId) -> StoreResult<Option<Book>> {
    let book = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        rating: row.get(4)?,
        note: row.get(5)?,
    })
}
