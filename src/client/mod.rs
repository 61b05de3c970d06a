use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;

use crate::datamodel::{Book, BookId, BookPatch, NewBook};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(String),

    #[error("server answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the `/books` resource.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    url: Url,
}

impl Client {
    /// `url` is the service root. A missing trailing slash is added so that
    /// `http://host/api` resolves `books` to `http://host/api/books`.
    pub fn new(mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.url
            .join(path)
            .map_err(|err| ClientError::Url(err.to_string()))
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, ClientError> {
        let res = self.client.get(self.endpoint("books")?).send().await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn create_book(&self, book: &NewBook) -> Result<Book, ClientError> {
        let res = self
            .client
            .post(self.endpoint("books")?)
            .json(book)
            .send()
            .await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<(), ClientError> {
        let res = self
            .client
            .put(self.endpoint(&format!("books/{id}"))?)
            .json(patch)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }

    pub async fn delete_book(&self, id: BookId) -> Result<(), ClientError> {
        let res = self
            .client
            .delete(self.endpoint(&format!("books/{id}"))?)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Status { status, message })
}
