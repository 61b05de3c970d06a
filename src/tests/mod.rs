use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::client::Client;
use crate::datamodel::{Book, BookPatch, NewBook};
use crate::frontend::{ADD_LABEL, BookForm, Shelf, ShelfError, UPDATE_LABEL};


use testserver::Server;

fn hesse(title: &str) -> NewBook {
    NewBook {
        title: title.into(),
        author: "Hermann Hesse".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let server = Server::start();
    let http = reqwest::Client::new();

    let res = http
        .post(server.url("/books"))
        .json(&json!({ "title": "Test", "author": "Author" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Book = res.json().await.unwrap();
    assert_eq!(created.title, "Test");
    assert_eq!(created.genre, None);

    let books: Vec<Book> = http
        .get(server.url("/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books, [created.clone()]);

    let res = http
        .put(server.url(&format!("/books/{}", created.id)))
        .json(&json!({ "title": "Updated" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Book updated" }));

    let res = http
        .delete(server.url(&format!("/books/{}", created.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let books: Vec<Book> = http
        .get(server.url("/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(books.iter().all(|b| b.id != created.id));
}

#[tokio::test]
async fn unknown_ids_answer_not_found() {
    let server = Server::start();
    let http = reqwest::Client::new();

    let res = http
        .put(server.url("/books/999"))
        .json(&json!({ "title": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Not found" }));

    let res = http.delete(server.url("/books/999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let client = Client::new(server.url("/"));
    let err = client.delete_book(999).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn writes_are_validated() {
    let server = Server::start();
    let http = reqwest::Client::new();

    let res = http
        .post(server.url("/books"))
        .json(&json!({ "title": "  ", "author": "Author" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = http
        .post(server.url("/books"))
        .json(&json!({ "title": "Test", "author": "Author", "rating": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    for rating in [0, 300, -1] {
        let res = http
            .post(server.url("/books"))
            .json(&json!({ "title": "Test", "author": "Author", "rating": rating }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{rating}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(
            body["error"],
            format!("`rating` must be between 1 and 5, got {rating}")
        );
    }

    let res = http
        .post(server.url("/books"))
        .json(&json!({ "author": "Author" }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
}

#[tokio::test]
async fn updates_are_validated() {
    let server = Server::start();
    let client = Client::new(server.url("/"));
    let book = client.create_book(&hesse("Rosshalde")).await.unwrap();

    let http = reqwest::Client::new();
    let url = server.url(&format!("/books/{}", book.id));
    let invalid = [
        json!({ "title": "" }),
        json!({ "author": "   " }),
        json!({ "rating": 6 }),
        json!({ "rating": 300 }),
        json!({ "rating": -1 }),
    ];
    for body in invalid {
        let res = http.put(url.clone()).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let answer: Value = res.json().await.unwrap();
        assert!(answer["error"].is_string(), "{body}");
    }

    assert_eq!(client.list_books().await.unwrap(), [book]);
}

#[tokio::test]
async fn metrics_use_the_prometheus_content_type() {
    let server = Server::start();
    let res = reqwest::get(server.url("/metrics")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[reqwest::header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn unmatched_paths_are_counted() {
    let server = Server::start();
    let http = reqwest::Client::new();

    let res = http.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    http.get(server.url("/also/missing")).send().await.unwrap();

    let metrics = http
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains(
        "http_requests_total{endpoint=\"unmatched\",http_status=\"404\",method=\"GET\"} 2"
    ));
    assert!(!metrics.contains("/nope"));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let server = Server::start();
    let client = Client::new(server.url("/"));

    let book = client
        .create_book(&NewBook {
            genre: Some("Novel".into()),
            rating: Some(4),
            note: Some("first edition".into()),
            ..hesse("Siddhartha")
        })
        .await
        .unwrap();

    client
        .update_book(
            book.id,
            &BookPatch {
                rating: Some(Some(5)),
                note: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let books = client.list_books().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Siddhartha");
    assert_eq!(books[0].genre.as_deref(), Some("Novel"));
    assert_eq!(books[0].rating, Some(5));
    assert_eq!(books[0].note, None);
}

#[tokio::test]
async fn probes_and_metrics() {
    let server = Server::start();
    let http = reqwest::Client::new();

    for probe in ["/health", "/livez", "/readyz"] {
        let res = http.get(server.url(probe)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{probe}");
        assert_eq!(res.text().await.unwrap(), "OK");
    }

    http.delete(server.url("/books/1")).send().await.unwrap();
    http.delete(server.url("/books/2")).send().await.unwrap();

    let metrics = http
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains(
        "http_requests_total{endpoint=\"/books/{id}\",http_status=\"404\",method=\"DELETE\"} 2"
    ));
    assert!(metrics.contains(
        "http_requests_total{endpoint=\"/health\",http_status=\"200\",method=\"GET\"} 1"
    ));
}

#[tokio::test]
async fn shelf_submit_creates_then_updates() {
    let server = Server::start();
    let mut shelf = Shelf::new(Client::new(server.url("/")));

    shelf.load().await.unwrap();
    assert!(shelf.rows().is_empty());
    assert_eq!(shelf.submit_label(), ADD_LABEL);

    shelf.form = BookForm {
        title: "Steppenwolf".into(),
        author: "Hermann Hesse".into(),
        rating: "4".into(),
        ..Default::default()
    };
    shelf.submit().await.unwrap();

    assert_eq!(shelf.form, BookForm::default());
    assert_eq!(shelf.rows().len(), 1);
    let row = shelf.rows()[0].clone();
    assert_eq!(row.title, "Steppenwolf");
    assert_eq!(row.rating, "4/5");
    assert_eq!(row.genre, "");

    assert!(shelf.begin_edit(row.id).await.unwrap());
    assert_eq!(shelf.edit_id(), Some(row.id));
    assert_eq!(shelf.submit_label(), UPDATE_LABEL);
    assert_eq!(shelf.form.title, "Steppenwolf");
    assert_eq!(shelf.form.rating, "4");

    shelf.form.note = "read twice".into();
    shelf.submit().await.unwrap();

    assert_eq!(shelf.edit_id(), None);
    assert_eq!(shelf.submit_label(), ADD_LABEL);
    assert_eq!(shelf.form, BookForm::default());
    assert_eq!(shelf.rows().len(), 1);
    assert_eq!(shelf.rows()[0].note, "read twice");
    assert_eq!(shelf.rows()[0].id, row.id);
}

#[tokio::test]
async fn shelf_edit_of_missing_book_is_a_no_op() {
    let server = Server::start();
    let mut shelf = Shelf::new(Client::new(server.url("/")));
    shelf.form.title = "draft".into();

    assert!(!shelf.begin_edit(42).await.unwrap());
    assert_eq!(shelf.edit_id(), None);
    assert_eq!(shelf.form.title, "draft");
}

#[tokio::test]
async fn shelf_delete_reloads_rows() {
    let server = Server::start();
    let client = Client::new(server.url("/"));
    let keep = client.create_book(&hesse("Demian")).await.unwrap();
    let gone = client.create_book(&hesse("Narziss und Goldmund")).await.unwrap();

    let mut shelf = Shelf::new(client);
    shelf.load().await.unwrap();
    assert_eq!(shelf.rows().len(), 2);

    shelf.delete(gone.id).await.unwrap();
    let ids: Vec<_> = shelf.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, [keep.id]);

    let rendered = shelf.table().to_string();
    assert!(rendered.contains("Demian"));
    assert!(!rendered.contains("Narziss"));
}

#[tokio::test]
async fn shelf_surfaces_negative_rating_as_server_error() {
    let server = Server::start();
    let mut shelf = Shelf::new(Client::new(server.url("/")));

    shelf.form = BookForm {
        title: "Peter Camenzind".into(),
        author: "Hermann Hesse".into(),
        rating: "-1".into(),
        ..Default::default()
    };
    match shelf.submit().await {
        Err(ShelfError::Client(err)) => {
            assert!(err.to_string().contains("between 1 and 5"), "{err}");
        }
        other => panic!("expected a server answer, got {other:?}"),
    }
}

#[tokio::test]
async fn shelf_keeps_form_when_submit_fails() {
    let server = Server::start();
    let mut shelf = Shelf::new(Client::new(server.url("/")));

    shelf.form = BookForm {
        title: "Gertrud".into(),
        author: "Hermann Hesse".into(),
        rating: "7".into(),
        ..Default::default()
    };
    assert!(shelf.submit().await.is_err());
    assert_eq!(shelf.form.title, "Gertrud");
    assert!(shelf.rows().is_empty());
}
