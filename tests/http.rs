//! HTTP binding integration tests.
//!
//! Starts an axum server and exercises it with reqwest.
#![cfg(feature = "http")]

mod support;

use std::sync::Arc;

use crud_rust::http;
use crud_rust::{
    CompositeKeyEndpoint, CrudEndpoint, CrudService, FilterCriteria, FilterableFields,
    InMemoryRepository, NestedCrudEndpoint, PageDefaults,
};
use serde_json::{json, Value};
use support::{
    author_service, book_repository, chapter_service, review_service, seed_books, Author,
    AuthorDto, AuthorMapper, AuthorRequest, Book, BookEndpoint, BookMapper, BookRepository,
    Chapter, ChapterDto, ChapterMapper, ChapterRequest, Review, ReviewDto, ReviewMapper,
    ReviewRequest,
};

/// Books at `/books`, their reviews at `/books/:id/reviews`, chapters at
/// `/books/:id/chapters` and authors at `/authors`.
fn app(books: BookRepository) -> axum::Router {
    let book_endpoint: BookEndpoint = CrudEndpoint::new(
        CrudService::new(books.clone())
            .filter(FilterCriteria::like(FilterableFields::single("title")))
            .unwrap(),
        BookMapper,
    )
    .with_page_defaults(PageDefaults {
        default_size: 2,
        ..PageDefaults::default()
    });

    let reviews: NestedCrudEndpoint<
        Book,
        Review,
        InMemoryRepository<Review>,
        BookRepository,
        ReviewMapper,
        ReviewRequest,
        ReviewDto,
    > = NestedCrudEndpoint::new(review_service(books.clone()), ReviewMapper)
    .with_path_names("id", "reviewId");

    let chapters: CompositeKeyEndpoint<
        Book,
        Chapter,
        InMemoryRepository<Chapter>,
        BookRepository,
        ChapterMapper,
        ChapterRequest,
        ChapterDto,
        u32,
    > = CompositeKeyEndpoint::new(chapter_service(books), ChapterMapper)
    .with_path_names("id", "number");

    let authors: CrudEndpoint<Author, _, _, AuthorRequest, AuthorDto> =
        CrudEndpoint::new(author_service(), AuthorMapper);

    axum::Router::new()
        .nest("/books", http::router(Arc::new(book_endpoint)))
        .nest("/books/:id/reviews", http::nested_router(Arc::new(reviews)))
        .nest("/books/:id/chapters", http::nested_router(Arc::new(chapters)))
        .nest("/authors", http::router(Arc::new(authors)))
}

/// Bind to port 0 and return the actual address.
async fn start_server(books: BookRepository) -> String {
    let app = app(books);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn seeded(count: usize) -> BookRepository {
    let books = book_repository();
    seed_books(&books, count);
    books
}

#[tokio::test]
async fn create_and_get_book() {
    let base = start_server(book_repository()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books"))
        .json(&json!({ "title": "Dune", "isbn": "978-0441172719", "pages": 412, "published": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Dune");

    let resp = client.get(format!("{base}/books/1")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, created);
}

#[tokio::test]
async fn list_all_with_search() {
    let base = start_server(seeded(12)).await;
    let client = reqwest::Client::new();

    let all: Vec<Value> = client
        .get(format!("{base}/books/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 12);

    let found: Vec<Value> = client
        .get(format!("{base}/books/all?search=book%201"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 4);
}

#[tokio::test]
async fn page_uses_defaults_and_params() {
    let base = start_server(seeded(5)).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["content"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalElements"], 5);
    assert_eq!(body["last"], false);

    let body: Value = client
        .get(format!("{base}/books?page=1&size=3&sort=id,desc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<_> = body["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(body["last"], true);
}

#[tokio::test]
async fn update_patch_delete() {
    let base = start_server(seeded(1)).await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/books/1"))
        .json(&json!({ "title": "Renamed", "isbn": "x", "pages": 10, "published": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Renamed");

    let resp = client
        .patch(format!("{base}/books/1"))
        .json(&json!({ "pages": 250, "isbn": "ignored" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pages"], 250);
    assert_eq!(body["isbn"], "x");

    let resp = client.delete(format!("{base}/books/1")).send().await.unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client.get(format!("{base}/books/1")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
    assert_eq!(body["message"], "Book (ID: 1) not found");
}

#[tokio::test]
async fn errors_render_with_status() {
    let base = start_server(seeded(1)).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/books/abc")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let resp = client
        .patch(format!("{base}/books/1"))
        .json(&json!({ "pages": "many" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_PATCH");

    let resp = client
        .post(format!("{base}/authors"))
        .json(&json!({ "first_name": "John", "last_name": "Doe" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .patch(format!("{base}/authors/1"))
        .json(&json!({ "first_name": "Jack" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn nested_reviews() {
    let base = start_server(seeded(2)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books/1/reviews"))
        .json(&json!({ "rating": 4, "body": "Solid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["book_id"], 1);
    let id = created["id"].as_u64().unwrap();

    let list: Vec<Value> = client
        .get(format!("{base}/books/1/reviews"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);

    let resp = client
        .get(format!("{base}/books/2/reviews/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .patch(format!("{base}/books/1/reviews/{id}"))
        .json(&json!({ "rating": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["rating"], 5);
    assert_eq!(body["body"], "Solid");

    let resp = client
        .delete(format!("{base}/books/1/reviews/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .post(format!("{base}/books/9/reviews"))
        .json(&json!({ "rating": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Book (ID: 9) not found");
}

#[tokio::test]
async fn composite_chapters() {
    let base = start_server(seeded(1)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books/1/chapters"))
        .json(&json!({ "number": 3, "title": "Arrakis" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], "1-3");

    let resp = client
        .put(format!("{base}/books/1/chapters/3"))
        .json(&json!({ "number": 3, "title": "Arrakis, again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Arrakis, again");

    let resp = client
        .patch(format!("{base}/books/1/chapters/3"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    let resp = client
        .delete(format!("{base}/books/1/chapters/3"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{base}/books/1/chapters/3"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn page_number_out_of_range_is_bad_request() {
    let base = start_server(seeded(3)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/books?page={}", usize::MAX))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let resp = client
        .get(format!("{base}/books?page=1000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["currentPage"], 1001);
    assert_eq!(body["last"], true);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_updates_to_one_book_all_complete() {
    let base = start_server(seeded(1)).await;
    let client = reqwest::Client::new();

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let client = client.clone();
            let url = format!("{base}/books/1");
            tokio::spawn(async move {
                client
                    .put(url)
                    .json(&json!({ "title": format!("Edition {n}"), "isbn": "x", "pages": n, "published": false }))
                    .send()
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }

    let body: Value = client
        .get(format!("{base}/books/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["title"].as_str().unwrap().starts_with("Edition "));
}
