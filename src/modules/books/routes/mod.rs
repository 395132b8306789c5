use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use bookshelf_http::AppError;

use super::models::{Book, CreateBook};
use super::store::{BookStore, StoreError};

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingField => AppError::validation(err.to_string()),
            StoreError::NotFound => AppError::not_found(err.to_string()),
        }
    }
}

/// State shared by the book handlers.
#[derive(Clone)]
pub struct BooksState {
    pub store: BookStore,
    pub list_on_zero_id: bool,
}

/// Book routes, ungated.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book))
        .with_state(state)
}

async fn list_books(State(state): State<BooksState>) -> Json<Vec<Book>> {
    Json(state.store.list_all().await)
}

async fn get_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid book ID"))?;

    if id == 0 && state.list_on_zero_id {
        return Ok(Json(state.store.list_all().await).into_response());
    }

    let id = u64::try_from(id).map_err(|_| StoreError::NotFound)?;
    let book = state.store.find_by_id(id).await?;
    Ok(Json(book).into_response())
}

async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(new_book) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let book = state.store.append(new_book.title, new_book.author).await?;
    Ok(Json(book))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app(store: BookStore, list_on_zero_id: bool) -> Router {
        router(BooksState {
            store,
            list_on_zero_id,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn fetch(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/books")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn list_returns_seed_books() {
        let (status, body) = send(app(BookStore::seeded(), true), fetch("/books")).await;
        assert_eq!(status, StatusCode::OK);

        let books: Vec<Book> = serde_json::from_slice(&body).unwrap();
        assert_eq!(books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn get_by_id() {
        let (status, body) = send(app(BookStore::seeded(), true), fetch("/books/2")).await;
        assert_eq!(status, StatusCode::OK);

        let book: Book = serde_json::from_slice(&body).unwrap();
        assert_eq!(book.id, 2);
        assert_eq!(book.author, "Jon Bodner");
    }

    #[tokio::test]
    async fn get_missing_and_negative_ids_are_not_found() {
        let store = BookStore::seeded();
        for uri in ["/books/999", "/books/-1"] {
            let (status, body) = send(app(store.clone(), true), fetch(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, b"Book not found");
        }
    }

    #[tokio::test]
    async fn get_non_numeric_id_is_bad_request() {
        let (status, body) = send(app(BookStore::seeded(), true), fetch("/books/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Invalid book ID");
    }

    #[tokio::test]
    async fn zero_id_lists_everything_when_enabled() {
        let store = BookStore::seeded();
        let (_, listed) = send(app(store.clone(), true), fetch("/books")).await;
        let (status, zero) = send(app(store.clone(), true), fetch("/books/0")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(zero, listed);

        let (status, _) = send(app(store, false), fetch("/books/0")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_appends_with_next_id() {
        let store = BookStore::seeded();
        let (status, body) = send(
            app(store.clone(), true),
            post_json(r#"{"title":"T","author":"A"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let book: Book = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            book,
            Book {
                id: 3,
                title: "T".to_string(),
                author: "A".to_string()
            }
        );
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_id() {
        let store = BookStore::seeded();
        let (_, body) = send(
            app(store, true),
            post_json(r#"{"id":42,"title":"T","author":"A"}"#),
        )
        .await;

        let book: Book = serde_json::from_slice(&body).unwrap();
        assert_eq!(book.id, 3);
    }

    #[tokio::test]
    async fn create_with_missing_fields_is_rejected() {
        let store = BookStore::seeded();
        for body in [
            r#"{"title":"","author":"A"}"#,
            r#"{"title":"T","author":""}"#,
            r#"{"title":"T"}"#,
        ] {
            let (status, text) = send(app(store.clone(), true), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(text, b"Please provide a title and an author");
        }
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn create_with_malformed_body_is_rejected() {
        let store = BookStore::seeded();
        let (status, _) = send(app(store.clone(), true), post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let without_content_type = Request::post("/books")
            .body(Body::from(r#"{"title":"T","author":"A"}"#))
            .unwrap();
        let (status, _) = send(app(store.clone(), true), without_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.len().await, 2);
    }
}
