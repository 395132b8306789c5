use std::sync::Arc;

use tokio::sync::RwLock;

use super::models::Book;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Please provide a title and an author")]
    MissingField,

    #[error("Book not found")]
    NotFound,
}

/// Append-only, insertion-ordered book collection shared between handlers.
#[derive(Clone, Default)]
pub struct BookStore {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the two catalogue seed books.
    pub fn seeded() -> Self {
        Self {
            books: Arc::new(RwLock::new(vec![
                Book {
                    id: 1,
                    title: "The Go Programming Language".to_string(),
                    author: "Alan A. A. Donovan".to_string(),
                },
                Book {
                    id: 2,
                    title: "Learning Go".to_string(),
                    author: "Jon Bodner".to_string(),
                },
            ])),
        }
    }

    pub async fn list_all(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Book, StoreError> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Validate and append a book, assigning `id = len + 1`.
    pub async fn append(
        &self,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Book, StoreError> {
        let (title, author) = (title.into(), author.into());
        if title.is_empty() || author.is_empty() {
            return Err(StoreError::MissingField);
        }

        let mut books = self.books.write().await;
        let book = Book {
            id: books.len() as u64 + 1,
            title,
            author,
        };
        books.push(book.clone());

        tracing::info!(id = book.id, title = %book.title, "book added");
        Ok(book)
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn seeded_store_lists_in_insertion_order() {
        let store = BookStore::seeded();
        let books = store.list_all().await;

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, 1);
        assert_eq!(books[1].id, 2);
        assert_eq!(books[0].title, "The Go Programming Language");
    }

    #[tokio::test]
    async fn append_assigns_next_id() {
        let store = BookStore::seeded();
        let book = store.append("T", "A").await.unwrap();

        assert_eq!(book.id, 3);
        assert_eq!(store.list_all().await.last(), Some(&book));
        assert_eq!(store.find_by_id(3).await.unwrap(), book);
    }

    #[tokio::test]
    async fn append_rejects_empty_fields_without_mutating() {
        let store = BookStore::seeded();

        assert_eq!(store.append("", "A").await, Err(StoreError::MissingField));
        assert_eq!(store.append("T", "").await, Err(StoreError::MissingField));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_books() {
        let store = BookStore::seeded();
        assert_eq!(store.find_by_id(999).await, Err(StoreError::NotFound));
        assert_eq!(store.find_by_id(0).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn empty_store_starts_at_one() {
        let store = BookStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.append("T", "A").await.unwrap().id, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_ids_dense_and_unique() {
        let store = BookStore::seeded();

        let handles: Vec<_> = (0..64)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.append(format!("title {n}"), "author").await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ids: BTreeSet<u64> = store.list_all().await.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 66);
        assert_eq!(ids, (1..=66).collect::<BTreeSet<u64>>());
    }
}
