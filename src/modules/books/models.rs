use serde::{Deserialize, Serialize};

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Position-derived identifier, starting at 1
    pub id: u64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

/// Request model for creating a new book. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateBook {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}
