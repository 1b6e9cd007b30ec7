//! Book model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// False while the book is lent out
    pub is_available: bool,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub is_available: bool,
    pub category_id: Uuid,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            is_available: book.is_available,
            category_id: book.category_id,
        }
    }
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    /// Defaults to true
    pub is_available: Option<bool>,
    pub category_id: Uuid,
}

impl BookInput {
    pub fn into_book(self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            is_available: self.is_available.unwrap_or(true),
            category_id: self.category_id,
        }
    }
}

impl Book {
    pub fn apply(&mut self, input: BookInput) {
        self.title = input.title;
        self.author = input.author;
        if let Some(is_available) = input.is_available {
            self.is_available = is_available;
        }
        self.category_id = input.category_id;
    }
}
