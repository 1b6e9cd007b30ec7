//! Book catalog service

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDto, BookInput},
    repository::BooksRepository,
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BooksRepository>,
}

impl BooksService {
    pub fn new(books: Arc<dyn BooksRepository>) -> Self {
        Self { books }
    }

    pub async fn list(&self) -> AppResult<Vec<BookDto>> {
        let books = self.books.list().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookDto>> {
        Ok(self.books.get_by_id(id).await?.map(BookDto::from))
    }

    pub async fn create(&self, input: BookInput) -> AppResult<BookDto> {
        let book = input.into_book(Uuid::new_v4());
        let created = self.books.create(&book).await?;
        tracing::info!(book_id = %created.id, "Book created");
        Ok(created.into())
    }

    /// Returns `None` when the book does not exist
    pub async fn update(&self, id: Uuid, input: BookInput) -> AppResult<Option<BookDto>> {
        let Some(mut book) = self.books.get_by_id(id).await? else {
            return Ok(None);
        };

        book.apply(input);
        Ok(self.books.update(&book).await?.map(BookDto::from))
    }

    /// A book that is currently lent out cannot be deleted
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let book = self
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        if !book.is_available {
            tracing::warn!(book_id = %id, "Refusing to delete a borrowed book");
            return Err(AppError::BusinessRule(
                "Cannot delete a book that has been borrowed.".to_string(),
            ));
        }

        self.books.delete(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::book::Book, repository::books::MockBooksRepository};

    fn book(id: Uuid, is_available: bool) -> Book {
        Book {
            id,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            is_available,
            category_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn list_maps_every_book() {
        let mut repo = MockBooksRepository::new();
        repo.expect_list()
            .returning(|| Ok(vec![book(Uuid::new_v4(), true), book(Uuid::new_v4(), false)]));

        let books = BooksService::new(Arc::new(repo)).list().await.unwrap();
        assert_eq!(books.len(), 2);
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_defaults_availability() {
        let mut repo = MockBooksRepository::new();
        repo.expect_create()
            .withf(|b: &Book| !b.id.is_nil() && b.is_available && b.title == "Dune")
            .times(1)
            .returning(|b| Ok(b.clone()));

        let created = BooksService::new(Arc::new(repo))
            .create(BookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                is_available: None,
                category_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(created.is_available);
    }

    #[tokio::test]
    async fn update_of_missing_book_returns_none() {
        let mut repo = MockBooksRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let input = BookInput {
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            is_available: Some(true),
            category_id: Uuid::new_v4(),
        };
        let result = BooksService::new(Arc::new(repo))
            .update(Uuid::new_v4(), input)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_applies_the_input() {
        let id = Uuid::new_v4();
        let mut repo = MockBooksRepository::new();
        repo.expect_get_by_id().returning(move |_| Ok(Some(book(id, true))));
        repo.expect_update()
            .withf(|b: &Book| b.title == "Children of Dune")
            .returning(|b| Ok(Some(b.clone())));

        let updated = BooksService::new(Arc::new(repo))
            .update(
                id,
                BookInput {
                    title: "Children of Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    is_available: None,
                    category_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.title, "Children of Dune");
    }

    #[tokio::test]
    async fn deleting_a_borrowed_book_fails() {
        let id = Uuid::new_v4();
        let mut repo = MockBooksRepository::new();
        repo.expect_get_by_id().returning(move |_| Ok(Some(book(id, false))));
        repo.expect_delete().never();

        let result = BooksService::new(Arc::new(repo)).delete(id).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn deleting_an_available_book_succeeds() {
        let id = Uuid::new_v4();
        let mut repo = MockBooksRepository::new();
        repo.expect_get_by_id().returning(move |_| Ok(Some(book(id, true))));
        repo.expect_delete()
            .withf(move |deleted| *deleted == id)
            .times(1)
            .returning(|_| Ok(()));

        BooksService::new(Arc::new(repo)).delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_missing_book_is_not_found() {
        let mut repo = MockBooksRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let result = BooksService::new(Arc::new(repo)).delete(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
