//! Category service

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryDto, CategoryInput},
    repository::CategoriesRepository,
};

#[derive(Clone)]
pub struct CategoriesService {
    categories: Arc<dyn CategoriesRepository>,
}

impl CategoriesService {
    pub fn new(categories: Arc<dyn CategoriesRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryDto>> {
        let categories = self.categories.list().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<CategoryDto>> {
        Ok(self.categories.get_by_id(id).await?.map(CategoryDto::from))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<CategoryDto> {
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
        };
        let created = self.categories.create(&category).await?;
        tracing::info!(category_id = %created.id, "Category created");
        Ok(created.into())
    }

    pub async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Option<CategoryDto>> {
        let category = Category { id, name: input.name };
        Ok(self.categories.update(&category).await?.map(CategoryDto::from))
    }

    /// Deleting an unknown category is a no-op; one that still owns books is refused
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.categories.get_by_id(id).await?.is_none() {
            return Ok(());
        }

        let books = self.categories.count_books(id).await?;
        if books > 0 {
            return Err(AppError::BusinessRule(format!(
                "Category still contains {} book(s).",
                books
            )));
        }

        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
