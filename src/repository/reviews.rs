//! Reviews repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::review::Review};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Review>>;
    async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<Review>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;
    async fn create(&self, review: &Review) -> AppResult<Review>;
    async fn update(&self, review: &Review) -> AppResult<Option<Review>>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgReviewsRepository {
    pool: Pool<Postgres>,
}

impl PgReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewsRepository for PgReviewsRepository {
    async fn list(&self) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY review_date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE book_id = $1 ORDER BY review_date DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, review: &Review) -> AppResult<Review> {
        let row = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, book_id, user_id, rating, comment, review_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(review.book_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.review_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, review: &Review) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET rating = $2, comment = $3 WHERE id = $1 RETURNING *",
        )
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
