//! Book reviews service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, ReviewDto, UpdateReview},
    repository::ReviewsRepository,
};

#[derive(Clone)]
pub struct ReviewsService {
    reviews: Arc<dyn ReviewsRepository>,
}

impl ReviewsService {
    pub fn new(reviews: Arc<dyn ReviewsRepository>) -> Self {
        Self { reviews }
    }

    pub async fn list(&self) -> AppResult<Vec<ReviewDto>> {
        let reviews = self.reviews.list().await?;
        Ok(reviews.into_iter().map(ReviewDto::from).collect())
    }

    pub async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<ReviewDto>> {
        let reviews = self.reviews.list_by_book(book_id).await?;
        Ok(reviews.into_iter().map(ReviewDto::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ReviewDto>> {
        Ok(self.reviews.get_by_id(id).await?.map(ReviewDto::from))
    }

    /// The review is dated now and attributed to `author_id` unless the request names a user
    pub async fn create(&self, author_id: Uuid, input: CreateReview) -> AppResult<ReviewDto> {
        let review = Review {
            id: Uuid::new_v4(),
            book_id: input.book_id,
            user_id: input.user_id.unwrap_or(author_id),
            rating: input.rating,
            comment: input.comment,
            review_date: Utc::now(),
        };

        let created = self.reviews.create(&review).await?;
        tracing::info!(review_id = %created.id, book_id = %created.book_id, "Review created");
        Ok(created.into())
    }

    pub async fn update(&self, id: Uuid, input: UpdateReview) -> AppResult<Option<ReviewDto>> {
        let Some(mut review) = self.reviews.get_by_id(id).await? else {
            return Ok(None);
        };

        review.apply(input);
        Ok(self.reviews.update(&review).await?.map(ReviewDto::from))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.reviews.delete(id).await
    }
}
