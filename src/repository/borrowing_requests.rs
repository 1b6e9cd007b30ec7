//! Book borrowing requests repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrowing_request::{BorrowingRequest, BorrowingRequestDetail, BorrowingRequestRow},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingRequestsRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<BorrowingRequest>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BorrowingRequest>>;
    /// Requests of `requestor_id` dated within the given UTC calendar month
    async fn count_for_month(&self, requestor_id: Uuid, year: i32, month: u32) -> AppResult<i64>;
    async fn create(&self, request: &BorrowingRequest) -> AppResult<BorrowingRequest>;
    /// Replaces the header fields and the detail lines; false when the id is unknown
    async fn update(&self, request: &BorrowingRequest) -> AppResult<bool>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Half-open `[start, end)` range covering a calendar month in UTC
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single()?;
    Some((start, end))
}

#[derive(Clone)]
pub struct PgBorrowingRequestsRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowingRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn details_for(&self, request_ids: &[Uuid]) -> AppResult<Vec<BorrowingRequestDetail>> {
        let details = sqlx::query_as::<_, BorrowingRequestDetail>(
            r#"
            SELECT * FROM book_borrowing_request_details
            WHERE request_id = ANY($1)
            ORDER BY borrowed_date, book_id
            "#,
        )
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(details)
    }

    async fn insert_details(
        tx: &mut Transaction<'_, Postgres>,
        details: &[BorrowingRequestDetail],
    ) -> AppResult<()> {
        for detail in details {
            sqlx::query(
                r#"
                INSERT INTO book_borrowing_request_details
                    (request_id, book_id, borrowed_date, return_date)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(detail.request_id)
            .bind(detail.book_id)
            .bind(detail.borrowed_date)
            .bind(detail.return_date)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BorrowingRequestsRepository for PgBorrowingRequestsRepository {
    async fn list(&self) -> AppResult<Vec<BorrowingRequest>> {
        let rows = sqlx::query_as::<_, BorrowingRequestRow>(
            "SELECT * FROM book_borrowing_requests ORDER BY request_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<Uuid, Vec<BorrowingRequestDetail>> = HashMap::new();
        for detail in self.details_for(&ids).await? {
            by_request.entry(detail.request_id).or_default().push(detail);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let details = by_request.remove(&row.id).unwrap_or_default();
                BorrowingRequest::from_row(row, details)
            })
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BorrowingRequest>> {
        let row = sqlx::query_as::<_, BorrowingRequestRow>(
            "SELECT * FROM book_borrowing_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let details = self.details_for(&[row.id]).await?;
                Ok(Some(BorrowingRequest::from_row(row, details)))
            }
            None => Ok(None),
        }
    }

    async fn count_for_month(&self, requestor_id: Uuid, year: i32, month: u32) -> AppResult<i64> {
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| AppError::Internal(format!("Invalid month {}-{}", year, month)))?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_borrowing_requests
            WHERE requestor_id = $1 AND request_date >= $2 AND request_date < $3
            "#,
        )
        .bind(requestor_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn create(&self, request: &BorrowingRequest) -> AppResult<BorrowingRequest> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BorrowingRequestRow>(
            r#"
            INSERT INTO book_borrowing_requests (id, requestor_id, request_date, approver_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.requestor_id)
        .bind(request.request_date)
        .bind(request.approver_id)
        .bind(request.status)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_details(&mut tx, &request.details).await?;
        tx.commit().await?;

        Ok(BorrowingRequest::from_row(row, request.details.clone()))
    }

    async fn update(&self, request: &BorrowingRequest) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE book_borrowing_requests
            SET requestor_id = $2, request_date = $3, approver_id = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(request.id)
        .bind(request.requestor_id)
        .bind(request.request_date)
        .bind(request.approver_id)
        .bind(request.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM book_borrowing_request_details WHERE request_id = $1")
            .bind(request.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_details(&mut tx, &request.details).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // Detail lines go with ON DELETE CASCADE
        sqlx::query("DELETE FROM book_borrowing_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
