//! Book borrowing requests: monthly quota, request size and approval workflow

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::{
    config::BorrowingConfig,
    error::{AppError, AppResult},
    models::borrowing_request::{
        BorrowingRequest, BorrowingRequestDetail, BorrowingRequestDto, CreateBorrowingRequest,
        RequestStatus,
    },
    repository::{borrowing_requests::month_bounds, BorrowingRequestsRepository},
};

#[derive(Clone)]
pub struct BorrowingRequestsService {
    requests: Arc<dyn BorrowingRequestsRepository>,
    config: BorrowingConfig,
}

impl BorrowingRequestsService {
    pub fn new(requests: Arc<dyn BorrowingRequestsRepository>, config: BorrowingConfig) -> Self {
        Self { requests, config }
    }

    pub async fn list(&self) -> AppResult<Vec<BorrowingRequestDto>> {
        let requests = self.requests.list().await?;
        Ok(requests.into_iter().map(BorrowingRequestDto::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BorrowingRequestDto>> {
        Ok(self
            .requests
            .get_by_id(id)
            .await?
            .map(BorrowingRequestDto::from))
    }

    /// Submit a new request on behalf of `caller_id` (or the requestor named in the body)
    pub async fn add(
        &self,
        caller_id: Uuid,
        input: CreateBorrowingRequest,
    ) -> AppResult<BorrowingRequestDto> {
        let now = Utc::now();
        let requestor_id = input.requestor_id.unwrap_or(caller_id);

        let this_month = self
            .requests
            .count_for_month(requestor_id, now.year(), now.month())
            .await?;
        if this_month >= self.config.max_requests_per_month {
            tracing::warn!(
                requestor_id = %requestor_id,
                count = this_month,
                "Monthly borrowing request quota reached"
            );
            return Err(AppError::BusinessRule(format!(
                "You can only make {} borrowing requests per month.",
                self.config.max_requests_per_month
            )));
        }

        let request = input.into_request(Uuid::new_v4(), requestor_id, now);
        self.check_request_date(&request, now)?;
        self.check_details(&request.details)?;

        let created = self.requests.create(&request).await?;
        tracing::info!(
            request_id = %created.id,
            requestor_id = %created.requestor_id,
            books = created.details.len(),
            "Borrowing request submitted"
        );
        Ok(created.into())
    }

    /// Replace the requestor and detail lines of a request.
    /// Request date, status and approver stay as stored.
    pub async fn update(&self, id: Uuid, dto: BorrowingRequestDto) -> AppResult<()> {
        if dto.id != id {
            return Err(AppError::BadRequest(
                "Request id in the path does not match the body".to_string(),
            ));
        }

        let revision = BorrowingRequest::from(dto);
        self.check_details(&revision.details)?;

        let not_found = || AppError::NotFound(format!("Borrowing request {} not found", id));
        let mut request = self.requests.get_by_id(id).await?.ok_or_else(not_found)?;
        request.revise(revision);

        if !self.requests.update(&request).await? {
            return Err(not_found());
        }

        tracing::info!(request_id = %id, "Borrowing request updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.requests.delete(id).await
    }

    pub async fn approve(&self, id: Uuid, approver_id: Uuid) -> AppResult<()> {
        self.decide(id, RequestStatus::Approved, approver_id).await
    }

    pub async fn reject(&self, id: Uuid, approver_id: Uuid) -> AppResult<()> {
        self.decide(id, RequestStatus::Rejected, approver_id).await
    }

    async fn decide(&self, id: Uuid, status: RequestStatus, approver_id: Uuid) -> AppResult<()> {
        let Some(mut request) = self.requests.get_by_id(id).await? else {
            tracing::debug!(request_id = %id, "No borrowing request to decide on");
            return Ok(());
        };

        request.decide(status, approver_id);
        self.requests.update(&request).await?;
        tracing::info!(
            request_id = %id,
            approver_id = %approver_id,
            status = %status,
            "Borrowing request decided"
        );
        Ok(())
    }

    /// The request date must lie in the UTC month of `now`
    fn check_request_date(&self, request: &BorrowingRequest, now: DateTime<Utc>) -> AppResult<()> {
        let (start, end) = month_bounds(now.year(), now.month())
            .ok_or_else(|| AppError::Internal("Invalid current month".to_string()))?;

        if request.request_date < start || request.request_date >= end {
            return Err(AppError::BusinessRule(
                "The request date must fall in the current month.".to_string(),
            ));
        }
        Ok(())
    }

    fn check_details(&self, details: &[BorrowingRequestDetail]) -> AppResult<()> {
        if details.len() > self.config.max_books_per_request {
            return Err(AppError::BusinessRule(format!(
                "You can only borrow up to {} books per request.",
                self.config.max_books_per_request
            )));
        }

        let mut seen = HashSet::with_capacity(details.len());
        if let Some(duplicate) = details.iter().find(|d| !seen.insert(d.book_id)) {
            return Err(AppError::BusinessRule(format!(
                "Book {} appears more than once in the request.",
                duplicate.book_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::{
        models::borrowing_request::{BorrowingRequestDetailDto, CreateBorrowingRequestDetail},
        repository::borrowing_requests::MockBorrowingRequestsRepository,
    };

    fn service(repo: MockBorrowingRequestsRepository) -> BorrowingRequestsService {
        BorrowingRequestsService::new(Arc::new(repo), BorrowingConfig::default())
    }

    fn new_request(books: usize) -> CreateBorrowingRequest {
        CreateBorrowingRequest {
            requestor_id: None,
            request_date: None,
            details: (0..books)
                .map(|_| CreateBorrowingRequestDetail {
                    book_id: Uuid::new_v4(),
                    borrowed_date: None,
                    return_date: None,
                })
                .collect(),
        }
    }

    fn stored_request(id: Uuid) -> BorrowingRequest {
        BorrowingRequest {
            id,
            requestor_id: Uuid::new_v4(),
            request_date: Utc::now(),
            approver_id: None,
            status: RequestStatus::Waiting,
            details: vec![],
        }
    }

    #[tokio::test]
    async fn fourth_request_in_a_month_is_refused() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month().returning(|_, _, _| Ok(3));
        repo.expect_create().never();

        let result = service(repo).add(Uuid::new_v4(), new_request(1)).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn quota_is_counted_for_the_current_month() {
        let caller = Uuid::new_v4();
        let now = Utc::now();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month()
            .withf(move |requestor, year, month| {
                *requestor == caller && *year == now.year() && *month == now.month()
            })
            .times(1)
            .returning(|_, _, _| Ok(2));
        repo.expect_create().times(1).returning(|r| Ok(r.clone()));

        let created = service(repo).add(caller, new_request(1)).await.unwrap();
        assert_eq!(created.requestor_id, caller);
    }

    #[tokio::test]
    async fn more_than_five_books_are_refused() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month().returning(|_, _, _| Ok(0));
        repo.expect_create().never();

        let result = service(repo).add(Uuid::new_v4(), new_request(6)).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn same_book_twice_is_refused() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month().returning(|_, _, _| Ok(0));
        repo.expect_create().never();

        let mut input = new_request(2);
        input.details[1].book_id = input.details[0].book_id;

        let result = service(repo).add(Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn valid_request_is_stored_waiting() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month().returning(|_, _, _| Ok(0));
        repo.expect_create()
            .withf(|r: &BorrowingRequest| {
                r.status == RequestStatus::Waiting
                    && r.approver_id.is_none()
                    && r.details.len() == 5
                    && r.details.iter().all(|d| d.request_id == r.id)
            })
            .times(1)
            .returning(|r| Ok(r.clone()));

        let created = service(repo).add(Uuid::new_v4(), new_request(5)).await.unwrap();
        assert_eq!(created.details.len(), 5);
        assert_eq!(created.status, RequestStatus::Waiting);
    }

    #[tokio::test]
    async fn approve_records_status_and_approver() {
        let id = Uuid::new_v4();
        let approver = Uuid::new_v4();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(stored_request(id))));
        repo.expect_update()
            .withf(move |r: &BorrowingRequest| {
                r.id == id && r.status == RequestStatus::Approved && r.approver_id == Some(approver)
            })
            .times(1)
            .returning(|_| Ok(true));

        service(repo).approve(id, approver).await.unwrap();
    }

    #[tokio::test]
    async fn reject_records_status_and_approver() {
        let id = Uuid::new_v4();
        let approver = Uuid::new_v4();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(stored_request(id))));
        repo.expect_update()
            .withf(move |r: &BorrowingRequest| {
                r.status == RequestStatus::Rejected && r.approver_id == Some(approver)
            })
            .times(1)
            .returning(|_| Ok(true));

        service(repo).reject(id, approver).await.unwrap();
    }

    #[tokio::test]
    async fn deciding_on_a_missing_request_does_nothing() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        service(repo)
            .approve(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_requires_matching_ids() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_update().never();

        let dto = BorrowingRequestDto::from(stored_request(Uuid::new_v4()));
        let result = service(repo).update(Uuid::new_v4(), dto).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn update_of_unknown_request_is_not_found() {
        let id = Uuid::new_v4();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let mut dto = BorrowingRequestDto::from(stored_request(id));
        dto.details.push(BorrowingRequestDetailDto {
            book_id: Uuid::new_v4(),
            borrowed_date: Utc::now(),
            return_date: None,
        });

        let result = service(repo).update(id, dto).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    fn dto_with_books(id: Uuid, books: Vec<Uuid>) -> BorrowingRequestDto {
        let mut dto = BorrowingRequestDto::from(stored_request(id));
        dto.details = books
            .into_iter()
            .map(|book_id| BorrowingRequestDetailDto {
                book_id,
                borrowed_date: Utc::now(),
                return_date: None,
            })
            .collect();
        dto
    }

    #[tokio::test]
    async fn update_with_six_books_is_refused() {
        let id = Uuid::new_v4();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_update().never();

        let books = (0..6).map(|_| Uuid::new_v4()).collect();
        let result = service(repo).update(id, dto_with_books(id, books)).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn update_with_duplicate_book_is_refused() {
        let id = Uuid::new_v4();
        let book = Uuid::new_v4();
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_update().never();

        let result = service(repo)
            .update(id, dto_with_books(id, vec![book, Uuid::new_v4(), book]))
            .await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn update_cannot_approve_or_move_the_request() {
        let id = Uuid::new_v4();
        let stored = stored_request(id);
        let stored_date = stored.request_date;

        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update()
            .withf(move |r: &BorrowingRequest| {
                r.status == RequestStatus::Waiting
                    && r.approver_id.is_none()
                    && r.request_date == stored_date
                    && r.details.len() == 2
            })
            .times(1)
            .returning(|_| Ok(true));

        let mut dto = dto_with_books(id, vec![Uuid::new_v4(), Uuid::new_v4()]);
        dto.status = RequestStatus::Approved;
        dto.approver_id = Some(Uuid::new_v4());
        dto.request_date = stored_date - Duration::days(45);

        service(repo).update(id, dto).await.unwrap();
    }

    #[tokio::test]
    async fn backdated_request_is_refused() {
        let mut repo = MockBorrowingRequestsRepository::new();
        repo.expect_count_for_month().returning(|_, _, _| Ok(0));
        repo.expect_create().never();

        let mut input = new_request(1);
        input.request_date = Some(Utc::now() - Duration::days(40));

        let result = service(repo).add(Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }
}
