//! Book borrowing request model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Approval state of a borrowing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    #[default]
    Waiting,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Waiting => "Waiting",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Waiting" => Ok(RequestStatus::Waiting),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("Unknown request status: {}", other)),
        }
    }
}

impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Request header row (detail lines are loaded separately)
#[derive(Debug, Clone, FromRow)]
pub struct BorrowingRequestRow {
    pub id: Uuid,
    pub requestor_id: Uuid,
    pub request_date: DateTime<Utc>,
    pub approver_id: Option<Uuid>,
    pub status: RequestStatus,
}

/// One book of a request, keyed by (request_id, book_id)
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BorrowingRequestDetail {
    pub request_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// A borrowing request with its detail lines
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowingRequest {
    pub id: Uuid,
    pub requestor_id: Uuid,
    pub request_date: DateTime<Utc>,
    pub approver_id: Option<Uuid>,
    pub status: RequestStatus,
    pub details: Vec<BorrowingRequestDetail>,
}

impl BorrowingRequest {
    pub fn from_row(row: BorrowingRequestRow, details: Vec<BorrowingRequestDetail>) -> Self {
        Self {
            id: row.id,
            requestor_id: row.requestor_id,
            request_date: row.request_date,
            approver_id: row.approver_id,
            status: row.status,
            details,
        }
    }

    /// Take the requestor and detail lines of `revision`, keeping date and decision
    pub fn revise(&mut self, revision: BorrowingRequest) {
        let request_id = self.id;
        self.requestor_id = revision.requestor_id;
        self.details = revision
            .details
            .into_iter()
            .map(|d| BorrowingRequestDetail { request_id, ..d })
            .collect();
    }

    /// Record a decision taken by `approver_id`
    pub fn decide(&mut self, status: RequestStatus, approver_id: Uuid) {
        self.status = status;
        self.approver_id = Some(approver_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BorrowingRequestDetailDto {
    pub book_id: Uuid,
    pub borrowed_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BorrowingRequestDto {
    pub id: Uuid,
    pub requestor_id: Uuid,
    pub request_date: DateTime<Utc>,
    pub approver_id: Option<Uuid>,
    pub status: RequestStatus,
    #[serde(default)]
    pub details: Vec<BorrowingRequestDetailDto>,
}

impl From<BorrowingRequestDetail> for BorrowingRequestDetailDto {
    fn from(detail: BorrowingRequestDetail) -> Self {
        Self {
            book_id: detail.book_id,
            borrowed_date: detail.borrowed_date,
            return_date: detail.return_date,
        }
    }
}

impl From<BorrowingRequest> for BorrowingRequestDto {
    fn from(request: BorrowingRequest) -> Self {
        Self {
            id: request.id,
            requestor_id: request.requestor_id,
            request_date: request.request_date,
            approver_id: request.approver_id,
            status: request.status,
            details: request.details.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<BorrowingRequestDto> for BorrowingRequest {
    fn from(dto: BorrowingRequestDto) -> Self {
        let request_id = dto.id;
        Self {
            id: dto.id,
            requestor_id: dto.requestor_id,
            request_date: dto.request_date,
            approver_id: dto.approver_id,
            status: dto.status,
            details: dto
                .details
                .into_iter()
                .map(|d| BorrowingRequestDetail {
                    request_id,
                    book_id: d.book_id,
                    borrowed_date: d.borrowed_date,
                    return_date: d.return_date,
                })
                .collect(),
        }
    }
}

/// Detail line of a new request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrowingRequestDetail {
    pub book_id: Uuid,
    /// Defaults to the request date
    pub borrowed_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Create borrowing request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrowingRequest {
    /// Defaults to the authenticated user
    pub requestor_id: Option<Uuid>,
    /// Defaults to now; must fall in the current month
    pub request_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Vec<CreateBorrowingRequestDetail>,
}

impl CreateBorrowingRequest {
    pub fn into_request(self, id: Uuid, requestor_id: Uuid, now: DateTime<Utc>) -> BorrowingRequest {
        let request_date = self.request_date.unwrap_or(now);
        BorrowingRequest {
            id,
            requestor_id,
            request_date,
            approver_id: None,
            status: RequestStatus::Waiting,
            details: self
                .details
                .into_iter()
                .map(|d| BorrowingRequestDetail {
                    request_id: id,
                    book_id: d.book_id,
                    borrowed_date: d.borrowed_date.unwrap_or(request_date),
                    return_date: d.return_date,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_defaults() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let requestor = Uuid::new_v4();
        let book = Uuid::new_v4();

        let request = CreateBorrowingRequest {
            requestor_id: None,
            request_date: None,
            details: vec![CreateBorrowingRequestDetail {
                book_id: book,
                borrowed_date: None,
                return_date: None,
            }],
        }
        .into_request(id, requestor, now);

        assert_eq!(request.status, RequestStatus::Waiting);
        assert_eq!(request.request_date, now);
        assert_eq!(request.approver_id, None);
        assert_eq!(request.details[0].request_id, id);
        assert_eq!(request.details[0].borrowed_date, now);
    }

    #[test]
    fn revision_keeps_the_decision() {
        let id = Uuid::new_v4();
        let approver = Uuid::new_v4();
        let requested = Utc::now();
        let mut stored = BorrowingRequest {
            id,
            requestor_id: Uuid::new_v4(),
            request_date: requested,
            approver_id: None,
            status: RequestStatus::Waiting,
            details: vec![],
        };
        stored.decide(RequestStatus::Rejected, approver);

        let new_requestor = Uuid::new_v4();
        stored.revise(BorrowingRequest {
            id,
            requestor_id: new_requestor,
            request_date: requested - chrono::Duration::days(60),
            approver_id: Some(Uuid::new_v4()),
            status: RequestStatus::Approved,
            details: vec![BorrowingRequestDetail {
                request_id: Uuid::new_v4(),
                book_id: Uuid::new_v4(),
                borrowed_date: requested,
                return_date: None,
            }],
        });

        assert_eq!(stored.requestor_id, new_requestor);
        assert_eq!(stored.request_date, requested);
        assert_eq!(stored.status, RequestStatus::Rejected);
        assert_eq!(stored.approver_id, Some(approver));
        assert_eq!(stored.details[0].request_id, id);
    }

    #[test]
    fn status_parses_from_text() {
        assert_eq!("Approved".parse::<RequestStatus>().unwrap(), RequestStatus::Approved);
        assert!("approved".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn dto_details_take_the_request_id() {
        let id = Uuid::new_v4();
        let dto = BorrowingRequestDto {
            id,
            requestor_id: Uuid::new_v4(),
            request_date: Utc::now(),
            approver_id: None,
            status: RequestStatus::Waiting,
            details: vec![BorrowingRequestDetailDto {
                book_id: Uuid::new_v4(),
                borrowed_date: Utc::now(),
                return_date: None,
            }],
        };

        let request = BorrowingRequest::from(dto);
        assert!(request.details.iter().all(|d| d.request_id == id));
    }
}
