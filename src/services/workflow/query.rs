use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::action::parse_status_filter;
use crate::entities::workflow_document::WorkflowKind;
use crate::errors::ServiceError;
use crate::repositories::{DocumentFilter, DocumentSort, PageRequest, SortField, SortOrder};

/// Query string of the workflow list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDocumentsQuery {
    /// Matches documents whose source or destination shop is this store
    pub shop_id: Option<String>,
    /// `NEW`, `APPROVED` or `REJECTED`; inventories also take `open`, `finished`, `cancelled`
    pub status: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`, inclusive
    pub date_from: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`, inclusive
    pub date_to: Option<String>,
    /// 1-based page number
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// `created_at`, `updated_at`, `name` or `status`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
}

/// Page size bounds taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl PageLimits {
    pub fn page_request(&self, page: Option<u64>, limit: Option<u64>) -> Result<PageRequest, ServiceError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(ServiceError::ValidationError("page must be at least 1".into()));
        }
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(ServiceError::ValidationError("limit must be at least 1".into()));
        }
        Ok(PageRequest::new(page, limit.min(self.max_limit)))
    }
}

#[derive(Debug, Clone)]
pub struct ParsedListQuery {
    pub filter: DocumentFilter,
    pub sort: DocumentSort,
    pub page: PageRequest,
}

impl ListDocumentsQuery {
    pub fn parse(&self, kind: WorkflowKind, limits: PageLimits) -> Result<ParsedListQuery, ServiceError> {
        let shop_id = self
            .shop_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| ServiceError::InvalidId(format!("Invalid shop_id '{}'", raw)))
            })
            .transpose()?;

        let status = self
            .status
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_status_filter(kind, raw))
            .transpose()?;

        let date_from = self
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound(raw, false))
            .transpose()?;
        let date_to = self
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound(raw, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(ServiceError::ValidationError(
                    "date_from must not be after date_to".into(),
                ));
            }
        }

        let field = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") | Some("created_at") => SortField::CreatedAt,
            Some("updated_at") => SortField::UpdatedAt,
            Some("name") => SortField::Name,
            Some("status") => SortField::Status,
            Some(other) => {
                return Err(ServiceError::ValidationError(format!(
                    "Unsupported sort_by '{}'",
                    other
                )))
            }
        };
        let order = match self
            .sort_order
            .as_deref()
            .map(|raw| raw.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => {
                return Err(ServiceError::ValidationError(format!(
                    "Unsupported sort_order '{}'",
                    other
                )))
            }
        };

        Ok(ParsedListQuery {
            filter: DocumentFilter {
                shop_id,
                status,
                date_from,
                date_to,
            },
            sort: DocumentSort { field, order },
            page: limits.page_request(self.page, self.limit)?,
        })
    }
}

/// A bare date covers the whole day: start of day for a lower bound, last
/// instant of the day for an upper bound.
fn parse_date_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::ValidationError(format!("Invalid date '{}'", raw)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| ServiceError::InternalError("invalid time of day".into()))?;
    Ok(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::workflow_document::DocumentStatus;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};
    use rstest::rstest;

    const LIMITS: PageLimits = PageLimits {
        default_limit: 20,
        max_limit: 100,
    };

    #[test]
    fn defaults() {
        let parsed = ListDocumentsQuery::default()
            .parse(WorkflowKind::Transfer, LIMITS)
            .unwrap();
        assert_eq!(parsed.page, PageRequest::new(1, 20));
        assert_eq!(parsed.sort.field, SortField::CreatedAt);
        assert_eq!(parsed.sort.order, SortOrder::Desc);
        assert!(parsed.filter.status.is_none());
    }

    #[test]
    fn limit_is_capped() {
        let query = ListDocumentsQuery {
            limit: Some(1_000),
            page: Some(3),
            ..Default::default()
        };
        let parsed = query.parse(WorkflowKind::WriteOff, LIMITS).unwrap();
        assert_eq!(parsed.page, PageRequest::new(3, 100));
    }

    #[rstest]
    #[case(ListDocumentsQuery { limit: Some(0), ..Default::default() })]
    #[case(ListDocumentsQuery { page: Some(0), ..Default::default() })]
    #[case(ListDocumentsQuery { sort_by: Some("price".into()), ..Default::default() })]
    #[case(ListDocumentsQuery { sort_order: Some("sideways".into()), ..Default::default() })]
    #[case(ListDocumentsQuery { date_from: Some("yesterday".into()), ..Default::default() })]
    #[case(ListDocumentsQuery { status: Some("open".into()), ..Default::default() })]
    fn invalid_queries_are_validation_errors(#[case] query: ListDocumentsQuery) {
        assert_matches!(
            query.parse(WorkflowKind::Transfer, LIMITS),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn malformed_shop_id_is_invalid_id() {
        let query = ListDocumentsQuery {
            shop_id: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert_matches!(
            query.parse(WorkflowKind::Transfer, LIMITS),
            Err(ServiceError::InvalidId(_))
        );
    }

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let query = ListDocumentsQuery {
            date_from: Some("2024-03-01".into()),
            date_to: Some("2024-03-01".into()),
            status: Some("finished".into()),
            sort_order: Some("ASC".into()),
            ..Default::default()
        };
        let parsed = query.parse(WorkflowKind::Inventory, LIMITS).unwrap();
        let from = parsed.filter.date_from.unwrap();
        let to = parsed.filter.date_to.unwrap();
        assert_eq!((from.day(), from.hour()), (1, 0));
        assert_eq!((to.day(), to.hour(), to.minute()), (1, 23, 59));
        assert_eq!(parsed.filter.status, Some(DocumentStatus::Approved));
        assert_eq!(parsed.sort.order, SortOrder::Asc);
    }
}
