//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{Page, PageRequest, SortField};

/// Query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of items to return (1-100, default 10)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 10)]
    pub limit: Option<i64>,

    /// Number of items to skip (default 0)
    #[validate(range(min = 0, message = "offset must not be negative"))]
    #[param(minimum = 0, example = 0)]
    pub offset: Option<i64>,

    /// Column to sort by; `sort_fields` is accepted as an alias
    #[serde(alias = "sort_fields")]
    #[param(example = "name")]
    pub sort_field: Option<String>,

    /// `asc` or `desc`
    #[param(example = "asc")]
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Resolves defaults and checks the sort column against `F`'s whitelist.
    pub fn page_request<F: SortField>(&self) -> AppResult<PageRequest<F>> {
        PageRequest::parse(
            self.limit,
            self.offset,
            self.sort_field.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// The data items for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PaginationMeta {
    #[schema(example = 10, maximum = 100)]
    pub limit: i64,

    #[schema(example = 0)]
    pub offset: i64,

    /// Total number of items across all pages
    #[schema(example = 42)]
    pub total_items: i64,

    #[schema(example = true)]
    pub has_next: bool,

    #[schema(example = false)]
    pub has_prev: bool,
}

impl<T> PagedResponse<T> {
    pub fn new<F>(page: Page<T>, request: &PageRequest<F>) -> Self {
        let returned = page.items.len() as i64;
        Self {
            pagination: PaginationMeta {
                limit: request.limit,
                offset: request.offset,
                total_items: page.total,
                has_next: request.offset + returned < page.total,
                has_prev: request.offset > 0,
            },
            data: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobSortField, PersonSortField, SortOrder};

    #[test]
    fn test_meta_for_middle_page() {
        let request = PageRequest::<PersonSortField> {
            limit: 2,
            offset: 2,
            ..PageRequest::default()
        };
        let page = Page {
            items: vec![1, 2],
            total: 5,
        };
        let response = PagedResponse::new(page, &request);
        assert_eq!(
            response.pagination,
            PaginationMeta {
                limit: 2,
                offset: 2,
                total_items: 5,
                has_next: true,
                has_prev: true,
            }
        );
    }

    #[test]
    fn test_meta_for_last_page() {
        let request = PageRequest::<PersonSortField>::default();
        let response = PagedResponse::new(
            Page {
                items: vec!["a"],
                total: 1,
            },
            &request,
        );
        assert!(!response.pagination.has_next);
        assert!(!response.pagination.has_prev);
    }

    #[test]
    fn test_sort_fields_alias() {
        let query: ListQuery =
            serde_json::from_str(r#"{"sort_fields": "title", "sort_order": "DESC"}"#).unwrap();
        let request = query.page_request::<JobSortField>().unwrap();
        assert_eq!(request.sort_field, JobSortField::Title);
        assert_eq!(request.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let query = ListQuery {
            sort_field: Some("salary".to_string()),
            ..ListQuery::default()
        };
        assert!(query.page_request::<PersonSortField>().is_err());
    }

    #[test]
    fn test_range_validation() {
        let query = ListQuery {
            limit: Some(0),
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());

        let query = ListQuery {
            offset: Some(-1),
            ..ListQuery::default()
        };
        assert!(query.validate().is_err());
    }
}
