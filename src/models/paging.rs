//! Limit/offset paging with a per-resource sort whitelist.

use crate::error::AppError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Applies the direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(AppError::validation(
                "sort_order",
                format!("'{s}' is not a sort order, expected asc or desc"),
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// A column a resource may be sorted by.
pub trait SortField: Copy + Default + FromStr<Err = AppError> + fmt::Debug + Send + Sync + 'static {
    const ALLOWED: &'static [&'static str];

    fn as_str(&self) -> &'static str;
}

macro_rules! sort_fields {
    ($(#[$meta:meta])* $name:ident, default = $default:ident, { $($variant:ident => $column:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl SortField for $name {
            const ALLOWED: &'static [&'static str] = &[$($column),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $column,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($column => Ok(Self::$variant),)+
                    _ => Err(AppError::validation(
                        "sort_field",
                        format!(
                            "'{}' is not sortable, expected one of: {}",
                            s,
                            <Self as SortField>::ALLOWED.join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

sort_fields!(
    PersonSortField, default = Name, {
        Id => "id",
        Name => "name",
        DepartmentId => "department_id",
        JobId => "job_id",
        ManagerId => "manager_id",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
);

sort_fields!(
    DepartmentSortField, default = Name, {
        Id => "id",
        Name => "name",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
);

sort_fields!(
    JobSortField, default = Title, {
        Id => "id",
        Title => "title",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
    }
);

/// A validated page request for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub limit: i64,
    pub offset: i64,
    pub sort_field: F,
    pub sort_order: SortOrder,
}

impl<F: SortField> Default for PageRequest<F> {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_field: F::default(),
            sort_order: SortOrder::Asc,
        }
    }
}

impl<F: SortField> PageRequest<F> {
    /// Builds a request from raw query values, applying defaults and bounds.
    pub fn parse(
        limit: Option<i64>,
        offset: Option<i64>,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Self, AppError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::validation(
                "limit",
                format!("limit must be between 1 and {MAX_LIMIT}"),
            ));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::validation("offset", "offset must not be negative"));
        }

        Ok(Self {
            limit,
            offset,
            sort_field: sort_field.map(str::parse).transpose()?.unwrap_or_default(),
            sort_order: sort_order.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }
}

/// One page of rows plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Orders two nullable values with nulls after every value, as Postgres does
/// for ascending sorts. Combined with [`SortOrder::apply`] nulls come first on
/// descending sorts.
pub fn cmp_nullable<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::<PersonSortField>::parse(None, None, None, None).unwrap();
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
        assert_eq!(page.sort_field, PersonSortField::Name);
        assert_eq!(page.sort_order, SortOrder::Asc);
        assert_eq!(
            PageRequest::<JobSortField>::default().sort_field,
            JobSortField::Title
        );
    }

    #[test]
    fn test_bounds() {
        type P = PageRequest<DepartmentSortField>;
        assert!(P::parse(Some(0), None, None, None).is_err());
        assert!(P::parse(Some(101), None, None, None).is_err());
        assert!(P::parse(Some(100), None, None, None).is_ok());
        assert!(P::parse(None, Some(-1), None, None).is_err());
    }

    #[test]
    fn test_sort_whitelist() {
        let page =
            PageRequest::<PersonSortField>::parse(None, None, Some("manager_id"), Some("DESC"))
                .unwrap();
        assert_eq!(page.sort_field, PersonSortField::ManagerId);
        assert_eq!(page.sort_order, SortOrder::Desc);

        match PageRequest::<JobSortField>::parse(None, None, Some("name"), None) {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "sort_field");
                assert!(reason.contains("id, title, created_at, updated_at"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(
            PageRequest::<JobSortField>::parse(None, None, None, Some("sideways")).is_err()
        );
    }

    #[test]
    fn test_nulls_last_ascending_first_descending() {
        let mut values = vec![None, Some(2), Some(1)];
        values.sort_by(|a, b| SortOrder::Asc.apply(cmp_nullable(a, b)));
        assert_eq!(values, vec![Some(1), Some(2), None]);

        values.sort_by(|a, b| SortOrder::Desc.apply(cmp_nullable(a, b)));
        assert_eq!(values, vec![None, Some(2), Some(1)]);
    }
}
