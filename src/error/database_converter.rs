use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Turns diesel failures into structured `AppError` variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a diesel error raised while performing `operation`.
    ///
    /// Constraint violations become `Duplicate` or `Validation` so that callers
    /// racing the service-level checks still get a 409/400 instead of a 500.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let text = match info.details() {
            Some(details) => format!("{}\n{}", info.message(), details),
            None => info.message().to_string(),
        };
        let constraint = info.constraint_name();

        let converted = match kind {
            DatabaseErrorKind::UniqueViolation => {
                ConstraintParser::parse_unique_violation(&text, constraint).map(|v| {
                    AppError::Duplicate {
                        entity: v.entity(),
                        field: v.column.clone(),
                        value: v.value.unwrap_or_default(),
                    }
                })
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                ConstraintParser::parse_foreign_key_violation(&text, constraint).map(|v| {
                    let target = v.referenced_entity().unwrap_or_else(|| "resource".into());
                    let reason = match &v.value {
                        Some(value) => format!("{target} {value} does not exist"),
                        None => format!("referenced {target} does not exist"),
                    };
                    AppError::Validation {
                        field: v.column,
                        reason,
                    }
                })
            }
            DatabaseErrorKind::NotNullViolation => ConstraintParser::parse_not_null_violation(
                &text,
            )
            .map(|v| AppError::Validation {
                reason: format!("{} is required for {}", v.column, v.entity()),
                field: v.column,
            }),
            DatabaseErrorKind::CheckViolation => {
                ConstraintParser::parse_check_violation(&text, constraint).map(|v| {
                    AppError::Validation {
                        reason: format!("check constraint failed for {}", v.entity()),
                        field: v.column,
                    }
                })
            }
            _ => None,
        };

        converted.unwrap_or_else(|| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{kind:?}: {}", info.message())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: &'static str,
        details: Option<&'static str>,
        constraint_name: Option<&'static str>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            self.message
        }

        fn details(&self) -> Option<&str> {
            self.details
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, info: MockDatabaseErrorInfo) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[test]
    fn test_unique_email_becomes_duplicate() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            MockDatabaseErrorInfo {
                message: "duplicate key value violates unique constraint \"accounts_email_key\"",
                details: Some("Key (email)=(ada@example.com) already exists."),
                constraint_name: Some("accounts_email_key"),
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert account") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "account");
                assert_eq!(field, "email");
                assert_eq!(value, "ada@example.com");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_becomes_validation() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            MockDatabaseErrorInfo {
                message: "insert or update on table \"persons\" violates foreign key constraint \"persons_department_id_fkey\"",
                details: Some("Key (department_id)=(999) is not present in table \"departments\"."),
                constraint_name: Some("persons_department_id_fkey"),
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert person") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "department_id");
                assert_eq!(reason, "department 999 does not exist");
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_not_null_becomes_validation() {
        let error = db_error(
            DatabaseErrorKind::NotNullViolation,
            MockDatabaseErrorInfo {
                message: "null value in column \"name\" of relation \"departments\" violates not-null constraint",
                details: None,
                constraint_name: None,
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert department") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "name");
                assert!(reason.contains("required"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_falls_back_to_database() {
        let error = db_error(
            DatabaseErrorKind::SerializationFailure,
            MockDatabaseErrorInfo {
                message: "could not serialize access",
                details: None,
                constraint_name: None,
            },
        );
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(error, "update person"),
            AppError::Database { .. }
        ));
    }

    #[test]
    fn test_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        assert!(matches!(result, AppError::NotFound { .. }));
    }
}
