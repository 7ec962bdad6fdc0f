use regex::Regex;
use std::sync::OnceLock;

/// What kind of constraint a Postgres constraint name denotes, judged by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    PrimaryKey,
}

/// A violated constraint broken down into table, column and the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub table: String,
    pub column: String,
    pub value: Option<String>,
    /// Table named by `is not present in table "..."` on foreign key failures.
    pub referenced_table: Option<String>,
}

impl ConstraintViolation {
    /// Singular entity name for the violating table ("persons" -> "person").
    pub fn entity(&self) -> String {
        singular(&self.table)
    }

    pub fn referenced_entity(&self) -> Option<String> {
        self.referenced_table.as_deref().map(singular)
    }
}

fn singular(table: &str) -> String {
    table.strip_suffix('s').unwrap_or(table).to_string()
}

struct Patterns {
    constraint_name: Regex,
    key_value: Regex,
    column: Regex,
    relation: Regex,
    referenced_table: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => panic!("invalid built-in constraint pattern {pattern:?}: {e}"),
    }
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        // "<table>_<column...>_<suffix>", table names carry no underscore
        constraint_name: compile(r"^([a-z0-9]+)_([a-z0-9_]+)_(key|fkey|check|pkey)$"),
        key_value: compile(r"Key \(([^)]+)\)=\(([^)]*)\)"),
        column: compile(r#"column "([^"]+)""#),
        relation: compile(r#"(?:relation|table) "([^"]+)""#),
        referenced_table: compile(r#"is not present in table "([^"]+)""#),
    })
}

/// Parses PostgreSQL constraint violation text into structured parts.
///
/// Postgres reports the primary message and a `DETAIL` line separately. Callers
/// join both before handing them in, so `Key (col)=(val)` is visible here.
pub struct ConstraintParser;

impl ConstraintParser {
    /// Splits a constraint name such as `persons_manager_id_fkey`.
    pub fn split_constraint_name(name: &str) -> Option<(String, String, ConstraintKind)> {
        let caps = patterns().constraint_name.captures(name)?;
        let kind = match &caps[3] {
            "key" => ConstraintKind::Unique,
            "fkey" => ConstraintKind::ForeignKey,
            "check" => ConstraintKind::Check,
            _ => ConstraintKind::PrimaryKey,
        };
        Some((caps[1].to_string(), caps[2].to_string(), kind))
    }

    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<ConstraintViolation> {
        let key_value = Self::extract_key_value(message);
        let (table, column) = match constraint_name.and_then(Self::split_constraint_name) {
            Some((table, column, _)) => (table, column),
            None => {
                let (column, _) = key_value.clone()?;
                let table = Self::extract_relation(message).unwrap_or_else(|| "resource".into());
                (table, column)
            }
        };
        Some(ConstraintViolation {
            table,
            column,
            value: key_value.map(|(_, v)| v),
            referenced_table: None,
        })
    }

    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<ConstraintViolation> {
        let key_value = Self::extract_key_value(message);
        let (table, column) = match constraint_name.and_then(Self::split_constraint_name) {
            Some((table, column, ConstraintKind::ForeignKey)) => (table, column),
            _ => {
                let (column, _) = key_value.clone()?;
                let table = Self::extract_relation(message).unwrap_or_else(|| "resource".into());
                (table, column)
            }
        };
        Some(ConstraintViolation {
            table,
            column,
            value: key_value.map(|(_, v)| v),
            referenced_table: Self::extract_referenced_table(message),
        })
    }

    pub fn parse_not_null_violation(message: &str) -> Option<ConstraintViolation> {
        let column = Self::extract_column(message)?;
        Some(ConstraintViolation {
            table: Self::extract_relation(message).unwrap_or_else(|| "resource".into()),
            column,
            value: None,
            referenced_table: None,
        })
    }

    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<ConstraintViolation> {
        if let Some((table, column, _)) = constraint_name.and_then(Self::split_constraint_name) {
            return Some(ConstraintViolation {
                table,
                column,
                value: None,
                referenced_table: None,
            });
        }
        Self::parse_not_null_violation(message)
    }

    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        let caps = patterns().key_value.captures(message)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    pub fn extract_column(message: &str) -> Option<String> {
        patterns()
            .column
            .captures(message)
            .map(|caps| caps[1].to_string())
    }

    pub fn extract_relation(message: &str) -> Option<String> {
        patterns()
            .relation
            .captures(message)
            .map(|caps| caps[1].to_string())
    }

    pub fn extract_referenced_table(message: &str) -> Option<String> {
        patterns()
            .referenced_table
            .captures(message)
            .map(|caps| caps[1].to_string())
    }
}
