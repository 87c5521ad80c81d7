//! Lookup Gateway — the read-only relational boundary of the resolver.
//!
//! The resolver depends only on the [`LookupStore`] port trait;
//! [`PgLookupStore`] is the Postgres adapter over `sqlx::PgPool`. The set of
//! queries is closed: every lookup the resolver can perform is a variant of
//! [`LookupQuery`] with its SQL bound at compile time, and ids are bound as
//! opaque text — the gateway never inspects or validates them.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::Result;

/// The fixed set of named single-id lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupQuery {
    TagName,
    QuestionName,
    RuleDefinitionName,
    Person,
    UserDefinedRoleName,
    TaskName,
    AssessmentName,
    RoleName,
    GroupName,
    User,
}

/// All variants, for registration checks and exhaustive tests.
pub const ALL_QUERIES: [LookupQuery; 10] = [
    LookupQuery::TagName,
    LookupQuery::QuestionName,
    LookupQuery::RuleDefinitionName,
    LookupQuery::Person,
    LookupQuery::UserDefinedRoleName,
    LookupQuery::TaskName,
    LookupQuery::AssessmentName,
    LookupQuery::RoleName,
    LookupQuery::GroupName,
    LookupQuery::User,
];

impl LookupQuery {
    /// Stable name, used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            Self::TagName => "find_tag_name_by_id",
            Self::QuestionName => "find_question_name_by_id",
            Self::RuleDefinitionName => "find_rule_definition_name_by_id",
            Self::Person => "find_person_by_id",
            Self::UserDefinedRoleName => "find_user_defined_role_name_by_id",
            Self::TaskName => "find_task_name_by_id",
            Self::AssessmentName => "find_assessment_name_by_id",
            Self::RoleName => "find_role_name_by_id",
            Self::GroupName => "find_group_name_by_id",
            Self::User => "find_user_by_id",
        }
    }

    /// The SQL behind this lookup. Exactly one `$1` parameter; sqlx's
    /// per-connection statement cache keeps each prepared after first use.
    pub fn statement(self) -> &'static str {
        match self {
            Self::TagName => "SELECT p.name FROM tags_fulltext p WHERE p.id = $1",
            Self::QuestionName => "SELECT p.name FROM assessment_questions p WHERE p.id = $1",
            Self::RuleDefinitionName => "SELECT p.name FROM rule_definition p WHERE p.id = $1",
            Self::Person => {
                "SELECT p.id, p.first_name, p.middle_name, p.last_name \
                 FROM person_person p WHERE p.id = $1"
            }
            Self::UserDefinedRoleName => {
                "SELECT p.name FROM permissionsuserdefinedrole p WHERE p.id = $1"
            }
            Self::TaskName => "SELECT p.name FROM bjondtask p WHERE p.id = $1",
            Self::AssessmentName => "SELECT p.name FROM assessment p WHERE p.id = $1",
            Self::RoleName => "SELECT p.name FROM roletypeentity p WHERE p.id = $1",
            Self::GroupName => "SELECT p.name FROM grouptypeentity p WHERE p.id = $1",
            Self::User => {
                "SELECT p.id, p.loginname, p.firstname, p.lastname, p.email \
                 FROM accounttypeentity p WHERE p.id = $1"
            }
        }
    }
}

/// Read-only lookup port.
///
/// `Some(columns)` is the first matching row in select order; `None` covers
/// both "no row" and "query failed" — a lookup must never abort the run, so
/// adapters report failures themselves and degrade to absence.
#[async_trait]
pub trait LookupStore: Send + Sync {
    async fn lookup(&self, query: LookupQuery, id: &str) -> Option<Vec<String>>;
}

/// Postgres-backed lookup store.
pub struct PgLookupStore {
    pool: PgPool,
}

impl PgLookupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database. Failure here is fatal: without the store
    /// no partial progress is possible.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Server version banner, logged once at startup.
    pub async fn server_version(&self) -> Result<String> {
        let version = sqlx::query_scalar("SELECT version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    /// Close the underlying pool. Lookups after this all degrade to absence.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch(&self, query: LookupQuery, id: &str) -> sqlx::Result<Option<Vec<String>>> {
        let row = sqlx::query(query.statement())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        // NULL columns render as empty segments, matching the output format.
        Ok(row.map(|row| {
            (0..row.len())
                .map(|i| {
                    row.try_get::<Option<String>, _>(i)
                        .ok()
                        .flatten()
                        .unwrap_or_default()
                })
                .collect()
        }))
    }
}

#[async_trait]
impl LookupStore for PgLookupStore {
    async fn lookup(&self, query: LookupQuery, id: &str) -> Option<Vec<String>> {
        match self.fetch(query, id).await {
            Ok(columns) => columns,
            Err(e) => {
                tracing::warn!(
                    query = query.name(),
                    id,
                    error = %e,
                    "lookup failed, treating as missing"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_query_binds_exactly_one_parameter() {
        for query in ALL_QUERIES {
            let sql = query.statement();
            assert_eq!(
                sql.matches("$1").count(),
                1,
                "{} must bind exactly one id",
                query.name()
            );
            assert!(sql.starts_with("SELECT "), "{} must be read-only", query.name());
        }
    }

    #[test]
    fn query_names_are_distinct() {
        let names: HashSet<_> = ALL_QUERIES.iter().map(|q| q.name()).collect();
        assert_eq!(names.len(), ALL_QUERIES.len());
    }
}
