//! Row Resolver — the field resolution engine.
//!
//! Transforms one obfuscated audit-log record into one readable output line.
//! Each `KEY=value` field is resolved independently, left to right, through a
//! prebuilt key dispatch table; polymorphic `CLASS` fields combine the class
//! tag with a record id captured earlier in the same record. The capture
//! lives in an explicit per-record [`RowContext`], so nothing leaks between
//! rows.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::gateway::{LookupQuery, LookupStore};

/// Resolution strategy for a recognized key. Keys absent from the dispatch
/// table pass their value through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    /// Multi-column user lookup, joined with the configured delimiter.
    UserLookup,
    /// Group name lookup.
    GroupLookup,
    /// Role name lookup.
    RoleLookup,
    /// Pass through and remember the value for a later `CLASS` field.
    RecordIdCapture,
    /// Polymorphic class-tag resolution against the remembered record id.
    ClassDispatch,
}

static KEY_ACTIONS: Lazy<HashMap<&'static str, KeyAction>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for key in [
        "ASSIGNED_TO",
        "ASSIGNOR",
        "ALREADYLOGGEDIN",
        "LOCKEDACCOUNT",
        "AUTHORIZATIONFAILURE",
        "LIMITEDIDENTITYCREATED",
        "ACCOUNTLOCKEDFORLOGIN",
        "ACCOUNTUNLOCKEDFORLOGIN",
        "PASSWORDVALIDATIONFAILUREFORLOGIN",
        "CLEAREDPASSWORDATTEMPTCOUNTERFORLOGIN",
        "IDENTITYCREATED",
        "IDENTITYDELETED",
        "LOGIN",
        "LOGOUT",
        "IDENTITY",
        "USER",
    ] {
        map.insert(key, KeyAction::UserLookup);
    }
    for key in [
        "TASKSTATETRANSITIONTENANT",
        "TENANT",
        "GROUP",
        "GROUPCREATED",
        "GROUPDELETED",
        "GROUPROLEADDED",
        "GROUPROLEREVOKED",
        "DEFAULTTENANTDIVISIONCHANGEDGROUPID",
    ] {
        map.insert(key, KeyAction::GroupLookup);
    }
    for key in [
        "ROLECREATED",
        "ROLEDELETED",
        "ROLEGRANTED",
        "ROLEREVOKED",
        "ROLEUPDATED",
    ] {
        map.insert(key, KeyAction::RoleLookup);
    }
    for key in [
        "RECORDID&NAME",
        "CREATERECORDLOGIN",
        "READ/VIEWRECORDLOGIN",
        "UPDATERECORDLOGIN",
        "DELETERECORDLOGIN",
    ] {
        map.insert(key, KeyAction::RecordIdCapture);
    }
    map.insert("CLASS", KeyAction::ClassDispatch);
    map
});

/// Name-part join inside a resolved person display string. Fixed, unlike the
/// configurable user-column join.
const PERSON_NAME_DELIMITER: &str = "|";

enum ClassMatcher {
    Exact(&'static str),
    Prefix(&'static str),
}

/// One class-tag resolution rule. `label: None` echoes the full class tag
/// (the question family prints its concrete subclass).
struct ClassRule {
    matcher: ClassMatcher,
    label: Option<&'static str>,
    query: LookupQuery,
}

impl ClassRule {
    fn matches(&self, tag: &str) -> bool {
        match self.matcher {
            ClassMatcher::Exact(expected) => tag == expected,
            ClassMatcher::Prefix(prefix) => tag.starts_with(prefix),
        }
    }
}

/// Ordered: exact tags first, then the question prefix family. Anything
/// unmatched falls back to the bare id with no lookup.
static CLASS_RULES: &[ClassRule] = &[
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.assessment.Assessment"),
        label: Some("Assessment"),
        query: LookupQuery::AssessmentName,
    },
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.task.BjondTask"),
        label: Some("BjondTask"),
        query: LookupQuery::TaskName,
    },
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.permissions.UserDefinedRole"),
        label: Some("UserDefinedRole"),
        query: LookupQuery::UserDefinedRoleName,
    },
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.person.PersonPerson"),
        label: Some("Person"),
        query: LookupQuery::Person,
    },
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.rule.RuleDefinition"),
        label: Some("RuleDefinition"),
        query: LookupQuery::RuleDefinitionName,
    },
    ClassRule {
        matcher: ClassMatcher::Exact("com.bjond.persistence.tags.TagsFullText"),
        label: Some("Tag"),
        query: LookupQuery::TagName,
    },
    ClassRule {
        matcher: ClassMatcher::Prefix("com.bjond.persistence.assessment.Question"),
        label: None,
        query: LookupQuery::QuestionName,
    },
];

/// Per-record resolution state. Default-constructed at the top of every
/// record; id-bearing keys write it, `CLASS` reads it.
#[derive(Debug, Default)]
struct RowContext {
    last_record_id: String,
}

/// Resolves one audit-log record at a time against a [`LookupStore`].
pub struct RowResolver {
    gateway: Arc<dyn LookupStore>,
    join_delimiter: String,
}

impl RowResolver {
    pub fn new(gateway: Arc<dyn LookupStore>, join_delimiter: impl Into<String>) -> Self {
        Self {
            gateway,
            join_delimiter: join_delimiter.into(),
        }
    }

    /// Resolve one record into its reconstructed, newline-terminated output
    /// line. Empty fields are skipped; every emitted field renders as
    /// `KEY='resolved'|`.
    pub async fn resolve_row<'a, I>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ctx = RowContext::default();
        let mut line = String::new();
        for raw in fields {
            if raw.is_empty() {
                continue;
            }
            let (key, value) = split_field(raw);
            let resolved = self.resolve_field(key, &value, &mut ctx).await;
            line.push_str(key);
            line.push_str("='");
            line.push_str(&resolved);
            line.push_str("'|");
        }
        line.push('\n');
        line
    }

    async fn resolve_field(&self, key: &str, value: &str, ctx: &mut RowContext) -> String {
        match KEY_ACTIONS.get(key) {
            Some(KeyAction::UserLookup) => {
                self.joined_lookup(LookupQuery::User, value, &self.join_delimiter)
                    .await
            }
            Some(KeyAction::GroupLookup) => self.name_lookup(LookupQuery::GroupName, value).await,
            Some(KeyAction::RoleLookup) => self.name_lookup(LookupQuery::RoleName, value).await,
            Some(KeyAction::RecordIdCapture) => {
                ctx.last_record_id = value.to_string();
                value.to_string()
            }
            Some(KeyAction::ClassDispatch) => self.resolve_class(value, &ctx.last_record_id).await,
            None => value.to_string(),
        }
    }

    /// First rule that matches the tag wins. Absence of the looked-up row
    /// renders the whole value empty; an unmatched tag is the bare id.
    async fn resolve_class(&self, tag: &str, id: &str) -> String {
        for rule in CLASS_RULES {
            if !rule.matches(tag) {
                continue;
            }
            let display = match rule.query {
                LookupQuery::Person => self
                    .gateway
                    .lookup(rule.query, id)
                    .await
                    .map(|columns| columns.join(PERSON_NAME_DELIMITER)),
                _ => self
                    .gateway
                    .lookup(rule.query, id)
                    .await
                    .and_then(|columns| columns.into_iter().next()),
            };
            return match display {
                Some(name) => format!("{}: {}", rule.label.unwrap_or(tag), name),
                None => String::new(),
            };
        }
        id.to_string()
    }

    async fn name_lookup(&self, query: LookupQuery, id: &str) -> String {
        self.gateway
            .lookup(query, id)
            .await
            .and_then(|columns| columns.into_iter().next())
            .unwrap_or_default()
    }

    async fn joined_lookup(&self, query: LookupQuery, id: &str, delimiter: &str) -> String {
        self.gateway
            .lookup(query, id)
            .await
            .map(|columns| columns.join(delimiter))
            .unwrap_or_default()
    }
}

/// Split a raw field on the FIRST `=` only (values may contain `=`), trim
/// the key, and delete apostrophes from the value so it cannot break the
/// quoted output format. A field with no `=` resolves with an empty value.
fn split_field(raw: &str) -> (&str, String) {
    match raw.split_once('=') {
        Some((key, value)) => (key.trim(), value.replace('\'', "")),
        None => (raw.trim(), String::new()),
    }
}
