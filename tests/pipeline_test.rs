//! End-to-end file runs: obfuscated log in, reconstructed log out, against
//! an in-memory lookup store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use audit_resolver::{resolve_log_file, LookupQuery, LookupStore, RowResolver};

#[derive(Default)]
struct FixtureStore {
    rows: HashMap<(LookupQuery, String), Vec<String>>,
}

impl FixtureStore {
    fn with(mut self, query: LookupQuery, id: &str, columns: &[&str]) -> Self {
        self.rows.insert(
            (query, id.to_string()),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl LookupStore for FixtureStore {
    async fn lookup(&self, query: LookupQuery, id: &str) -> Option<Vec<String>> {
        self.rows.get(&(query, id.to_string())).cloned()
    }
}

fn fixture_resolver() -> RowResolver {
    let store = FixtureStore::default()
        .with(
            LookupQuery::User,
            "u1",
            &["u1", "jdoe", "Jane", "Doe", "jane@example.com"],
        )
        .with(LookupQuery::GroupName, "g1", &["Cardiology"])
        .with(LookupQuery::TagName, "t1", &["Diabetic"]);
    RowResolver::new(Arc::new(store), ",")
}

#[tokio::test]
async fn resolves_a_log_file_row_by_row() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("secure-audit.log");
    let output = dir.path().join("resolved.log");
    std::fs::write(
        &input,
        "LOGIN=u1|TENANT=g1|\n\
         RECORDID&NAME=t1|CLASS=com.bjond.persistence.tags.TagsFullText|\n\
         CLASS=com.bjond.persistence.tags.TagsFullText|STATUS=ok|\n",
    )
    .unwrap();

    let resolver = fixture_resolver();
    let stats = resolve_log_file(&resolver, &input, &output, b'|')
        .await
        .unwrap();
    assert_eq!(stats.rows, 3);

    let resolved = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        resolved,
        "LOGIN='u1,jdoe,Jane,Doe,jane@example.com'|TENANT='Cardiology'|\n\
         RECORDID&NAME='t1'|CLASS='Tag: Diabetic'|\n\
         CLASS=''|STATUS='ok'|\n"
    );
}

#[tokio::test]
async fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("secure-audit.log");
    std::fs::write(&input, "LOGIN=u1|RECORDID&NAME=t1|STATUS=ok|\n").unwrap();

    let resolver = fixture_resolver();
    let first_out = dir.path().join("first.log");
    let second_out = dir.path().join("second.log");
    resolve_log_file(&resolver, &input, &first_out, b'|')
        .await
        .unwrap();
    resolve_log_file(&resolver, &input, &second_out, b'|')
        .await
        .unwrap();

    let first = std::fs::read(&first_out).unwrap();
    let second = std::fs::read(&second_out).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_input_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = fixture_resolver();
    let err = resolve_log_file(
        &resolver,
        &dir.path().join("does-not-exist.log"),
        &dir.path().join("out.log"),
        b'|',
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("cannot read audit log"));
}
