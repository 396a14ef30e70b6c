//! Repository behavior against a capturing client (no database required).

use jobly::{DbError, DbResult, GenericClient, JobPatch, JobRepo, JobSearch, NewJob, Patch};
use std::sync::{Arc, Mutex};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
struct Captured {
    sql: String,
    param_count: usize,
}

/// Records every statement and answers with zero rows.
#[derive(Clone, Default)]
struct DummyClient(Arc<Mutex<Vec<Captured>>>);

impl DummyClient {
    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.0.lock().unwrap().push(Captured {
            sql: sql.to_string(),
            param_count: params.len(),
        });
    }

    fn captured(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }
}

impl GenericClient for DummyClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.record(sql, params);
        Ok(vec![])
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        self.record(sql, params);
        Ok(0)
    }
}

#[tokio::test]
async fn find_all_with_no_rows_is_empty_not_error() {
    let client = DummyClient::default();
    let jobs = JobRepo::new()
        .find_all(&client, &JobSearch::new())
        .await
        .unwrap();
    assert!(jobs.is_empty());

    let captured = client.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].param_count, 0);
    assert!(!captured[0].sql.contains("WHERE"));
}

#[tokio::test]
async fn find_all_sends_one_param_per_bound_filter() {
    let client = DummyClient::default();
    let search = JobSearch::new().title("dev").min_salary(10).has_equity(true);
    JobRepo::new().find_all(&client, &search).await.unwrap();

    let captured = client.captured();
    assert_eq!(captured[0].param_count, 2);
    assert!(captured[0].sql.contains("$2"));
    assert!(!captured[0].sql.contains("$3"));
}

#[tokio::test]
async fn get_missing_job_is_not_found() {
    let client = DummyClient::default();
    let err = JobRepo::new().get(&client, 0).await.unwrap_err();
    assert!(err.is_not_found());
    // The company lookup never runs once the job lookup comes back empty.
    assert_eq!(client.captured().len(), 1);
}

#[tokio::test]
async fn update_missing_job_is_not_found() {
    let client = DummyClient::default();
    let patch = Patch::new().set("title", "test");
    let err = JobRepo::new().update(&client, 0, &patch).await.unwrap_err();
    assert!(err.is_not_found());

    let captured = client.captured();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].sql.starts_with(r#"UPDATE "jobs" SET "title"=$1 WHERE "id" = $2"#));
    assert_eq!(captured[0].param_count, 2);
}

#[tokio::test]
async fn update_with_empty_patch_never_reaches_the_store() {
    let client = DummyClient::default();
    let err = JobRepo::new()
        .update(&client, 1, &Patch::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
    assert!(client.captured().is_empty());

    let err = JobRepo::new()
        .update_job(&client, 1, &JobPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(client.captured().is_empty());
}

#[tokio::test]
async fn invalid_new_job_never_reaches_the_store() {
    let client = DummyClient::default();
    let err = JobRepo::new()
        .create(&client, &NewJob::new("", "c1").salary(-5))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(client.captured().is_empty());
}

#[tokio::test]
async fn remove_missing_job_is_not_found() {
    let client = DummyClient::default();
    let err = JobRepo::new().remove(&client, 999).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        client.captured()[0].sql,
        r#"DELETE FROM "jobs" WHERE "id" = $1 RETURNING "id""#
    );
}

#[tokio::test]
async fn find_all_compiles_search_as_given() {
    let client = DummyClient::default();
    let search: JobSearch = serde_json::from_str(r#"{"minSalary":-5}"#).unwrap();
    assert!(search.validate().into_result().unwrap_err().is_invalid_argument());

    JobRepo::new().find_all(&client, &search).await.unwrap();
    assert_eq!(client.captured()[0].param_count, 1);
}
