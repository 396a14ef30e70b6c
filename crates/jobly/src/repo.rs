//! The jobs resource: create, list, get, update, remove.
//!
//! Every method takes `&impl GenericClient`, so it runs on a plain
//! connection or inside a caller-managed transaction.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{JobRepo, JobSearch, NewJob};
//!
//! let jobs = JobRepo::new();
//! let job = jobs.create(&client, &NewJob::new("Engineer", "c1").salary(120_000)).await?;
//! let listed = jobs.find_all(&client, &JobSearch::new().min_salary(100_000)).await?;
//! let detail = jobs.get(&client, job.id).await?;
//! jobs.remove(&client, job.id).await?;
//! ```

use crate::client::GenericClient;
use crate::column_map::{ColumnMap, quote_ident};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::filter::{JobSearch, compile_where};
use crate::job::{Company, Job, JobDetail, JobListing, JobPatch, NewJob};
use crate::param::ParamList;
use crate::partial_update::{Patch, compile_set};
use crate::row::FromRow;

const JOBS_ALIAS: &str = "j";
const COMPANIES_ALIAS: &str = "c";

/// Query engine for the jobs table and its join to companies.
///
/// Holds only immutable configuration; cheap to clone and share.
#[derive(Debug, Clone)]
pub struct JobRepo {
    jobs_table: String,
    companies_table: String,
    jobs: ColumnMap,
    companies: ColumnMap,
}

impl Default for JobRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRepo {
    /// `jobs` / `companies` tables with the stock column maps.
    pub fn new() -> Self {
        Self::with_columns(ColumnMap::jobs(), ColumnMap::companies())
    }

    pub fn with_columns(jobs: ColumnMap, companies: ColumnMap) -> Self {
        Self {
            jobs_table: "jobs".to_string(),
            companies_table: "companies".to_string(),
            jobs,
            companies,
        }
    }

    /// Stock tables and maps, with the configured miss policy.
    pub fn from_config(config: &DbConfig) -> Self {
        Self::with_columns(
            ColumnMap::jobs().with_miss_policy(config.miss_policy),
            ColumnMap::companies().with_miss_policy(config.miss_policy),
        )
    }

    /// Point the repository at differently named tables.
    pub fn tables(mut self, jobs: impl Into<String>, companies: impl Into<String>) -> Self {
        self.jobs_table = jobs.into();
        self.companies_table = companies.into();
        self
    }

    pub fn job_columns(&self) -> &ColumnMap {
        &self.jobs
    }

    pub fn company_columns(&self) -> &ColumnMap {
        &self.companies
    }

    fn job_table(&self) -> String {
        quote_ident(&self.jobs_table)
    }

    fn company_table(&self) -> String {
        quote_ident(&self.companies_table)
    }

    fn returning_job(&self) -> String {
        self.jobs.select_list(None, Job::FIELDS)
    }

    /// Insert a job and return it with its generated id.
    ///
    /// An unknown company handle surfaces as a foreign-key
    /// [`DbError::ConstraintViolation`] from the store.
    pub async fn create(&self, conn: &impl GenericClient, job: &NewJob) -> DbResult<Job> {
        job.validate().into_result()?;

        let mut params = ParamList::new();
        let columns = ["title", "salary", "equity", "companyHandle"]
            .iter()
            .map(|f| self.jobs.quoted(f))
            .collect::<Vec<_>>()
            .join(", ");
        let values = [
            params.placeholder(job.title.as_str()),
            params.placeholder(job.salary),
            params.placeholder(job.equity),
            params.placeholder(job.company_handle.as_str()),
        ]
        .join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.job_table(),
            columns,
            values,
            self.returning_job()
        );
        log_sql("job.create", &sql, &params);

        let row = conn.query_one(&sql, &params.as_refs()).await?;
        Job::from_row(&row)
    }

    /// List jobs joined with their company name, filtered and ordered by title.
    ///
    /// `search` is compiled as given; call [`JobSearch::validate`] (or build it
    /// with [`JobSearch::from_query_pairs`]) to reject a negative `minSalary`.
    pub async fn find_all(
        &self,
        conn: &impl GenericClient,
        search: &JobSearch,
    ) -> DbResult<Vec<JobListing>> {
        let (sql, params) = self.find_all_sql(search);
        log_sql("job.find_all", &sql, &params);

        let rows = conn.query(&sql, &params.as_refs()).await?;
        rows.iter().map(JobListing::from_row).collect()
    }

    /// The `find_all` statement and its parameters.
    pub fn find_all_sql(&self, search: &JobSearch) -> (String, ParamList) {
        let mut params = ParamList::new();
        let where_clause = compile_where(search, &self.jobs, Some(JOBS_ALIAS), &mut params);

        let mut sql = format!(
            "SELECT {}, {} AS {} FROM {} AS {} JOIN {} AS {} ON {} = {}",
            self.jobs.select_list(Some(JOBS_ALIAS), Job::FIELDS),
            self.companies.qualified(COMPANIES_ALIAS, "name"),
            quote_ident("companyName"),
            self.job_table(),
            JOBS_ALIAS,
            self.company_table(),
            COMPANIES_ALIAS,
            self.companies.qualified(COMPANIES_ALIAS, "handle"),
            self.jobs.qualified(JOBS_ALIAS, "companyHandle"),
        );
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        sql.push_str(&format!(
            " ORDER BY {}, {}",
            self.jobs.qualified(JOBS_ALIAS, "title"),
            self.jobs.qualified(JOBS_ALIAS, "id")
        ));
        (sql, params)
    }

    /// Fetch one job, then its company, as a nested record.
    pub async fn get(&self, conn: &impl GenericClient, id: i32) -> DbResult<JobDetail> {
        let job = self.find_job(conn, id).await?;

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.companies.select_list(None, Company::FIELDS),
            self.company_table(),
            self.companies.quoted("handle"),
        );
        tracing::debug!(target: "jobly.sql", tag = "job.get.company", sql = %sql, params = 1);

        let row = conn
            .query_opt(&sql, &[&job.company_handle])
            .await?
            .ok_or_else(|| {
                DbError::not_found(format!("No company: {} (job {})", job.company_handle, id))
            })?;
        Ok(JobDetail::new(job, Company::from_row(&row)?))
    }

    /// Fetch one job row without its company.
    pub async fn find_job(&self, conn: &impl GenericClient, id: i32) -> DbResult<Job> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.returning_job(),
            self.job_table(),
            self.jobs.quoted("id"),
        );
        tracing::debug!(target: "jobly.sql", tag = "job.get", sql = %sql, params = 1);

        let row = conn
            .query_opt(&sql, &[&id])
            .await?
            .ok_or_else(|| no_job(id))?;
        Job::from_row(&row)
    }

    /// Apply `patch` to job `id` and return the updated row.
    ///
    /// The patch is assumed to carry only mutable fields; use
    /// [`JobRepo::update_job`] for the typed, validated form. A value that
    /// cannot be encoded for its column (e.g. `"abc"` for `equity`) fails with
    /// [`DbError::InvalidArgument`].
    pub async fn update(&self, conn: &impl GenericClient, id: i32, patch: &Patch) -> DbResult<Job> {
        let (sql, params) = self.update_sql(id, patch)?;
        log_sql("job.update", &sql, &params);

        let row = conn
            .query_opt(&sql, &params.as_refs())
            .await?
            .ok_or_else(|| no_job(id))?;
        Job::from_row(&row)
    }

    /// Validate and apply a typed patch.
    pub async fn update_job(
        &self,
        conn: &impl GenericClient,
        id: i32,
        patch: &JobPatch,
    ) -> DbResult<Job> {
        patch.validate().into_result()?;
        self.update(conn, id, &patch.to_patch()).await
    }

    /// The `update` statement and its parameters; `id` binds last.
    pub fn update_sql(&self, id: i32, patch: &Patch) -> DbResult<(String, ParamList)> {
        let mut params = ParamList::new();
        let set_cols = compile_set(patch, &self.jobs, &mut params)?;
        let id_placeholder = params.placeholder(id);

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
            self.job_table(),
            set_cols,
            self.jobs.quoted("id"),
            id_placeholder,
            self.returning_job()
        );
        Ok((sql, params))
    }

    /// Delete job `id`.
    pub async fn remove(&self, conn: &impl GenericClient, id: i32) -> DbResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 RETURNING {}",
            self.job_table(),
            self.jobs.quoted("id"),
            self.jobs.quoted("id"),
        );
        tracing::debug!(target: "jobly.sql", tag = "job.remove", sql = %sql, params = 1);

        conn.query_opt(&sql, &[&id])
            .await?
            .map(|_| ())
            .ok_or_else(|| no_job(id))
    }
}

fn no_job(id: i32) -> DbError {
    DbError::not_found(format!("No job: {id}"))
}

fn log_sql(tag: &str, sql: &str, params: &ParamList) {
    tracing::debug!(target: "jobly.sql", tag = tag, sql = %sql, params = params.len());
}
