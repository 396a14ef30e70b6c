//! Records read from and written to the jobs resource.
//!
//! Output records serialize with camelCase keys (`companyHandle`,
//! `numEmployees`) and decode from rows whose columns were aliased to those
//! same logical names by [`ColumnMap::select_list`](crate::ColumnMap::select_list).

use crate::error::DbResult;
use crate::partial_update::Patch;
use crate::row::{FromRow, RowExt};
use crate::validate::{ValidationCode, ValidationErrors};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_postgres::Row;

/// A job row as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Job {
    /// Logical fields selected for a [`Job`].
    pub const FIELDS: &'static [&'static str] =
        &["id", "title", "salary", "equity", "companyHandle"];
}

impl FromRow for Job {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
        })
    }
}

/// A job row denormalized with its company's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    pub company_name: String,
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
            company_name: row.try_get_column("companyName")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Company {
    pub const FIELDS: &'static [&'static str] =
        &["handle", "name", "description", "numEmployees", "logoUrl"];
}

impl FromRow for Company {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("numEmployees")?,
            logo_url: row.try_get_column("logoUrl")?,
        })
    }
}

/// A job with its owning company nested in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

impl JobDetail {
    pub fn new(job: Job, company: Company) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        }
    }
}

/// Input for creating a job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        check_title(&mut errs, &self.title);
        if let Some(salary) = self.salary {
            check_salary(&mut errs, salary);
        }
        if let Some(equity) = self.equity {
            check_equity(&mut errs, equity);
        }
        if self.company_handle.trim().is_empty() {
            errs.add("companyHandle", ValidationCode::Required, "is required");
        }
        errs
    }
}

/// Input for updating a job.
///
/// Only mutable fields exist here, so `id` and `companyHandle` can never
/// reach the `SET` clause through this type. `salary` and `equity` distinguish
/// "leave unchanged" (`None`) from "set to NULL" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub equity: Option<Option<Decimal>>,
}

impl JobPatch {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        if let Some(title) = &self.title {
            check_title(&mut errs, title);
        }
        if let Some(Some(salary)) = self.salary {
            check_salary(&mut errs, salary);
        }
        if let Some(Some(equity)) = self.equity {
            check_equity(&mut errs, equity);
        }
        errs
    }

    /// The fields that are present, in `title, salary, equity` order.
    pub fn to_patch(&self) -> Patch {
        let mut patch = Patch::new();
        if let Some(title) = &self.title {
            patch.insert("title", title.as_str());
        }
        if let Some(salary) = self.salary {
            patch.insert("salary", salary);
        }
        if let Some(equity) = self.equity {
            patch.insert("equity", equity);
        }
        patch
    }
}

fn check_title(errs: &mut ValidationErrors, title: &str) {
    if title.trim().is_empty() {
        errs.add("title", ValidationCode::Len, "must not be empty");
    }
}

fn check_salary(errs: &mut ValidationErrors, salary: i32) {
    if salary < 0 {
        errs.add("salary", ValidationCode::Range, "must be >= 0");
    }
}

fn check_equity(errs: &mut ValidationErrors, equity: Decimal) {
    if equity < Decimal::ZERO || equity > Decimal::ONE {
        errs.add("equity", ValidationCode::Range, "must be between 0 and 1");
    }
}

/// Present-but-null deserializes to `Some(None)`; absent stays `None` via `#[serde(default)]`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
