//! # jobly
//!
//! Hand-compiled, parameterized SQL for a `jobs` resource joined to
//! `companies`, on PostgreSQL via `tokio-postgres`.
//!
//! - **Column maps**: logical field names (`companyHandle`) resolve to
//!   physical columns (`company_handle`) through an immutable [`ColumnMap`].
//! - **Partial updates**: any non-empty [`Patch`] compiles to a quoted
//!   `SET "col"=$1, ...` clause; values are always bound, never inlined.
//! - **Filters**: [`JobSearch`] compiles to composable `WHERE` predicates in
//!   a fixed order.
//! - **Repository**: [`JobRepo`] runs create / list / get / update / remove
//!   against anything implementing [`GenericClient`], including transactions.
//!
//! ```ignore
//! use jobly::{DbConfig, JobRepo, JobSearch, Patch};
//!
//! let config = DbConfig::from_env()?;
//! let client = config.connect().await?;
//! let jobs = JobRepo::from_config(&config);
//!
//! let with_equity = jobs.find_all(&client, &JobSearch::new().has_equity(true)).await?;
//! let job = jobs.update(&client, 1, &Patch::new().set("salary", 5000)).await?;
//! ```

pub mod client;
pub mod column_map;
pub mod config;
pub mod error;
pub mod filter;
pub mod job;
pub mod param;
pub mod partial_update;
pub mod repo;
pub mod row;
pub mod validate;
pub mod value;

pub use client::GenericClient;
pub use column_map::{ColumnMap, MissPolicy, quote_ident};
pub use config::DbConfig;
pub use error::{ConstraintKind, DbError, DbResult};
pub use filter::{JobFilter, JobSearch, WhereClause, compile_filters, compile_where};
pub use job::{Company, Job, JobDetail, JobListing, JobPatch, NewJob};
pub use param::ParamList;
pub use partial_update::{Patch, SetClause, compile_set, sql_for_partial_update};
pub use repo::JobRepo;
pub use row::{FromRow, RowExt};
pub use validate::{ValidationCode, ValidationError, ValidationErrors};
pub use value::{BindError, Value};

// Re-exported so callers can name driver types without a direct dependency.
pub use rust_decimal::Decimal;
pub use tokio_postgres;
