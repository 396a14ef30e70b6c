//! Filter criteria for listing jobs, and their compilation to `WHERE`.
//!
//! [`JobSearch`] is what callers hand in (every field optional).
//! [`JobSearch::filters`] reduces it to the active [`JobFilter`]s in a fixed
//! order, and each filter renders its own predicate while binding its value
//! into the shared [`ParamList`].

use crate::column_map::ColumnMap;
use crate::error::{DbError, DbResult};
use crate::param::ParamList;
use crate::validate::{ValidationCode, ValidationErrors};
use crate::value::Value;
use serde::Deserialize;

/// Optional search criteria for [`JobRepo::find_all`](crate::JobRepo::find_all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobSearch {
    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,
    /// Inclusive lower bound on salary.
    #[serde(default)]
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with equity > 0; anything else is no constraint.
    #[serde(default)]
    pub has_equity: Option<bool>,
}

impl JobSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min_salary: i32) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }

    /// Build criteria from query-string pairs.
    ///
    /// `minSalary` must parse as an integer, `hasEquity` is true only for the
    /// literal `"true"`, and unknown keys are rejected.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut search = JobSearch::new();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "title" => search.title = Some(value.to_string()),
                "minSalary" => {
                    let parsed = value.trim().parse::<i32>().map_err(|_| {
                        DbError::invalid_argument(format!(
                            "minSalary: expected an integer, got {value:?}"
                        ))
                    })?;
                    search.min_salary = Some(parsed);
                }
                "hasEquity" => search.has_equity = Some(value == "true"),
                other => {
                    return Err(DbError::invalid_argument(format!(
                        "unknown search field: {other}"
                    )));
                }
            }
        }
        search.validate().into_result()?;
        Ok(search)
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        if matches!(self.min_salary, Some(v) if v < 0) {
            errs.add("minSalary", ValidationCode::Range, "must be >= 0");
        }
        errs
    }

    /// The active filters, always in `title, minSalary, hasEquity` order.
    pub fn filters(&self) -> Vec<JobFilter> {
        let mut filters = Vec::with_capacity(3);
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            filters.push(JobFilter::TitleMatch(title.to_string()));
        }
        if let Some(min) = self.min_salary {
            filters.push(JobFilter::MinSalary(min));
        }
        if self.has_equity == Some(true) {
            filters.push(JobFilter::HasEquity);
        }
        filters
    }

    pub fn is_unfiltered(&self) -> bool {
        self.filters().is_empty()
    }
}

/// One active search predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFilter {
    /// `title ILIKE '%…%'`
    TitleMatch(String),
    /// `salary >= n`
    MinSalary(i32),
    /// `equity > 0`
    HasEquity,
}

impl JobFilter {
    /// The logical field this filter constrains.
    pub fn field(&self) -> &'static str {
        match self {
            JobFilter::TitleMatch(_) => "title",
            JobFilter::MinSalary(_) => "salary",
            JobFilter::HasEquity => "equity",
        }
    }

    /// Render this predicate, binding any value into `params`.
    pub fn render(&self, columns: &ColumnMap, alias: Option<&str>, params: &mut ParamList) -> String {
        let column = match alias {
            Some(alias) => columns.qualified(alias, self.field()),
            None => columns.quoted(self.field()),
        };
        match self {
            JobFilter::TitleMatch(needle) => {
                let pattern = format!("%{needle}%");
                format!("{} ILIKE {}", column, params.placeholder(pattern))
            }
            JobFilter::MinSalary(min) => format!("{} >= {}", column, params.placeholder(*min)),
            JobFilter::HasEquity => format!("{} > 0", column),
        }
    }
}

/// A compiled `WHERE` clause (empty when nothing is active).
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// `WHERE a AND b ...`, or `""`.
    pub where_clause: String,
    pub values: Vec<Value>,
}

/// Compile `criteria` into a standalone `WHERE` clause numbered from `$1`.
pub fn compile_filters(criteria: &JobSearch, columns: &ColumnMap, alias: Option<&str>) -> WhereClause {
    let mut params = ParamList::new();
    let where_clause = compile_where(criteria, columns, alias, &mut params);
    WhereClause {
        where_clause,
        values: params.into_values(),
    }
}

/// Compile `criteria` into a `WHERE` clause, binding values into `params`.
pub fn compile_where(
    criteria: &JobSearch,
    columns: &ColumnMap,
    alias: Option<&str>,
    params: &mut ParamList,
) -> String {
    let predicates: Vec<String> = criteria
        .filters()
        .iter()
        .map(|f| f.render(columns, alias, params))
        .collect();

    if predicates.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", predicates.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(search: &JobSearch) -> WhereClause {
        compile_filters(search, &ColumnMap::jobs(), None)
    }

    #[test]
    fn no_criteria_is_empty() {
        let result = compile(&JobSearch::new());
        assert_eq!(result.where_clause, "");
        assert!(result.values.is_empty());

        let result = compile(&JobSearch::new().has_equity(false));
        assert_eq!(result.where_clause, "");
    }

    #[test]
    fn min_salary_binds_one_param() {
        let result = compile(&JobSearch::new().min_salary(250));
        assert_eq!(result.where_clause, r#"WHERE "salary" >= $1"#);
        assert_eq!(result.values, vec![Value::Int(250)]);
    }

    #[test]
    fn has_equity_binds_nothing() {
        let result = compile(&JobSearch::new().has_equity(true));
        assert_eq!(result.where_clause, r#"WHERE "equity" > 0"#);
        assert!(result.values.is_empty());
    }

    #[test]
    fn title_is_wrapped() {
        let result = compile(&JobSearch::new().title("ob1"));
        assert_eq!(result.where_clause, r#"WHERE "title" ILIKE $1"#);
        assert_eq!(result.values, vec![Value::from("%ob1%")]);

        let result = compile(&JobSearch::new().title(""));
        assert_eq!(result.where_clause, "");
    }

    #[test]
    fn all_criteria_in_fixed_order() {
        let result = compile_filters(
            &JobSearch::new().has_equity(true).min_salary(200).title("eng"),
            &ColumnMap::jobs(),
            Some("j"),
        );
        assert_eq!(
            result.where_clause,
            r#"WHERE j."title" ILIKE $1 AND j."salary" >= $2 AND j."equity" > 0"#
        );
        assert_eq!(result.values, vec![Value::from("%eng%"), Value::Int(200)]);
    }

    #[test]
    fn deserialized_key_order_does_not_matter() {
        let a: JobSearch = serde_json::from_str(r#"{"hasEquity":true,"minSalary":1}"#).unwrap();
        let b: JobSearch = serde_json::from_str(r#"{"minSalary":1,"hasEquity":true}"#).unwrap();
        assert_eq!(compile(&a), compile(&b));
    }

    #[test]
    fn continues_numbering_from_existing_params() {
        let mut params = ParamList::new();
        params.push("already bound");
        let clause = compile_where(
            &JobSearch::new().min_salary(10),
            &ColumnMap::jobs(),
            None,
            &mut params,
        );
        assert_eq!(clause, r#"WHERE "salary" >= $2"#);
    }

    #[test]
    fn query_pairs_are_coerced() {
        let search = JobSearch::from_query_pairs([
            ("minSalary", "250"),
            ("hasEquity", "true"),
            ("title", "dev"),
        ])
        .unwrap();
        assert_eq!(search, JobSearch::new().min_salary(250).has_equity(true).title("dev"));

        let search = JobSearch::from_query_pairs([("hasEquity", "yes")]).unwrap();
        assert_eq!(search.has_equity, Some(false));
        assert!(search.is_unfiltered());
    }

    #[test]
    fn query_pairs_reject_malformed_values() {
        let err = JobSearch::from_query_pairs([("minSalary", "lots")]).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = JobSearch::from_query_pairs([("minSalary", "-5")]).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = JobSearch::from_query_pairs([("company", "c1")]).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
