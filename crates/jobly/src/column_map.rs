//! Logical field name → physical column name mapping.
//!
//! Callers speak in logical names (`companyHandle`); the schema stores
//! physical ones (`company_handle`). A [`ColumnMap`] is an immutable table
//! built once and handed to whatever compiles SQL for a resource. Names the
//! table does not know pass through unchanged; [`MissPolicy`] decides whether
//! that fallback is silent or logged.
//!
//! # Example
//! ```ignore
//! use jobly::ColumnMap;
//!
//! let map = ColumnMap::new([("companyHandle", "company_handle")]);
//! assert_eq!(map.map_name("companyHandle"), "company_handle");
//! assert_eq!(map.map_name("title"), "title");
//! ```

use std::collections::BTreeMap;

/// What to do when a logical name has no entry in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Use the logical name as the column name.
    #[default]
    Identity,
    /// Use the logical name and emit a `tracing` warning.
    Warn,
}

/// Immutable logical → physical column table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: BTreeMap<String, String>,
    miss_policy: MissPolicy,
}

impl ColumnMap {
    /// Build a table from `(logical, physical)` pairs.
    pub fn new<I, L, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(l, p)| (l.into(), p.into()))
                .collect(),
            miss_policy: MissPolicy::Identity,
        }
    }

    /// The jobs table. Every selectable field has an entry, so under
    /// [`MissPolicy::Warn`] only unknown names are reported.
    pub fn jobs() -> Self {
        Self::new([
            ("id", "id"),
            ("title", "title"),
            ("salary", "salary"),
            ("equity", "equity"),
            ("companyHandle", "company_handle"),
        ])
    }

    /// The companies table.
    pub fn companies() -> Self {
        Self::new([
            ("handle", "handle"),
            ("name", "name"),
            ("description", "description"),
            ("numEmployees", "num_employees"),
            ("logoUrl", "logo_url"),
        ])
    }

    /// Override the miss policy.
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    pub fn miss_policy(&self) -> MissPolicy {
        self.miss_policy
    }

    /// Whether `logical` has an explicit entry.
    pub fn contains(&self, logical: &str) -> bool {
        self.entries.contains_key(logical)
    }

    /// Resolve a logical field to its physical column.
    pub fn map_name<'a>(&'a self, logical: &'a str) -> &'a str {
        match self.entries.get(logical) {
            Some(physical) => physical,
            None => {
                if self.miss_policy == MissPolicy::Warn {
                    tracing::warn!(
                        target: "jobly.columns",
                        field = logical,
                        "no column mapping for field; using it as the column name"
                    );
                }
                logical
            }
        }
    }

    /// Resolve and quote a logical field.
    pub fn quoted(&self, logical: &str) -> String {
        quote_ident(self.map_name(logical))
    }

    /// Resolve, quote and qualify a logical field with a table alias.
    pub fn qualified(&self, alias: &str, logical: &str) -> String {
        format!("{}.{}", alias, self.quoted(logical))
    }

    /// Render `alias."physical" AS "logical"` for each field, comma-separated.
    ///
    /// Rows selected this way are keyed by logical names.
    pub fn select_list(&self, alias: Option<&str>, fields: &[&str]) -> String {
        fields
            .iter()
            .map(|field| {
                let column = match alias {
                    Some(alias) => self.qualified(alias, field),
                    None => self.quoted(field),
                };
                format!("{} AS {}", column, quote_ident(field))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render a single identifier as a double-quoted SQL identifier.
///
/// Embedded `"` are doubled, so the result is always one identifier.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Company, Job, JobRepo, JobSearch, Patch};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn mapped_and_unmapped_names() {
        let map = ColumnMap::new([("f1", "f1"), ("fjs2", "f2")]);
        assert_eq!(map.map_name("f1"), "f1");
        assert_eq!(map.map_name("fjs2"), "f2");
        assert_eq!(map.map_name("other"), "other");
        assert!(map.contains("fjs2"));
        assert!(!map.contains("other"));
    }

    #[test]
    fn warn_policy_still_falls_back_to_identity() {
        let map = ColumnMap::jobs().with_miss_policy(MissPolicy::Warn);
        assert_eq!(map.map_name("titel"), "titel");
        assert_eq!(map.map_name("companyHandle"), "company_handle");
    }

    /// Counts `warn` events under `jobly.columns`.
    struct MissCounter(Arc<AtomicUsize>);

    impl tracing::Subscriber for MissCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            let meta = event.metadata();
            if *meta.level() == tracing::Level::WARN && meta.target() == "jobly.columns" {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    fn count_misses(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(MissCounter(count.clone()), f);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn warn_policy_is_silent_for_known_fields() {
        let jobs = ColumnMap::jobs().with_miss_policy(MissPolicy::Warn);
        let companies = ColumnMap::companies().with_miss_policy(MissPolicy::Warn);

        let misses = count_misses(|| {
            for field in Job::FIELDS {
                jobs.map_name(field);
            }
            for field in Company::FIELDS {
                companies.map_name(field);
            }
        });
        assert_eq!(misses, 0);
    }

    #[test]
    fn warn_policy_reports_each_unknown_field() {
        let map = ColumnMap::jobs().with_miss_policy(MissPolicy::Warn);
        assert_eq!(count_misses(|| assert_eq!(map.map_name("titel"), "titel")), 1);

        let silent = ColumnMap::jobs();
        assert_eq!(count_misses(|| assert_eq!(silent.map_name("titel"), "titel")), 0);
    }

    #[test]
    fn warn_policy_is_silent_for_stock_statements() {
        let repo = JobRepo::with_columns(
            ColumnMap::jobs().with_miss_policy(MissPolicy::Warn),
            ColumnMap::companies().with_miss_policy(MissPolicy::Warn),
        );

        let misses = count_misses(|| {
            repo.find_all_sql(&JobSearch::new().title("dev").min_salary(1).has_equity(true));
            repo.update_sql(1, &Patch::new().set("title", "New").set("equity", "0.5"))
                .unwrap();
        });
        assert_eq!(misses, 0);
    }

    #[test]
    fn quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("title"), r#""title""#);
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn select_list_aliases_logical_names() {
        let map = ColumnMap::companies();
        assert_eq!(
            map.select_list(Some("c"), &["handle", "numEmployees"]),
            r#"c."handle" AS "handle", c."num_employees" AS "numEmployees""#
        );
        assert_eq!(
            ColumnMap::jobs().select_list(None, &["companyHandle"]),
            r#""company_handle" AS "companyHandle""#
        );
    }
}
