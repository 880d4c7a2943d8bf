//! Filtered SELECT builder.
//!
//! Column names only ever come from `&'static str` literals chosen by the
//! repositories; every caller-supplied value is bound as a parameter.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// "asc" (any case) is ascending; anything else is descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    pub column: &'static str,
    pub order: SortOrder,
    pub nulls_last: bool,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            order: SortOrder::Asc,
            nulls_last: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            order: SortOrder::Desc,
            nulls_last: false,
        }
    }

    pub fn by(column: &'static str, order: SortOrder) -> Self {
        Self {
            column,
            order,
            nulls_last: false,
        }
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls_last = true;
        self
    }
}

/// Parses a boolean filter parameter: `"true"` in any case is true, any other
/// value is false.
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    value.map(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Non-empty text filter value
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub struct Select<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    has_where: bool,
}

impl<'a> Select<'a> {
    pub fn from(table: &str, columns: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("SELECT {} FROM {}", columns, table)),
            has_where: false,
        }
    }

    fn push_conjunction(&mut self) {
        if self.has_where {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_where = true;
        }
    }

    /// `column = value`
    pub fn eq<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: 'a + sqlx::Encode<'a, Sqlite> + sqlx::Type<Sqlite> + Send,
    {
        self.push_conjunction();
        self.builder.push(column).push(" = ").push_bind(value);
        self
    }

    /// `column = value` only when a value is present
    pub fn eq_opt<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'a + sqlx::Encode<'a, Sqlite> + sqlx::Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            self.eq(column, value);
        }
        self
    }

    /// `column >= since`
    pub fn since(&mut self, column: &'static str, since: DateTime<Utc>) -> &mut Self {
        self.push_conjunction();
        self.builder.push(column).push(" >= ").push_bind(since);
        self
    }

    pub fn order_by(&mut self, terms: &[OrderBy]) -> &mut Self {
        for (i, term) in terms.iter().enumerate() {
            self.builder.push(if i == 0 { " ORDER BY " } else { ", " });
            self.builder.push(term.column).push(" ").push(term.order.as_sql());
            if term.nulls_last {
                self.builder.push(" NULLS LAST");
            }
        }
        self
    }

    /// Applies a LIMIT only for positive values.
    pub fn limit(&mut self, limit: Option<i64>) -> &mut Self {
        if let Some(n) = limit.filter(|n| *n > 0) {
            self.builder.push(" LIMIT ").push_bind(n);
        }
        self
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub async fn fetch_all<T>(mut self, pool: &SqlitePool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.builder.build_query_as::<T>().fetch_all(pool).await
    }
}

/// Distinct non-empty categories of a table, alphabetically.
pub async fn distinct_categories(
    pool: &SqlitePool,
    table: &'static str,
) -> Result<Vec<String>, sqlx::Error> {
    let sql = format!(
        "SELECT DISTINCT category FROM {} WHERE category IS NOT NULL AND category != '' ORDER BY category",
        table
    );
    let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(category,)| category).collect())
}
