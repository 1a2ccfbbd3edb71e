//! PostgREST query-string builder.
//!
//! Filters are rendered the way PostgREST expects them on the URL:
//! `column=eq.value`, `column=ilike.*needle*`, `column=in.(a,b)`,
//! `or=(a.eq.1,b.ilike.*x*)`, plus `select`, `order`, `limit`, `offset`
//! and `on_conflict`.

use std::fmt::Display;

/// Characters that must be quoted inside `in.(...)` and `or=(...)` lists.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\'];

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gte,
    Lte,
    Ilike,
    In,
    Is,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Ilike => "ilike",
            Operator::In => "in",
            Operator::Is => "is",
        }
    }
}

/// Quotes a value for use inside a PostgREST list when it contains
/// reserved characters or surrounding whitespace.
pub fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(RESERVED)
        || value.trim() != value;
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Removes the wildcard characters from user search text.
fn sanitize_needle(needle: &str) -> String {
    needle
        .trim()
        .chars()
        .filter(|c| *c != '*' && *c != '%')
        .collect()
}

/// One filter condition on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    column: String,
    op: Operator,
    value: String,
}

impl Condition {
    fn new(column: &str, op: Operator, value: String) -> Self {
        Self {
            column: column.to_string(),
            op,
            value,
        }
    }

    pub fn eq(column: &str, value: impl Display) -> Self {
        Self::new(column, Operator::Eq, value.to_string())
    }

    pub fn neq(column: &str, value: impl Display) -> Self {
        Self::new(column, Operator::Neq, value.to_string())
    }

    pub fn gte(column: &str, value: impl Display) -> Self {
        Self::new(column, Operator::Gte, value.to_string())
    }

    pub fn lte(column: &str, value: impl Display) -> Self {
        Self::new(column, Operator::Lte, value.to_string())
    }

    /// Case-insensitive substring match, `ilike.*needle*`.
    pub fn ilike(column: &str, needle: &str) -> Self {
        Self::new(
            column,
            Operator::Ilike,
            format!("*{}*", sanitize_needle(needle)),
        )
    }

    /// Membership in a list, `in.(a,b,c)`.
    pub fn in_list<I, T>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let items: Vec<String> = values
            .into_iter()
            .map(|v| quote_value(&v.to_string()))
            .collect();
        Self::new(column, Operator::In, format!("({})", items.join(",")))
    }

    /// `is.null`, `is.true` or `is.false`.
    pub fn is(column: &str, value: &str) -> Self {
        Self::new(column, Operator::Is, value.to_string())
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Value as used in a top-level parameter: `eq.value`.
    pub fn render_value(&self) -> String {
        format!("{}.{}", self.op.as_str(), self.value)
    }

    /// Condition as used inside `or=(...)`: `column.eq.value`.
    pub fn render_nested(&self) -> String {
        let value = match self.op {
            Operator::Eq | Operator::Neq | Operator::Gte | Operator::Lte | Operator::Ilike => {
                quote_value(&self.value)
            }
            Operator::In | Operator::Is => self.value.clone(),
        };
        format!("{}.{}.{}", self.column, self.op.as_str(), value)
    }
}

/// Query parameters for one PostgREST request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    /// Columns to return, PostgREST `select=`. Embedded resources allowed.
    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    pub fn filter(self, condition: Condition) -> Self {
        let value = condition.render_value();
        let column = condition.column.clone();
        self.push(&column, value)
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(Condition::eq(column, value))
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(Condition::neq(column, value))
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(Condition::gte(column, value))
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(Condition::lte(column, value))
    }

    pub fn ilike(self, column: &str, needle: &str) -> Self {
        self.filter(Condition::ilike(column, needle))
    }

    pub fn in_list<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.filter(Condition::in_list(column, values))
    }

    /// Adds an `eq` filter only when a value is present.
    pub fn eq_opt<T: Display>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    /// Disjunction of conditions, `or=(c1,c2,...)`. Empty input adds nothing.
    pub fn or<I>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        let rendered: Vec<String> = conditions
            .into_iter()
            .map(|c| c.render_nested())
            .collect();
        if rendered.is_empty() {
            return self;
        }
        self.push("or", format!("({})", rendered.join(",")))
    }

    /// Free-text search: `ilike` over several columns joined with `or`.
    /// Blank search text adds nothing.
    pub fn search(self, columns: &[&str], needle: Option<&str>) -> Self {
        match needle.map(sanitize_needle) {
            Some(n) if !n.is_empty() => {
                self.or(columns.iter().map(|c| Condition::ilike(c, &n)))
            }
            _ => self,
        }
    }

    /// Sort key. Repeated calls add secondary keys to the same `order`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        let key = format!("{}.{}", column, direction);
        if let Some((_, existing)) = self.params.iter_mut().find(|(k, _)| k == "order") {
            existing.push(',');
            existing.push_str(&key);
            return self;
        }
        self.push("order", key)
    }

    pub fn limit(self, limit: u64) -> Self {
        self.push("limit", limit.to_string())
    }

    pub fn offset(self, offset: u64) -> Self {
        self.push("offset", offset.to_string())
    }

    /// Conflict target for upserts.
    pub fn on_conflict(self, columns: &str) -> Self {
        self.push("on_conflict", columns.to_string())
    }

    /// Applies `limit`/`offset` from a page request.
    pub fn page(self, page: &shared::pagination::PageRequest) -> Self {
        self.limit(page.limit()).offset(page.offset())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of a parameter, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when the query carries a row filter (anything other than
    /// `select`, `order`, `limit`, `offset` or `on_conflict`).
    pub fn has_filter(&self) -> bool {
        self.params.iter().any(|(k, _)| {
            !matches!(
                k.as_str(),
                "select" | "order" | "limit" | "offset" | "on_conflict"
            )
        })
    }
}
