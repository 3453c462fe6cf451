//! Row filters, ordering and projection, rendered as PostgREST query parameters.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    ILikePrefix { column: String, prefix: String },
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Eq { column: column.into(), value: value.to_string() }
    }

    pub fn ilike_prefix(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::ILikePrefix { column: column.into(), prefix: prefix.into() }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    /// `column.op."value"` form used inside `or=(...)`. Values are quoted so
    /// `,` `.` `(` and `)` in them stay part of the value.
    fn expression(&self) -> String {
        match self {
            Self::Eq { column, value } => format!("{column}.eq.{}", quoted(value)),
            Self::ILikePrefix { column, prefix } => {
                format!("{column}.ilike.{}", quoted(&format!("{prefix}*")))
            }
            Self::Or(filters) => format!("or({})", join_expressions(filters)),
        }
    }

    fn to_param(&self) -> (String, String) {
        match self {
            Self::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Self::ILikePrefix { column, prefix } => (column.clone(), format!("ilike.{prefix}*")),
            Self::Or(filters) => ("or".to_owned(), format!("({})", join_expressions(filters))),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::Eq { column, value } => row.get(column).is_some_and(|cell| cell_text(cell) == *value),
            Self::ILikePrefix { column, prefix } => row.get(column).is_some_and(|cell| {
                cell_text(cell).to_lowercase().starts_with(&prefix.to_lowercase())
            }),
            Self::Or(filters) => filters.iter().any(|filter| filter.matches(row)),
        }
    }
}

fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

fn join_expressions(filters: &[Filter]) -> String {
    filters.iter().map(Filter::expression).collect::<Vec<_>>().join(",")
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), ascending: true }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), ascending: false }
    }

    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        let ordering = compare_cells(
            left.get(&self.column).unwrap_or(&Value::Null),
            right.get(&self.column).unwrap_or(&Value::Null),
        );
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

fn compare_cells(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// A table read: projection, filters (all must match), ordering and limit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub select: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl ToString) -> Self {
        Self::new().filter(Filter::eq("id", id))
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), self.select.clone().unwrap_or_else(|| "*".to_owned()))];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }

    /// Filter-only parameters, for writes that must not carry a projection.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }

    /// Embedded relations requested in the projection, e.g. `social_packages(name, platform)`.
    pub fn embeds(&self) -> Vec<Embed> {
        self.select.as_deref().map(parse_embeds).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Embed {
    pub table: String,
    /// Empty means every column.
    pub columns: Vec<String>,
}

fn parse_embeds(select: &str) -> Vec<Embed> {
    let mut embeds = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut parts = Vec::new();
    for ch in select.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);

    for part in parts {
        let part = part.trim();
        if let (Some(open), true) = (part.find('('), part.ends_with(')')) {
            let table = part[..open].trim().to_owned();
            let columns = part[open + 1..part.len() - 1]
                .split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty() && *column != "*")
                .map(str::to_owned)
                .collect();
            embeds.push(Embed { table, columns });
        }
    }
    embeds
}
