//! Subscription filter → parameterized `WHERE` clause.
//!
//! A [`FilterSpec`] is a sparse set of optional constraints taken from the
//! query string. [`translate`] turns it into a clause such as
//! `WHERE start_date > $1 AND service_name=$2` plus the values bound to each
//! `$n` placeholder, in order. Both the list query and the aggregate queries
//! append the same clause to their `SELECT ... FROM subscriptions ` prefix.
//!
//! Fields are visited in the order of [`FILTER_FIELDS`], so clause word order
//! and placeholder numbering never depend on the input.

use chrono::NaiveDate;
use sea_orm::Value;

/// Optional constraints of a subscription query. `None` means "not set";
/// `Some(String::new())` is a real (empty) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Gt,
    Lt,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
        }
    }

    /// Split a filter key into its column and comparator: `_from` is a strict
    /// lower bound, `_to` a strict upper bound, anything else is equality.
    pub fn split_key(key: &'static str) -> (&'static str, Comparator) {
        if let Some(column) = key.strip_suffix("_from") {
            return (column, Comparator::Gt);
        }
        if let Some(column) = key.strip_suffix("_to") {
            return (column, Comparator::Lt);
        }
        (key, Comparator::Eq)
    }
}

/// One filterable field: external key, optional column rename, and how to
/// read its bound value out of a [`FilterSpec`].
pub struct FilterField {
    pub key: &'static str,
    /// Column to use instead of the one derived from `key`.
    pub rename: Option<&'static str>,
    value: fn(&FilterSpec) -> Option<Value>,
}

impl FilterField {
    /// Target column and comparator, from the key's suffix.
    pub fn target(&self) -> (&'static str, Comparator) {
        let (column, comparator) = Comparator::split_key(self.key);
        (self.rename.unwrap_or(column), comparator)
    }
}

fn start_date_from(f: &FilterSpec) -> Option<Value> {
    f.start_date_from.map(Value::from)
}

fn start_date_to(f: &FilterSpec) -> Option<Value> {
    f.start_date_to.map(Value::from)
}

fn user_id(f: &FilterSpec) -> Option<Value> {
    f.user_id.clone().map(Value::from)
}

fn service_name(f: &FilterSpec) -> Option<Value> {
    f.service_name.clone().map(Value::from)
}

/// Declaration order is evaluation order.
pub static FILTER_FIELDS: [FilterField; 4] = [
    FilterField {
        key: "start_date_from",
        rename: None,
        value: start_date_from,
    },
    FilterField {
        key: "start_date_to",
        rename: None,
        value: start_date_to,
    },
    // external key is camelCase, the column is not
    FilterField {
        key: "userId",
        rename: Some("user_id"),
        value: user_id,
    },
    FilterField {
        key: "service_name",
        rename: None,
        value: service_name,
    },
];

/// Clause text and its bound values. `params[i]` binds placeholder `$i+1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateResult {
    pub clause: String,
    pub params: Vec<Value>,
}

impl PredicateResult {
    /// The only way a condition enters the clause: the value is pushed and the
    /// placeholder index taken from the new length, so the two cannot drift.
    fn push_condition(&mut self, column: &str, comparator: Comparator, value: Value) {
        self.clause.push_str(if self.params.is_empty() { "WHERE " } else { " AND " });
        self.params.push(value);
        let index = self.params.len();
        let condition = match comparator {
            Comparator::Eq => format!("{column}=${index}"),
            range => format!("{column} {} ${index}", range.symbol()),
        };
        self.clause.push_str(&condition);
    }

    /// Append the clause to a `SELECT ... FROM <table> ` prefix.
    pub fn apply_to(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.clause)
    }
}

pub fn translate(spec: FilterSpec) -> PredicateResult {
    let mut result = PredicateResult::default();
    for field in &FILTER_FIELDS {
        if let Some(value) = (field.value)(&spec) {
            let (column, comparator) = field.target();
            result.push_condition(column, comparator, value);
        }
    }
    result
}
