//! Read queries and write operations understood by a `CatalogStore`.

use std::cmp::Ordering;

use serde_json::Value;

use crate::cache::WriteOperation;

// == Filter ==
/// A predicate over one JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Eq { field: String, value: Value },
    /// Array field contains value
    Contains { field: String, value: Value },
    /// Inclusive bounds on a number or ISO-8601 string field
    Range {
        field: String,
        min: Option<Value>,
        max: Option<Value>,
    },
    /// Case-insensitive substring match on any of the fields
    Text { fields: Vec<String>, needle: String },
    /// Field equals one of the values
    In { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Filter::Contains {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn range(field: &str, min: Option<Value>, max: Option<Value>) -> Self {
        Filter::Range {
            field: field.to_string(),
            min,
            max,
        }
    }

    pub fn text(fields: &[&str], needle: &str) -> Self {
        Filter::Text {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_lowercase(),
        }
    }

    pub fn any_of(field: &str, values: Vec<Value>) -> Self {
        Filter::In {
            field: field.to_string(),
            values,
        }
    }

    /// Whether `doc` satisfies the predicate. Missing fields never match.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::Eq { field, value } => doc.get(field) == Some(value),
            Filter::Contains { field, value } => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::Range { field, min, max } => {
                let Some(actual) = doc.get(field) else {
                    return false;
                };
                let above = min.as_ref().map_or(true, |m| {
                    matches!(compare(actual, m), Some(Ordering::Greater | Ordering::Equal))
                });
                let below = max.as_ref().map_or(true, |m| {
                    matches!(compare(actual, m), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
            Filter::Text { fields, needle } => fields.iter().any(|f| {
                doc.get(f)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(needle.as_str()))
            }),
            Filter::In { field, values } => doc.get(field).is_some_and(|v| values.contains(v)),
        }
    }
}

/// Orders two scalar JSON values of the same type.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// == Sort ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }

    /// Compares two documents; documents lacking the field sort last.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.get(&self.field), b.get(&self.field)) {
            (Some(x), Some(y)) => {
                let ord = compare(x, y).unwrap_or(Ordering::Equal);
                if self.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// == Read Query ==
/// Filters, ordering and a page window for one collection read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadQuery {
    pub filters: Vec<Filter>,
    pub sort: Option<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl ReadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

/// One page of documents plus the match count before paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: u64,
}

// == Write Op ==
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new document; the store assigns `id` and timestamps
    Create(Value),
    /// Merge `patch` into an existing document; `null` removes a field
    Update { id: String, patch: Value },
    Delete { id: String },
}

impl WriteOp {
    pub fn operation(&self) -> WriteOperation {
        match self {
            WriteOp::Create(_) => WriteOperation::Create,
            WriteOp::Update { .. } => WriteOperation::Update,
            WriteOp::Delete { .. } => WriteOperation::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album() -> Value {
        json!({
            "id": "al1",
            "title": "Blue Train",
            "artistId": "ar1",
            "genres": ["jazz", "hard bop"],
            "releaseDate": "1958-01-01",
            "popularity": 71
        })
    }

    #[test]
    fn test_eq_and_contains() {
        let doc = album();
        assert!(Filter::eq("artistId", "ar1").matches(&doc));
        assert!(!Filter::eq("artistId", "ar2").matches(&doc));
        assert!(Filter::contains("genres", "jazz").matches(&doc));
        assert!(!Filter::contains("genres", "rock").matches(&doc));
        assert!(!Filter::contains("title", "Blue").matches(&doc));
    }

    #[test]
    fn test_range_on_numbers_and_dates() {
        let doc = album();
        assert!(Filter::range("popularity", Some(json!(70)), Some(json!(71))).matches(&doc));
        assert!(!Filter::range("popularity", Some(json!(72)), None).matches(&doc));
        assert!(Filter::range(
            "releaseDate",
            Some(json!("1958-01-01")),
            Some(json!("1958-12-31"))
        )
        .matches(&doc));
        assert!(!Filter::range("missing", None, None).matches(&doc));
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let doc = album();
        assert!(Filter::text(&["title", "label"], "TRAIN").matches(&doc));
        assert!(!Filter::text(&["label"], "train").matches(&doc));
    }

    #[test]
    fn test_any_of() {
        let doc = album();
        assert!(Filter::any_of("id", vec![json!("x"), json!("al1")]).matches(&doc));
        assert!(!Filter::any_of("id", vec![]).matches(&doc));
    }

    #[test]
    fn test_sort_missing_fields_last() {
        let a = json!({"popularity": 10});
        let b = json!({"popularity": 90});
        let c = json!({});

        let desc = SortSpec::desc("popularity");
        assert_eq!(desc.compare(&b, &a), Ordering::Less);
        assert_eq!(desc.compare(&c, &a), Ordering::Greater);
        assert_eq!(SortSpec::asc("popularity").compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_write_op_kind() {
        assert_eq!(WriteOp::Create(json!({})).operation(), WriteOperation::Create);
        assert_eq!(
            WriteOp::Delete { id: "x".into() }.operation(),
            WriteOperation::Delete
        );
    }
}
