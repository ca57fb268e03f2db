use super::criteria::Criteria;
use crate::authz::Role;

/// A record field as seen by the filter engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl<'a> FieldValue<'a> {
    fn as_text(&self) -> Option<&'a str> {
        match *self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match *self {
            FieldValue::Number(n) if n.is_finite() => Some(n),
            _ => None,
        }
    }
}

/// Records the query engine can narrow.
pub trait Filterable {
    /// Field lookup by name; unknown names return [`FieldValue::Missing`].
    fn field(&self, name: &str) -> FieldValue<'_>;

    /// Criteria keys this record type understands.
    fn filter_schema() -> &'static [FieldFilter];
}

/// How a set-membership value is compared with the record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Free text: field contains the value, case-insensitive.
    Contains,
    /// Closed enumeration: field equals the value.
    Equals,
}

/// Declares which criteria key drives which predicate over which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFilter {
    Search {
        key: &'static str,
        fields: &'static [&'static str],
    },
    AnyOf {
        key: &'static str,
        field: &'static str,
        mode: MatchMode,
    },
    Range {
        min_key: &'static str,
        max_key: &'static str,
        field: &'static str,
    },
    Exact {
        key: &'static str,
        field: &'static str,
    },
    /// Exact match on a role field; the criteria value is read like any role name.
    Role {
        key: &'static str,
        field: &'static str,
    },
}

/// One active constraint, compiled from criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Search {
        fields: &'static [&'static str],
        needle: String,
    },
    AnyOf {
        field: &'static str,
        values: Vec<String>,
        mode: MatchMode,
    },
    Range {
        field: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    Exact {
        field: &'static str,
        value: String,
    },
}

impl Predicate {
    /// Compile one declaration; `None` when the criteria leave it inactive.
    fn compile(filter: &FieldFilter, criteria: &Criteria) -> Option<Self> {
        match *filter {
            FieldFilter::Search { key, fields } => criteria.text(key).map(|needle| Predicate::Search {
                fields,
                needle: needle.to_lowercase(),
            }),
            FieldFilter::AnyOf { key, field, mode } => {
                let values = criteria.text_set(key);
                if values.is_empty() {
                    return None;
                }
                let values = match mode {
                    MatchMode::Contains => values.into_iter().map(|v| v.to_lowercase()).collect(),
                    MatchMode::Equals => values,
                };
                Some(Predicate::AnyOf { field, values, mode })
            }
            FieldFilter::Range { min_key, max_key, field } => {
                let min = criteria.number(min_key);
                let max = criteria.number(max_key);
                (min.is_some() || max.is_some()).then_some(Predicate::Range { field, min, max })
            }
            FieldFilter::Exact { key, field } => criteria
                .text(key)
                .map(|value| Predicate::Exact { field, value }),
            FieldFilter::Role { key, field } => criteria.text(key).map(|value| {
                let value = Role::parse(&value).map_or(value, |role| role.as_str().to_string());
                Predicate::Exact { field, value }
            }),
        }
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::Search { fields, needle } => fields.iter().any(|name| {
                record
                    .field(name)
                    .as_text()
                    .map(|text| text.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
            Predicate::AnyOf { field, values, mode } => {
                let Some(text) = record.field(field).as_text() else {
                    return false;
                };
                match mode {
                    MatchMode::Contains => {
                        let text = text.to_lowercase();
                        values.iter().any(|v| text.contains(v.as_str()))
                    }
                    MatchMode::Equals => values.iter().any(|v| v == text),
                }
            }
            Predicate::Range { field, min, max } => {
                let Some(n) = record.field(field).as_number() else {
                    return false;
                };
                min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
            }
            Predicate::Exact { field, value } => record
                .field(field)
                .as_text()
                .map(|text| text == value)
                .unwrap_or(false),
        }
    }
}

/// The active predicates for one criteria object, ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn compile(schema: &[FieldFilter], criteria: &Criteria) -> Self {
        let predicates = schema
            .iter()
            .filter_map(|filter| Predicate::compile(filter, criteria))
            .collect();
        Self { predicates }
    }

    pub fn for_record<R: Filterable>(criteria: &Criteria) -> Self {
        Self::compile(R::filter_schema(), criteria)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
