//! Declarative filtering of record collections.
//!
//! A [`Criteria`] object is compiled against a record type's
//! [`FieldFilter`] declarations into a [`PredicateSet`]; absent, blank or
//! malformed constraints simply do not become predicates.

mod criteria;
mod engine;
mod predicate;

pub use criteria::Criteria;
pub use engine::{apply, filter, filter_owned, filter_refs};
pub use predicate::{FieldFilter, FieldValue, Filterable, MatchMode, Predicate, PredicateSet};
