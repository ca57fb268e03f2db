use super::criteria::Criteria;
use super::predicate::{Filterable, PredicateSet};

/// Records matching every active predicate, in input order.
///
/// Empty criteria (or criteria with nothing active) return the input as-is.
pub fn filter<R: Filterable + Clone>(records: &[R], criteria: &Criteria) -> Vec<R> {
    let set = PredicateSet::for_record::<R>(criteria);
    apply(records, &set).into_iter().cloned().collect()
}

/// Borrowing variant of [`filter`].
pub fn filter_refs<'a, R: Filterable>(records: &'a [R], criteria: &Criteria) -> Vec<&'a R> {
    let set = PredicateSet::for_record::<R>(criteria);
    apply(records, &set)
}

/// Consuming variant of [`filter`], avoiding clones.
pub fn filter_owned<R: Filterable>(records: Vec<R>, criteria: &Criteria) -> Vec<R> {
    let set = PredicateSet::for_record::<R>(criteria);
    if set.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| set.matches(r)).collect()
}

pub fn apply<'a, R: Filterable>(records: &'a [R], set: &PredicateSet) -> Vec<&'a R> {
    if set.is_empty() {
        return records.iter().collect();
    }
    let matched: Vec<&R> = records.iter().filter(|r| set.matches(*r)).collect();
    tracing::debug!(
        predicates = set.len(),
        input = records.len(),
        output = matched.len(),
        "filtered collection"
    );
    matched
}
