//! Turns a `(FilterCriteria, search term)` pair into a [`Predicate`].

use super::{FilterCriteria, FilterMatchingStrategy, Predicate, Target};

/// Build the predicate for `raw_value` according to `criteria`.
///
/// Callers skip this entirely when there is no search term. Empty field lists
/// resolve to the identity of the combining operator: `Concat` and `And`
/// match everything, `Or` matches nothing.
pub fn build(criteria: &FilterCriteria, raw_value: &str) -> Predicate {
    let keys = criteria.fields().keys();
    let operation = criteria.operation();

    match criteria.fields().strategy() {
        FilterMatchingStrategy::Single => match keys.first() {
            Some(key) => Predicate::compare(Target::Field(key.clone()), operation, raw_value),
            None => Predicate::Never,
        },

        FilterMatchingStrategy::Concat => {
            if keys.is_empty() {
                return Predicate::Always;
            }
            Predicate::compare(Target::Concat(keys.to_vec()), operation, raw_value)
        }

        FilterMatchingStrategy::Or => Predicate::Or(
            keys.iter()
                .map(|key| Predicate::compare(Target::Field(key.clone()), operation, raw_value))
                .collect(),
        ),

        FilterMatchingStrategy::And => Predicate::And(
            keys.iter()
                .map(|key| Predicate::compare(Target::Field(key.clone()), operation, raw_value))
                .collect(),
        ),
    }
}
