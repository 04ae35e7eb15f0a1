//! Filter stage.

use std::collections::BTreeSet;

use time::OffsetDateTime;

use crate::application::filters::DateRange;
use crate::domain::content::ContentEntity;

use super::Criteria;

/// Keep the entities `criteria` accepts, preserving input order.
pub fn filter_entities<E, C>(entities: &[E], criteria: &C) -> Vec<E>
where
    E: ContentEntity,
    C: Criteria<E>,
{
    entities
        .iter()
        .filter(|entity| criteria.matches(entity))
        .cloned()
        .collect()
}

/// Case-insensitive substring match; an absent term matches everything.
pub fn matches_search<E: ContentEntity>(term: Option<&str>, entity: &E) -> bool {
    match term {
        None => true,
        Some(term) => entity.searchable_text().contains(&term.to_lowercase()),
    }
}

/// An empty filter set is "no constraint", not "match nothing".
pub fn intersects<T: Ord>(wanted: &BTreeSet<T>, present: &BTreeSet<T>) -> bool {
    wanted.is_empty() || !wanted.is_disjoint(present)
}

/// Inclusive on both ends; a missing bound leaves that side open.
pub fn within_range(range: &DateRange, at: OffsetDateTime) -> bool {
    range.from.is_none_or(|from| at >= from) && range.to.is_none_or(|to| at <= to)
}
