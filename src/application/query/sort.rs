//! Sort stage.

use std::cmp::Ordering;

use crate::domain::content::ContentEntity;
use crate::domain::types::SortDirection;

use super::Criteria;

/// Order entities by the criteria's sort field with `id` as the final
/// tiebreaker. Direction flips the whole comparator, so descending output is
/// always the exact reverse of ascending output.
pub fn sort_entities<E, C>(mut entities: Vec<E>, criteria: &C) -> Vec<E>
where
    E: ContentEntity,
    C: Criteria<E>,
{
    let direction = criteria.direction();
    entities.sort_by(|a, b| {
        let ordering = criteria
            .compare(a, b)
            .then_with(|| a.id().cmp(&b.id()));
        apply_direction(ordering, direction)
    });
    entities
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
