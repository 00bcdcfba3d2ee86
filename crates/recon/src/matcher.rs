use crate::key::KeyIndex;
use crate::model::JoinRow;

/// Full outer join of two key indexes on `(id, reference)`.
///
/// Spreadsheet keys come first in their first-seen order, followed by keys
/// only the reference side carries. A key present on both sides yields one
/// BOTH row per left x right pairing, left-major.
pub fn full_outer_join<'a>(left: &KeyIndex<'a>, right: &KeyIndex<'a>) -> Vec<JoinRow<'a>> {
    let mut rows = Vec::with_capacity(left.record_count().max(right.record_count()));

    for key in left.keys() {
        let left_group = left.get(key).unwrap_or(&[]);
        match right.get(key) {
            Some(right_group) => {
                for &l in left_group {
                    for &r in right_group {
                        rows.push(JoinRow::both(l, r));
                    }
                }
            }
            None => rows.extend(left_group.iter().copied().map(JoinRow::left_only)),
        }
    }

    for key in right.keys() {
        if left.contains_key(key) {
            continue;
        }
        let right_group = right.get(key).unwrap_or(&[]);
        rows.extend(right_group.iter().copied().map(JoinRow::right_only));
    }

    rows
}
