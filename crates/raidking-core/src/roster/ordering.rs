//! Manual reordering and the suicide king rotation.
//!
//! Both operations borrow their input and return a fresh sequence, so a
//! rejected operation can never leave a roster half-updated.

use tracing::debug;

use super::RosterEntry;
use crate::error::RosterError;
use crate::models::PlayerId;

fn position<E: RosterEntry>(entries: &[E], id: &PlayerId) -> Option<usize> {
    entries.iter().position(|e| e.id() == id)
}

/// Exchange the order keys of two entries and re-sort by order key.
///
/// Only the two keys change; the rest of the roster is not renumbered.
/// The sort is stable, so entries with equal keys keep their relative
/// position.
///
/// # Errors
/// `RosterError::InvalidReorder` if the ids are equal or either id is not in
/// `entries`.
pub fn manual_swap<E: RosterEntry>(
    entries: &[E],
    id_a: &PlayerId,
    id_b: &PlayerId,
) -> Result<Vec<E>, RosterError> {
    if id_a == id_b {
        return Err(RosterError::same_entry(id_a));
    }
    let a = position(entries, id_a).ok_or_else(|| RosterError::missing_entry(id_a))?;
    let b = position(entries, id_b).ok_or_else(|| RosterError::missing_entry(id_b))?;

    let mut swapped = entries.to_vec();
    let order_a = swapped[a].order();
    let order_b = swapped[b].order();
    swapped[a].set_order(order_b);
    swapped[b].set_order(order_a);
    swapped.sort_by_key(|e| e.order());

    debug!(a = %id_a, b = %id_b, order_a, order_b, "Swapped order keys");
    Ok(swapped)
}

/// Send a present entry to the back of the present queue.
///
/// Present entries keep their mutual order apart from the target, which moves
/// behind all of them. Absent and missing entries stay in the exact slots they
/// held. Every order key is then renumbered to its 1-based position.
///
/// If the target is not in `entries`, or is not present, the input is
/// returned unchanged.
pub fn suicide_king_rotate<E: RosterEntry>(entries: &[E], target: &PlayerId) -> Vec<E> {
    let is_present_target = entries
        .iter()
        .find(|e| e.id() == target)
        .map(|e| e.status().is_present())
        .unwrap_or(false);
    if !is_present_target {
        debug!(target = %target, "Rotation skipped: target missing or not present");
        return entries.to_vec();
    }

    let mut present: Vec<&E> = entries.iter().filter(|e| e.status().is_present()).collect();
    if let Some(idx) = present.iter().position(|e| e.id() == target) {
        let moved = present.remove(idx);
        present.push(moved);
    }

    // Refill the originally-present slots from the rotated queue
    let mut queue = present.into_iter();
    let mut rotated: Vec<E> = entries
        .iter()
        .map(|original| {
            if original.status().is_present() {
                queue.next().unwrap_or(original).clone()
            } else {
                original.clone()
            }
        })
        .collect();

    renumber(&mut rotated);
    debug!(target = %target, len = rotated.len(), "Suicide king rotation applied");
    rotated
}

/// Set every entry's order key to its 1-based position
pub fn renumber<E: RosterEntry>(entries: &mut [E]) {
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.set_order(i as u32 + 1);
    }
}

/// True if the order keys, in sequence order, are exactly 1..N
pub fn is_dense<E: RosterEntry>(entries: &[E]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, e)| e.order() == i as u32 + 1)
}

// ============================================================================
// Tests
// ============================================================================
