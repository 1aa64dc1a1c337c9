//! Layout resolution for an in-progress drag.
//!
//! Everything here is a pure function of the current geometry and the
//! per-item flags: which idle items have been crossed by the dragged item,
//! how far each one shifts, and the order the list takes on commit.
//!
//! The commit order is a projection: the dragged item is never moved in
//! storage while the gesture is live. Each idle item lands either in its own
//! slot or one slot towards the dragged item's original slot, and the dragged
//! item takes the single slot left free.

use crate::geometry::{ItemBounds, ItemBox};

/// Per-idle-item state for one gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    /// Item precedes the dragged item in the pre-gesture order. Fixed for the
    /// lifetime of the gesture.
    pub is_above: bool,
    /// The dragged item's center has crossed this item's center.
    pub is_toggled: bool,
}

/// An idle item together with its original index and flags.
#[derive(Clone, Debug, PartialEq)]
pub struct IdleItem<K> {
    pub id: K,
    pub index: usize,
    pub flags: ItemFlags,
}

/// The committed outcome of a gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct Reorder<K> {
    /// The dragged item.
    pub item: K,
    /// Index of `item` before the gesture.
    pub from: usize,
    /// Index of `item` in `order`.
    pub to: usize,
    /// The full list in its committed order.
    pub order: Vec<K>,
}

impl<K> Reorder<K> {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// Apply the same permutation to storage that is parallel to the list
    /// the gesture was started on.
    pub fn apply_to<T>(&self, storage: &mut Vec<T>) {
        if self.is_noop() || self.from >= storage.len() || self.to >= storage.len() {
            return;
        }
        let moved = storage.remove(self.from);
        storage.insert(self.to, moved);
    }
}

/// Splits `items` into idle entries, marking those before `dragged_ix` as
/// above.
pub fn classify_idle<K: Clone>(items: &[K], dragged_ix: usize) -> Vec<IdleItem<K>> {
    items
        .iter()
        .enumerate()
        .filter(|(ix, _)| *ix != dragged_ix)
        .map(|(index, id)| IdleItem {
            id: id.clone(),
            index,
            flags: ItemFlags {
                is_above: index < dragged_ix,
                is_toggled: false,
            },
        })
        .collect()
}

/// Crossing rule for a single idle item.
///
/// An item above toggles once the dragged center has risen to its center, an
/// item below once the dragged center has descended to it. Equal centers
/// count as crossed.
pub fn is_toggled(dragged_center: f32, item_center: f32, is_above: bool) -> bool {
    if is_above {
        dragged_center <= item_center
    } else {
        dragged_center >= item_center
    }
}

/// The dragged item as seen by one pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragFrame {
    /// Live box of the dragged item, already translated by the pointer.
    pub dragged_box: ItemBox,
    /// Vertical pointer travel since the press.
    pub travel: f32,
    /// Height of the dragged item the idle boxes were laid out with.
    pub dragged_height: f32,
    pub items_gap: f32,
}

/// Reclassify every idle item against the dragged item's live box.
///
/// Idle boxes are read as rendered, so each one's current shift is taken
/// off before comparing: crossings are measured against resting centers.
/// An item above only toggles while the pointer is above its press point,
/// an item below only while it is below, so zero travel toggles nothing
/// even when centers coincide. Items the host has no box for keep their
/// previous toggle state. Returns the number of toggled items.
pub fn recompute_toggles<K, B>(frame: DragFrame, idle: &mut [IdleItem<K>], bounds: &B) -> usize
where
    B: ItemBounds<K> + ?Sized,
{
    let dragged_center = frame.dragged_box.center_y();
    let mut toggled = 0;
    for entry in idle.iter_mut() {
        if let Some(item_box) = bounds.item_box(&entry.id) {
            let shift = compute_shift(entry.flags, frame.dragged_height, frame.items_gap);
            let resting_center = item_box.center_y() - shift;
            let is_above = entry.flags.is_above;
            let moved_toward = if is_above {
                frame.travel < 0.
            } else {
                frame.travel > 0.
            };
            entry.flags.is_toggled =
                moved_toward && is_toggled(dragged_center, resting_center, is_above);
        }
        if entry.flags.is_toggled {
            toggled += 1;
        }
    }
    toggled
}

/// Vertical translation of an idle item.
///
/// Toggled items move by the dragged item's height plus one gap: down when
/// above (into the vacated slot), up when below. Untoggled items sit at zero.
pub fn compute_shift(flags: ItemFlags, dragged_height: f32, items_gap: f32) -> f32 {
    if !flags.is_toggled {
        return 0.;
    }
    let direction = if flags.is_above { 1. } else { -1. };
    direction * (dragged_height + items_gap)
}

/// Uniform spacing between consecutive items, measured at gesture start.
///
/// `items` includes the dragged item, which has not moved yet, so the first
/// adjacent pair with known boxes gives the spacing. Zero when fewer than two
/// idle items exist or no adjacent pair can be measured.
pub fn sample_items_gap<K, B>(items: &[K], bounds: &B) -> f32
where
    B: ItemBounds<K> + ?Sized,
{
    let idle_count = items.len().saturating_sub(1);
    if idle_count < 2 {
        return 0.;
    }

    items
        .windows(2)
        .find_map(|pair| {
            let first = bounds.item_box(&pair[0])?;
            let second = bounds.item_box(&pair[1])?;
            Some((second.top - first.bottom).abs())
        })
        .unwrap_or(0.)
}

/// Toggle state reduced to what a single drop point can produce.
///
/// Only the run of toggled items adjacent to the dragged slot counts. When
/// both an above run and a below run exist the longer wins; equal runs
/// cancel out.
fn effective_toggles<K>(len: usize, dragged_ix: usize, idle: &[IdleItem<K>]) -> Vec<bool> {
    let mut toggled = vec![false; len];
    for entry in idle {
        if entry.index < len && entry.index != dragged_ix {
            toggled[entry.index] = entry.flags.is_toggled;
        }
    }

    let mut above_run = (0..dragged_ix.min(len))
        .rev()
        .take_while(|&ix| toggled[ix])
        .count();
    let mut below_run = (dragged_ix + 1..len).take_while(|&ix| toggled[ix]).count();
    if above_run > 0 && below_run > 0 {
        if above_run > below_run {
            below_run = 0;
        } else if below_run > above_run {
            above_run = 0;
        } else {
            above_run = 0;
            below_run = 0;
        }
    }

    let mut effective = vec![false; len];
    for ix in dragged_ix.saturating_sub(above_run)..dragged_ix {
        effective[ix] = true;
    }
    for ix in dragged_ix + 1..(dragged_ix + 1 + below_run).min(len) {
        effective[ix] = true;
    }
    effective
}

/// Target slot for every idle item, with the one unfilled slot returned
/// separately. `None` when the slot map is not a bijection missing exactly
/// one slot.
fn assign_slots<K: Clone>(
    len: usize,
    idle: &[IdleItem<K>],
    effective: &[bool],
) -> Option<(Vec<Option<K>>, usize)> {
    let mut slots: Vec<Option<K>> = vec![None; len];
    for entry in idle {
        let toggled = *effective.get(entry.index)?;
        let slot = match (toggled, entry.flags.is_above) {
            (false, _) => entry.index,
            (true, true) => entry.index + 1,
            (true, false) => entry.index.checked_sub(1)?,
        };
        let cell = slots.get_mut(slot)?;
        if cell.is_some() {
            return None;
        }
        *cell = Some(entry.id.clone());
    }

    let mut free = slots.iter().enumerate().filter(|(_, cell)| cell.is_none());
    let (free_slot, _) = free.next()?;
    if free.next().is_some() {
        return None;
    }
    Some((slots, free_slot))
}

/// Commit-time permutation of `items`.
///
/// `idle` must hold one entry per item other than `items[dragged_ix]`. If the
/// entries do not describe a valid slot map the original order is kept.
/// Returns `None` only when `dragged_ix` is out of range.
pub fn compute_final_order<K: Clone>(
    items: &[K],
    dragged_ix: usize,
    idle: &[IdleItem<K>],
) -> Option<Reorder<K>> {
    let item = items.get(dragged_ix)?.clone();
    let len = items.len();
    let effective = effective_toggles(len, dragged_ix, idle);

    let Some((slots, to)) = assign_slots(len, idle, &effective) else {
        debug_assert!(false, "idle items do not leave exactly one free slot");
        tracing::warn!(
            len,
            dragged_ix,
            idle = idle.len(),
            "slot map is not a permutation; keeping original order"
        );
        return Some(Reorder {
            item,
            from: dragged_ix,
            to: dragged_ix,
            order: items.to_vec(),
        });
    };

    let order = slots
        .into_iter()
        .map(|cell| cell.unwrap_or_else(|| item.clone()))
        .collect();

    Some(Reorder {
        item,
        from: dragged_ix,
        to,
        order,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn idle_with(
        items: &[&'static str],
        dragged_ix: usize,
        toggled: &[&str],
    ) -> Vec<IdleItem<&'static str>> {
        let mut idle = classify_idle(items, dragged_ix);
        for entry in idle.iter_mut() {
            entry.flags.is_toggled = toggled.contains(&entry.id);
        }
        idle
    }

    fn stacked(items: &[&'static str], height: f32, gap: f32) -> HashMap<&'static str, ItemBox> {
        items
            .iter()
            .enumerate()
            .map(|(ix, id)| (*id, ItemBox::from_top(ix as f32 * (height + gap), height)))
            .collect()
    }

    #[test]
    fn classify_marks_items_before_dragged_as_above() {
        let idle = classify_idle(&["A", "B", "C", "D"], 2);
        let above: Vec<_> = idle
            .iter()
            .map(|e| (e.id, e.index, e.flags.is_above))
            .collect();
        assert_eq!(above, vec![("A", 0, true), ("B", 1, true), ("D", 3, false)]);
        assert!(idle.iter().all(|e| !e.flags.is_toggled));
    }

    #[test]
    fn crossing_is_asymmetric_and_inclusive() {
        assert!(is_toggled(50., 50., true));
        assert!(is_toggled(50., 50., false));
        assert!(is_toggled(40., 50., true));
        assert!(!is_toggled(60., 50., true));
        assert!(is_toggled(60., 50., false));
        assert!(!is_toggled(40., 50., false));
    }

    #[test]
    fn shift_follows_direction_and_resets() {
        let above = ItemFlags {
            is_above: true,
            is_toggled: true,
        };
        let below = ItemFlags {
            is_above: false,
            is_toggled: true,
        };
        assert_eq!(compute_shift(above, 30., 4.), 34.);
        assert_eq!(compute_shift(below, 30., 4.), -34.);
        assert_eq!(compute_shift(ItemFlags::default(), 30., 4.), 0.);
        assert_eq!(compute_shift(below, 0., 0.), 0.);
    }

    #[test]
    fn gap_is_zero_below_two_idle_items() {
        let items = ["A", "B"];
        let bounds = stacked(&items, 20., 8.);
        assert_eq!(sample_items_gap(&items, &bounds), 0.);
        assert_eq!(sample_items_gap(&["A"], &bounds), 0.);
    }

    #[test]
    fn gap_is_measured_from_first_adjacent_pair() {
        let items = ["A", "B", "C", "D"];
        let bounds = stacked(&items, 20., 8.);
        assert_eq!(sample_items_gap(&items, &bounds), 8.);

        let partial: HashMap<_, _> = bounds
            .into_iter()
            .filter(|(id, _)| *id != "A")
            .collect();
        assert_eq!(sample_items_gap(&items, &partial), 8.);
    }

    #[test]
    fn gap_without_geometry_is_zero() {
        let none = |_: &&str| None;
        assert_eq!(sample_items_gap(&["A", "B", "C"], &none), 0.);
    }

    fn frame(dragged_box: ItemBox, travel: f32, height: f32) -> DragFrame {
        DragFrame {
            dragged_box,
            travel,
            dragged_height: height,
            items_gap: 0.,
        }
    }

    #[test]
    fn toggles_follow_dragged_center() {
        let items = ["A", "B", "C", "D"];
        let bounds = stacked(&items, 20., 0.);
        let mut idle = classify_idle(&items, 1);

        // B (top 20) dragged 25px down: center 55 crosses C's center (50).
        let moved = frame(bounds["B"].translated(25.), 25., 20.);
        let count = recompute_toggles(moved, &mut idle, &bounds);
        assert_eq!(count, 1);
        let toggled: Vec<_> = idle
            .iter()
            .filter(|e| e.flags.is_toggled)
            .map(|e| e.id)
            .collect();
        assert_eq!(toggled, vec!["C"]);

        // Back to the start: nothing stays toggled.
        recompute_toggles(frame(bounds["B"], 0., 20.), &mut idle, &bounds);
        assert!(idle.iter().all(|e| !e.flags.is_toggled));
    }

    #[test]
    fn shifted_items_are_compared_at_rest() {
        let items = ["A", "B", "C"];
        let mut bounds = stacked(&items, 20., 0.);
        let mut idle = idle_with(&items, 0, &["B"]);
        // B is rendered one slot up, into A's slot.
        bounds.insert("B", bounds["B"].translated(-20.));

        // A's center at 25 is below B's rendered center (10) but short of its
        // resting center (30), so B springs back.
        let dragged = frame(bounds["A"].translated(15.), 15., 20.);
        let count = recompute_toggles(dragged, &mut idle, &bounds);
        assert_eq!(count, 0);
    }

    #[test]
    fn zero_travel_never_toggles_coincident_centers() {
        let items = ["A", "B", "C"];
        let bounds: HashMap<_, _> = items
            .iter()
            .map(|id| (*id, ItemBox::from_top(10., 0.)))
            .collect();
        let mut idle = classify_idle(&items, 1);
        let count = recompute_toggles(frame(bounds["B"], 0., 0.), &mut idle, &bounds);
        assert_eq!(count, 0);

        let count = recompute_toggles(frame(bounds["B"], 1., 0.), &mut idle, &bounds);
        assert_eq!(count, 1);
        assert!(idle[1].flags.is_toggled);
    }

    #[test]
    fn items_without_boxes_keep_previous_state() {
        let items = ["A", "B", "C"];
        let mut idle = idle_with(&items, 0, &["B"]);
        let only_c = |id: &&str| (*id == "C").then(|| ItemBox::new(100., 120.));
        recompute_toggles(frame(ItemBox::new(0., 20.), 0., 20.), &mut idle, &only_c);
        assert!(idle[0].flags.is_toggled);
        assert!(!idle[1].flags.is_toggled);
    }

    #[test]
    fn drag_down_past_one_item() {
        let items = ["A", "B", "C", "D"];
        let idle = idle_with(&items, 1, &["C"]);
        let reorder = compute_final_order(&items, 1, &idle).unwrap();
        assert_eq!(reorder.order, vec!["A", "C", "B", "D"]);
        assert_eq!((reorder.item, reorder.from, reorder.to), ("B", 1, 2));
    }

    #[test]
    fn drag_up_past_one_item() {
        let items = ["A", "B", "C", "D"];
        let idle = idle_with(&items, 2, &["B"]);
        let reorder = compute_final_order(&items, 2, &idle).unwrap();
        assert_eq!(reorder.order, vec!["A", "C", "B", "D"]);
        assert_eq!((reorder.from, reorder.to), (2, 1));
    }

    #[test]
    fn drag_to_top_and_bottom() {
        let items = ["A", "B", "C", "D"];
        let idle = idle_with(&items, 3, &["A", "B", "C"]);
        let up = compute_final_order(&items, 3, &idle).unwrap();
        assert_eq!(up.order, vec!["D", "A", "B", "C"]);
        assert_eq!(up.to, 0);

        let idle = idle_with(&items, 0, &["B", "C", "D"]);
        let down = compute_final_order(&items, 0, &idle).unwrap();
        assert_eq!(down.order, vec!["B", "C", "D", "A"]);
        assert_eq!(down.to, 3);
    }

    #[test]
    fn no_toggles_is_identity() {
        let items = ["A", "B", "C"];
        let reorder = compute_final_order(&items, 1, &idle_with(&items, 1, &[])).unwrap();
        assert!(reorder.is_noop());
        assert_eq!(reorder.order, items.to_vec());
    }

    #[test]
    fn single_item_lands_in_slot_zero() {
        let reorder = compute_final_order(&["A"], 0, &[]).unwrap();
        assert_eq!(reorder.order, vec!["A"]);
        assert_eq!(reorder.to, 0);
    }

    #[test]
    fn detached_toggles_are_ignored() {
        let items = ["A", "B", "C", "D", "E"];
        // D toggled but C (between B and D) is not: only a contiguous run moves.
        let reorder = compute_final_order(&items, 1, &idle_with(&items, 1, &["D"])).unwrap();
        assert_eq!(reorder.order, items.to_vec());

        let reorder = compute_final_order(&items, 1, &idle_with(&items, 1, &["C", "E"])).unwrap();
        assert_eq!(reorder.order, vec!["A", "C", "B", "D", "E"]);
    }

    #[test]
    fn opposing_runs_resolve_to_longer_run() {
        let items = ["A", "B", "C", "D", "E"];
        let idle = idle_with(&items, 2, &["B", "D", "E"]);
        let reorder = compute_final_order(&items, 2, &idle).unwrap();
        assert_eq!(reorder.order, vec!["A", "B", "D", "E", "C"]);

        let tie = compute_final_order(&items, 2, &idle_with(&items, 2, &["B", "D"])).unwrap();
        assert_eq!(tie.order, items.to_vec());
    }

    #[test]
    fn out_of_range_dragged_index_has_no_order() {
        assert_eq!(compute_final_order::<&str>(&["A"], 1, &[]), None);
    }

    #[test]
    fn apply_to_matches_committed_order() {
        let items = ["A", "B", "C", "D"];
        let idle = idle_with(&items, 0, &["B", "C"]);
        let reorder = compute_final_order(&items, 0, &idle).unwrap();
        let mut storage = vec![10, 20, 30, 40];
        reorder.apply_to(&mut storage);
        assert_eq!(storage, vec![20, 30, 10, 40]);
        assert_eq!(reorder.order, vec!["B", "C", "A", "D"]);
    }
}
