use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::StartRejected;
use crate::geometry::{ItemBounds, ItemBox, Offset, Point};
use crate::pointer::PointerInput;
use crate::resolver::{
    DragFrame, IdleItem, ItemFlags, Reorder, classify_idle, compute_final_order, compute_shift,
    recompute_toggles, sample_items_gap,
};

/// State owned by one drag gesture, from press to release.
#[derive(Clone, Debug)]
pub struct Gesture<K> {
    items: Vec<K>,
    dragged_ix: usize,
    origin: Point,
    items_gap: f32,
    dragged_box: Option<ItemBox>,
    dragged_height: f32,
    offset: Offset,
    idle: Vec<IdleItem<K>>,
    /// Position of each idle item in `idle`.
    idle_ix: HashMap<K, usize>,
}

impl<K> Gesture<K> {
    pub fn dragged(&self) -> &K {
        &self.items[self.dragged_ix]
    }

    pub fn dragged_index(&self) -> usize {
        self.dragged_ix
    }

    /// The list as it was when the gesture started.
    pub fn items(&self) -> &[K] {
        &self.items
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn items_gap(&self) -> f32 {
        self.items_gap
    }

    /// Translation of the dragged item as of the last update.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn idle_items(&self) -> &[IdleItem<K>] {
        &self.idle
    }
}

impl<K: Eq + Hash> Gesture<K> {
    fn flags(&self, id: &K) -> Option<ItemFlags> {
        let ix = *self.idle_ix.get(id)?;
        self.idle.get(ix).map(|entry| entry.flags)
    }

    fn shift_for(&self, flags: ItemFlags) -> f32 {
        compute_shift(flags, self.dragged_height, self.items_gap)
    }
}

struct GestureHooks<K> {
    on_start: Option<Rc<dyn Fn(&K)>>,
    on_end: Option<Rc<dyn Fn(&K)>>,
}

impl<K> Default for GestureHooks<K> {
    fn default() -> Self {
        Self {
            on_start: None,
            on_end: None,
        }
    }
}

/// Drives a single list through `Idle -> Dragging -> Idle`.
///
/// At most one gesture exists at a time. Every method takes `&mut self`, so
/// updates and the commit for a gesture are serialized by ownership.
pub struct GestureTracker<K> {
    gesture: Option<Gesture<K>>,
    hooks: GestureHooks<K>,
}

impl<K> Default for GestureTracker<K> {
    fn default() -> Self {
        Self {
            gesture: None,
            hooks: GestureHooks::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> GestureTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after a gesture starts. Hosts typically disable page scrolling
    /// and text selection here.
    pub fn on_gesture_start(mut self, f: impl Fn(&K) + 'static) -> Self {
        self.hooks.on_start = Some(Rc::new(f));
        self
    }

    /// Called after a gesture is torn down, whether it was committed or
    /// cancelled.
    pub fn on_gesture_end(mut self, f: impl Fn(&K) + 'static) -> Self {
        self.hooks.on_end = Some(Rc::new(f));
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&Gesture<K>> {
        self.gesture.as_ref()
    }

    pub fn dragged(&self) -> Option<&K> {
        self.gesture.as_ref().map(Gesture::dragged)
    }

    /// Begin dragging `item`, pressed at `pointer`.
    ///
    /// `list` is the current order, `bounds` the live boxes of its items.
    pub fn start<B>(
        &mut self,
        item: &K,
        pointer: Point,
        list: &[K],
        bounds: &B,
    ) -> Result<(), StartRejected>
    where
        B: ItemBounds<K> + ?Sized,
    {
        if self.gesture.is_some() {
            tracing::debug!("drag start rejected: gesture already active");
            return Err(StartRejected::AlreadyDragging);
        }
        let Some(dragged_ix) = list.iter().position(|id| id == item) else {
            tracing::debug!(len = list.len(), "drag start rejected: item not in list");
            return Err(StartRejected::NotInList);
        };

        let items_gap = sample_items_gap(list, bounds);
        let dragged_box = bounds.item_box(item);
        let idle = classify_idle(list, dragged_ix);
        let idle_ix = idle
            .iter()
            .enumerate()
            .map(|(ix, entry)| (entry.id.clone(), ix))
            .collect();
        let gesture = Gesture {
            items: list.to_vec(),
            dragged_ix,
            origin: pointer,
            items_gap,
            dragged_box,
            dragged_height: dragged_box.map_or(0., |b| b.height()),
            offset: Offset::ZERO,
            idle,
            idle_ix,
        };
        tracing::debug!(dragged_ix, len = list.len(), items_gap, "drag gesture started");
        self.gesture = Some(gesture);

        if let Some(on_start) = self.hooks.on_start.as_ref() {
            on_start(item);
        }
        Ok(())
    }

    /// Feed a pointer sample. Returns the dragged item's translation, or
    /// `None` when no gesture is active.
    ///
    /// The dragged item's live box is its box at press time translated by
    /// the new offset. When the host had no box for it at press time, the box
    /// is read from `bounds` instead and must already include the translation.
    /// Idle item boxes are always read from `bounds`, as rendered at the
    /// shifts this tracker last reported.
    pub fn update<B>(&mut self, pointer: Point, bounds: &B) -> Option<Offset>
    where
        B: ItemBounds<K> + ?Sized,
    {
        let gesture = self.gesture.as_mut()?;
        gesture.offset = pointer.offset_from(gesture.origin);
        let rendered_height = gesture.dragged_height;

        let dragged = &gesture.items[gesture.dragged_ix];
        let live_box = match gesture.dragged_box {
            Some(pressed) => Some(pressed.translated(gesture.offset.y)),
            None => {
                let reported = bounds.item_box(dragged);
                if let Some(reported) = reported {
                    gesture.dragged_height = reported.height();
                }
                reported
            }
        };
        if let Some(dragged_box) = live_box {
            let frame = DragFrame {
                dragged_box,
                travel: gesture.offset.y,
                dragged_height: rendered_height,
                items_gap: gesture.items_gap,
            };
            let toggled = recompute_toggles(frame, &mut gesture.idle, bounds);
            tracing::trace!(
                offset_x = gesture.offset.x,
                offset_y = gesture.offset.y,
                toggled,
                "drag gesture updated"
            );
        }
        Some(gesture.offset)
    }

    /// Like [`update`](Self::update), for a tagged device sample. Samples
    /// without a position are ignored.
    pub fn update_input<B>(&mut self, input: &PointerInput, bounds: &B) -> Option<Offset>
    where
        B: ItemBounds<K> + ?Sized,
    {
        let pointer = input.position()?;
        self.update(pointer, bounds)
    }

    /// Commit the gesture: returns the new order and clears all state.
    pub fn end(&mut self) -> Option<Reorder<K>> {
        let gesture = self.gesture.take()?;
        let reorder = compute_final_order(&gesture.items, gesture.dragged_ix, &gesture.idle);
        if let Some(reorder) = reorder.as_ref() {
            tracing::debug!(
                from = reorder.from,
                to = reorder.to,
                "drag gesture committed"
            );
        }
        self.teardown(gesture);
        reorder
    }

    /// Abandon the gesture without committing an order. Returns whether a
    /// gesture was active.
    pub fn cancel(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        tracing::debug!(dragged_ix = gesture.dragged_ix, "drag gesture cancelled");
        self.teardown(gesture);
        true
    }

    fn teardown(&self, gesture: Gesture<K>) {
        if let Some(on_end) = self.hooks.on_end.as_ref() {
            on_end(gesture.dragged());
        }
    }

    /// Vertical shift to render an idle item at; zero for unknown items and
    /// for the dragged item.
    pub fn item_shift(&self, id: &K) -> f32 {
        self.gesture
            .as_ref()
            .and_then(|gesture| gesture.flags(id).map(|flags| gesture.shift_for(flags)))
            .unwrap_or(0.)
    }

    /// Translation to render any item at: the pointer offset for the dragged
    /// item, the vertical shift for idle items.
    pub fn item_offset(&self, id: &K) -> Offset {
        match self.gesture.as_ref() {
            Some(gesture) if gesture.dragged() == id => gesture.offset,
            Some(_) => Offset::vertical(self.item_shift(id)),
            None => Offset::ZERO,
        }
    }

    /// Shift of every idle item, in original order.
    pub fn shifts(&self) -> impl Iterator<Item = (&K, f32)> + '_ {
        self.gesture.iter().flat_map(|gesture| {
            gesture
                .idle
                .iter()
                .map(move |entry| (&entry.id, gesture.shift_for(entry.flags)))
        })
    }

    pub fn items_gap(&self) -> Option<f32> {
        self.gesture.as_ref().map(Gesture::items_gap)
    }

    pub fn offset(&self) -> Option<Offset> {
        self.gesture.as_ref().map(Gesture::offset)
    }

    pub fn is_above(&self, id: &K) -> Option<bool> {
        self.gesture.as_ref()?.flags(id).map(|flags| flags.is_above)
    }

    pub fn is_toggled(&self, id: &K) -> Option<bool> {
        self.gesture.as_ref()?.flags(id).map(|flags| flags.is_toggled)
    }
}
