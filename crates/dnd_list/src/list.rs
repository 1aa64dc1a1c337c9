use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gpui::{
    App, Bounds, Context, CursorStyle, ElementId, Entity, FocusHandle, InteractiveElement as _,
    IntoElement, Modifiers, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent,
    ParentElement as _, Pixels, Render, RenderOnce, ScrollHandle, ScrollWheelEvent, SharedString,
    StatefulInteractiveElement as _, StyleRefinement, Styled, Window, canvas, div,
    prelude::FluentBuilder as _, px,
};
use gpui_component::list::ListItem;
use gpui_component::{ActiveTheme as _, StyledExt as _, v_flex};
use gpui_dnd_core::{GestureTracker, ItemBox, Point as DragPoint, PointerInput, Reorder};

use crate::motion::RowMotions;

const CONTEXT: &str = "DndList";

/// Create a [`DndList`].
pub fn dnd_list<T, R>(state: &Entity<DndListState<T>>, render_item: R) -> DndList<T>
where
    T: 'static,
    R: Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    DndList::new(state, render_item)
}

/// A single item in a [`DndListState`].
#[derive(Clone)]
pub struct DndListItem<T> {
    pub id: SharedString,
    pub label: SharedString,
    pub data: T,
    disabled: bool,
}

impl<T> DndListItem<T> {
    pub fn new(id: impl Into<SharedString>, label: impl Into<SharedString>, data: T) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            disabled: false,
        }
    }

    /// Disabled items cannot be picked up, but still make room for others.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DndListRowState {
    pub selected: bool,
    /// The row is the one being dragged.
    pub dragging: bool,
    /// The row has moved aside to make room for the dragged row.
    pub displaced: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DndListReorder {
    pub item_id: SharedString,
    pub from: usize,
    pub to: usize,
}

impl From<&Reorder<SharedString>> for DndListReorder {
    fn from(reorder: &Reorder<SharedString>) -> Self {
        Self {
            item_id: reorder.item.clone(),
            from: reorder.from,
            to: reorder.to,
        }
    }
}

struct DndListStateCallbacks<T> {
    can_drop: Option<Rc<dyn Fn(&DndListReorder, &[DndListItem<T>], Modifiers) -> bool>>,
    on_reorder: Option<Rc<dyn Fn(&DndListReorder, &[DndListItem<T>])>>,
}

impl<T> Default for DndListStateCallbacks<T> {
    fn default() -> Self {
        Self {
            can_drop: None,
            on_reorder: None,
        }
    }
}

/// State for a draggable, reorderable list.
///
/// Rows follow the pointer while held; the rows in between slide aside, and
/// the new order is applied on release.
pub struct DndListState<T> {
    focus_handle: FocusHandle,
    items: Vec<DndListItem<T>>,
    drag_handle_width: Option<Pixels>,
    row_gap: Pixels,
    selected_ix: Option<usize>,
    /// Resting slot of every row, before any drag shift.
    row_bounds: HashMap<SharedString, ItemBox>,
    scroll_handle: ScrollHandle,
    tracker: GestureTracker<SharedString>,
    motions: RowMotions<SharedString>,
    callbacks: DndListStateCallbacks<T>,
    render_item:
        Rc<dyn Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> ListItem>,
}

impl<T: 'static> DndListState<T> {
    pub fn new(cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            items: Vec::new(),
            drag_handle_width: Some(px(32.)),
            row_gap: px(4.),
            selected_ix: None,
            row_bounds: HashMap::new(),
            scroll_handle: ScrollHandle::new(),
            tracker: GestureTracker::new(),
            motions: RowMotions::new(Duration::from_millis(150)),
            callbacks: DndListStateCallbacks::default(),
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("dnd-list-empty")),
        }
    }

    pub fn items(mut self, items: impl Into<Vec<DndListItem<T>>>) -> Self {
        self.items = items.into();
        self
    }

    /// Restrict drag start to a left-side handle area with the given width.
    pub fn drag_handle_width(mut self, width: Pixels) -> Self {
        self.drag_handle_width = Some(width);
        self
    }

    /// Allow dragging from anywhere on the row.
    pub fn drag_on_row(mut self) -> Self {
        self.drag_handle_width = None;
        self
    }

    /// Vertical spacing between rows.
    pub fn row_gap(mut self, gap: Pixels) -> Self {
        self.row_gap = gap;
        self
    }

    /// How long displaced rows take to slide into place.
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.motions.set_duration(duration);
        self
    }

    /// Replace the items. Any drag in progress is abandoned.
    pub fn set_items(&mut self, items: impl Into<Vec<DndListItem<T>>>, cx: &mut Context<Self>) {
        self.tracker.cancel();
        self.motions.clear();
        self.items = items.into();
        self.selected_ix = None;
        self.row_bounds.clear();
        cx.notify();
    }

    pub fn items_ref(&self) -> &[DndListItem<T>] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_ix
    }

    pub fn set_selected_index(&mut self, ix: Option<usize>, cx: &mut Context<Self>) {
        self.selected_ix = ix;
        cx.notify();
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    pub fn dragged_id(&self) -> Option<&SharedString> {
        self.tracker.dragged()
    }

    pub fn scroll_handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Provide a predicate to control whether a reorder is allowed.
    ///
    /// The predicate receives:
    /// - `reorder`: the proposed reorder (`from` is the dragged index in the pre-drop list,
    ///   `to` is the destination index in the post-drop list)
    /// - `items`: current items slice
    /// - `modifiers`: keyboard modifiers at release
    pub fn can_drop(
        mut self,
        can_drop: impl Fn(&DndListReorder, &[DndListItem<T>], Modifiers) -> bool + 'static,
    ) -> Self {
        self.callbacks.can_drop = Some(Rc::new(can_drop));
        self
    }

    /// Provide a callback invoked after a successful reorder.
    pub fn on_reorder(
        mut self,
        on_reorder: impl Fn(&DndListReorder, &[DndListItem<T>]) + 'static,
    ) -> Self {
        self.callbacks.on_reorder = Some(Rc::new(on_reorder));
        self
    }

    /// Called when a row is picked up.
    pub fn on_drag_start(mut self, f: impl Fn(&SharedString) + 'static) -> Self {
        self.tracker = std::mem::take(&mut self.tracker).on_gesture_start(f);
        self
    }

    /// Called when the held row is released, whether or not the order changed.
    pub fn on_drag_end(mut self, f: impl Fn(&SharedString) + 'static) -> Self {
        self.tracker = std::mem::take(&mut self.tracker).on_gesture_end(f);
        self
    }

    /// Selection is resolved by id: a click that ends a drag lands after the
    /// rows have been reordered.
    fn on_entry_click(
        &mut self,
        id: &SharedString,
        _event: &gpui::ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.selected_ix = self.items.iter().position(|item| &item.id == id);
        cx.notify();
    }

    fn record_row_bounds(&mut self, id: SharedString, bounds: Bounds<Pixels>) {
        self.row_bounds.insert(id, item_box(bounds));
    }

    fn on_row_mouse_down(
        &mut self,
        ix: usize,
        event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(item) = self.items.get(ix) else {
            return;
        };
        if item.is_disabled() {
            return;
        }

        let ids = item_ids(&self.items);
        let pointer = drag_point(event.position);
        if let Err(err) = self.tracker.start(&item.id, pointer, &ids, &self.row_bounds) {
            tracing::debug!(%err, ix, "dnd list: press ignored");
            return;
        }

        self.selected_ix = Some(ix);
        cx.stop_propagation();
        cx.notify();
    }

    fn on_pointer_move(&mut self, event: &MouseMoveEvent, cx: &mut Context<Self>) {
        if !self.tracker.is_dragging() {
            return;
        }
        if button_released(event.pressed_button) {
            // The release was delivered before our listeners saw it.
            self.release(event.modifiers, cx);
            return;
        }

        let live = live_bounds(&self.row_bounds, &self.tracker);
        let pointer = PointerInput::from(drag_point(event.position));
        if self.tracker.update_input(&pointer, &live).is_some() {
            cx.notify();
        }
    }

    fn release(&mut self, modifiers: Modifiers, cx: &mut Context<Self>) {
        let Some(reorder) = self.tracker.end() else {
            return;
        };
        self.motions.clear();
        cx.notify();
        if reorder.is_noop() {
            return;
        }

        let proposal = DndListReorder::from(&reorder);
        if !self.drop_is_allowed(&proposal, modifiers) {
            tracing::debug!(item = %proposal.item_id, "dnd list: drop vetoed");
            return;
        }

        reorder.apply_to(&mut self.items);
        self.selected_ix = Some(proposal.to);
        tracing::debug!(
            item = %proposal.item_id,
            from = proposal.from,
            to = proposal.to,
            "dnd list: reorder committed"
        );

        if let Some(on_reorder) = self.callbacks.on_reorder.as_ref() {
            on_reorder(&proposal, &self.items);
        }
    }

    fn drop_is_allowed(&self, reorder: &DndListReorder, modifiers: Modifiers) -> bool {
        self.callbacks
            .can_drop
            .as_ref()
            .map(|f| f(reorder, &self.items, modifiers))
            .unwrap_or(true)
    }

    /// Window-level pointer listeners, registered on every paint so a release
    /// that arrives right after the press is still seen. While a row is held
    /// they also swallow wheel scrolling.
    fn pointer_listeners(state: Entity<Self>) -> impl IntoElement {
        canvas(
            |_, _, _| {},
            move |_, _, window, _| {
                window.on_mouse_event({
                    let state = state.clone();
                    move |event: &MouseMoveEvent, phase, _window, cx| {
                        if !phase.bubble() {
                            return;
                        }
                        state.update(cx, |this, cx| this.on_pointer_move(event, cx));
                    }
                });

                window.on_mouse_event({
                    let state = state.clone();
                    move |event: &MouseUpEvent, phase, _window, cx| {
                        if !phase.bubble() || event.button != MouseButton::Left {
                            return;
                        }
                        state.update(cx, |this, cx| this.release(event.modifiers, cx));
                    }
                });

                window.on_mouse_event(move |_: &ScrollWheelEvent, phase, _window, cx| {
                    if phase.capture() && state.read(cx).is_dragging() {
                        cx.stop_propagation();
                    }
                });
            },
        )
        .absolute()
        .size_full()
    }
}

fn item_ids<T>(items: &[DndListItem<T>]) -> Vec<SharedString> {
    items.iter().map(|item| item.id.clone()).collect()
}

fn drag_point(position: gpui::Point<Pixels>) -> DragPoint {
    DragPoint::new(f32::from(position.x), f32::from(position.y))
}

fn item_box(bounds: Bounds<Pixels>) -> ItemBox {
    ItemBox::new(f32::from(bounds.top()), f32::from(bounds.bottom()))
}

/// Row boxes as the tracker last laid them out: each resting slot moved by
/// the row's target offset.
fn live_bounds(
    resting: &HashMap<SharedString, ItemBox>,
    tracker: &GestureTracker<SharedString>,
) -> HashMap<SharedString, ItemBox> {
    resting
        .iter()
        .map(|(id, slot)| (id.clone(), slot.translated(tracker.item_offset(id).y)))
        .collect()
}

fn button_released(pressed: Option<MouseButton>) -> bool {
    pressed != Some(MouseButton::Left)
}

impl<T: 'static> Render for DndListState<T> {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let drag_handle_width = self.drag_handle_width;
        let drag_border = cx.theme().drag_border;
        let row_bg = cx.theme().background;

        let now = Instant::now();
        let mut animating = false;
        let mut rows = Vec::with_capacity(self.items.len());
        for (ix, item) in self.items.iter().enumerate() {
            let target = self.tracker.item_offset(&item.id);
            let is_dragged = self.tracker.dragged() == Some(&item.id);
            let row_state = DndListRowState {
                selected: Some(ix) == self.selected_ix,
                dragging: is_dragged,
                displaced: !is_dragged && target.y != 0.,
            };
            let (offset_x, offset_y) = if is_dragged {
                (target.x, target.y)
            } else {
                let (shift, moving) = self.motions.shift(&item.id, target.y, now);
                animating |= moving;
                (0., shift)
            };

            let list_item = (render_item)(ix, item, row_state, window, cx);
            let is_disabled = item.is_disabled();
            let slot_bounds = canvas(
                {
                    let state = state_entity.clone();
                    let id = item.id.clone();
                    move |bounds, _window, cx| {
                        state.update(cx, |this, _| this.record_row_bounds(id, bounds));
                    }
                },
                |_, _, _, _| {},
            )
            .absolute()
            .size_full();

            let row = div()
                .id(ix)
                .relative()
                .top(px(offset_y))
                .left(px(offset_x))
                .child(list_item.disabled(is_disabled).selected(row_state.selected))
                .when(is_dragged, |this| {
                    this.bg(row_bg)
                        .border_1()
                        .border_color(drag_border)
                        .rounded(px(6.))
                        .shadow_md()
                        .cursor(CursorStyle::ClosedHand)
                })
                .when(!is_disabled, |this| {
                    let id = item.id.clone();
                    this.on_click(cx.listener(move |this, click_event, window, cx| {
                        this.on_entry_click(&id, click_event, window, cx);
                    }))
                })
                .when(!is_disabled, |this| match drag_handle_width {
                    Some(handle_width) => this.child(
                        div()
                            .id(("dnd-list-handle", ix))
                            .absolute()
                            .top_0()
                            .left_0()
                            .bottom_0()
                            .w(handle_width)
                            .cursor(CursorStyle::OpenHand)
                            .on_mouse_down(
                                MouseButton::Left,
                                cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                                    this.on_row_mouse_down(ix, event, window, cx);
                                }),
                            ),
                    ),
                    None => this.cursor(CursorStyle::OpenHand).on_mouse_down(
                        MouseButton::Left,
                        cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                            this.on_row_mouse_down(ix, event, window, cx);
                        }),
                    ),
                });

            // Slot bounds are taken from the untranslated wrapper so recorded bounds stay
            // at rest while the row itself moves.
            rows.push(div().relative().child(slot_bounds).child(row));
        }
        if animating {
            window.request_animation_frame();
        }

        div()
            .id("dnd-list-state")
            .size_full()
            .relative()
            .child(
                v_flex()
                    .id("dnd-list-rows")
                    .size_full()
                    .gap(self.row_gap)
                    .track_scroll(&self.scroll_handle)
                    .overflow_y_scroll()
                    .children(rows),
            )
            .child(Self::pointer_listeners(state_entity))
    }
}

/// A draggable list element that supports drag-and-drop reordering.
#[derive(IntoElement)]
pub struct DndList<T: 'static> {
    id: ElementId,
    state: Entity<DndListState<T>>,
    style: StyleRefinement,
    render_item:
        Rc<dyn Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> ListItem>,
}

impl<T: 'static> DndList<T> {
    pub fn new<R>(state: &Entity<DndListState<T>>, render_item: R) -> Self
    where
        R: Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-list-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(move |ix, item, row_state, window, cx| {
                render_item(ix, item, row_state, window, cx)
            }),
        }
    }
}

impl<T: 'static> Styled for DndList<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: 'static> RenderOnce for DndList<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: f32 = 28.;
    const GAP: f32 = 4.;

    fn items() -> Vec<DndListItem<&'static str>> {
        vec![
            DndListItem::new("A", "A", "A"),
            DndListItem::new("B", "B", "B"),
            DndListItem::new("C", "C", "C"),
            DndListItem::new("D", "D", "D"),
        ]
    }

    fn ids(items: &[DndListItem<&'static str>]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    /// Resting slots as the rows record them, with the list scrolled
    /// down by `scroll`.
    fn layout(items: &[DndListItem<&'static str>], scroll: f32) -> HashMap<SharedString, ItemBox> {
        items
            .iter()
            .enumerate()
            .map(|(ix, item)| {
                let top = ix as f32 * (ROW + GAP) - scroll;
                (item.id.clone(), ItemBox::from_top(top, ROW))
            })
            .collect()
    }

    /// Press the row at `from_ix`, move the pointer through `path` (offsets
    /// from the press point) and release.
    fn drag_along(
        items: &mut Vec<DndListItem<&'static str>>,
        scroll: f32,
        from_ix: usize,
        path: &[f32],
    ) -> Option<DndListReorder> {
        let resting = layout(items, scroll);
        let mut tracker = GestureTracker::new();
        let pressed = DragPoint::new(8., resting[&items[from_ix].id].center_y());
        tracker
            .start(&items[from_ix].id, pressed, &item_ids(items), &resting)
            .unwrap();
        for dy in path {
            let live = live_bounds(&resting, &tracker);
            tracker.update(DragPoint::new(pressed.x, pressed.y + dy), &live);
        }

        let reorder = tracker.end()?;
        if reorder.is_noop() {
            return None;
        }
        reorder.apply_to(items);
        Some(DndListReorder::from(&reorder))
    }

    fn drag(
        items: &mut Vec<DndListItem<&'static str>>,
        from_ix: usize,
        dy: f32,
    ) -> Option<DndListReorder> {
        drag_along(items, 0., from_ix, &[dy])
    }

    #[test]
    fn reorder_moves_item_down() {
        let mut items = items();
        let reorder = drag(&mut items, 1, 3. * (ROW + GAP)).unwrap();

        assert_eq!(
            reorder,
            DndListReorder {
                item_id: "B".into(),
                from: 1,
                to: 3
            }
        );
        assert_eq!(ids(&items), vec!["A", "C", "D", "B"]);
    }

    #[test]
    fn reorder_moves_item_up() {
        let mut items = items();
        drag(&mut items, 3, -2. * (ROW + GAP)).unwrap();

        assert_eq!(ids(&items), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn reorder_noop_when_released_short_of_a_neighbour() {
        for dy in [0., ROW / 2. + GAP / 2. - 1., -(ROW / 2.)] {
            let mut items = items();
            assert_eq!(drag(&mut items, 1, dy), None);
            assert_eq!(ids(&items), vec!["A", "B", "C", "D"]);
        }
    }

    #[test]
    fn scrolled_list_keeps_order_without_movement() {
        let mut items = items();
        let pitch = ROW + GAP;
        assert_eq!(drag_along(&mut items, 2. * pitch, 3, &[0., 0., 0.]), None);
        assert_eq!(ids(&items), vec!["A", "B", "C", "D"]);

        let reorder = drag_along(&mut items, 2. * pitch, 3, &[-10., -20., -pitch]).unwrap();
        assert_eq!((reorder.from, reorder.to), (3, 2));
        assert_eq!(ids(&items), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn live_bounds_follow_target_shifts() {
        let items = items();
        let resting = layout(&items, 0.);
        let mut tracker = GestureTracker::new();
        let pressed = DragPoint::new(8., resting["B"].center_y());
        tracker
            .start(&"B".into(), pressed, &item_ids(&items), &resting)
            .unwrap();
        tracker.update(DragPoint::new(8., pressed.y + ROW + GAP), &resting);

        let live = live_bounds(&resting, &tracker);
        assert_eq!(live["C"], resting["C"].translated(-(ROW + GAP)));
        assert_eq!(live["B"], resting["B"].translated(ROW + GAP));
        assert_eq!(live["D"], resting["D"]);
    }

    #[test]
    fn moving_without_left_button_counts_as_release() {
        assert!(button_released(None));
        assert!(button_released(Some(MouseButton::Right)));
        assert!(!button_released(Some(MouseButton::Left)));
    }

    #[test]
    fn row_bounds_use_vertical_extent() {
        let bounds = Bounds::new(gpui::point(px(3.), px(40.)), gpui::size(px(200.), px(28.)));
        assert_eq!(item_box(bounds), ItemBox::new(40., 68.));
    }
}
