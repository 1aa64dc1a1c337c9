use std::collections::HashMap;
use std::hash::Hash;

/// A point in the host's coordinate space (usually window coordinates).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The translation that takes `origin` to `self`.
    pub fn offset_from(self, origin: Point) -> Offset {
        Offset {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// A translation vector applied to an item when rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0., y: 0. };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn vertical(y: f32) -> Self {
        Self { x: 0., y }
    }
}

/// The vertical extent of an item's bounding box.
///
/// Only the vertical axis takes part in reordering, so the horizontal extent
/// is never read. Degenerate (zero-height) boxes are valid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemBox {
    pub top: f32,
    pub bottom: f32,
}

impl ItemBox {
    pub const fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn from_top(top: f32, height: f32) -> Self {
        Self {
            top,
            bottom: top + height,
        }
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height() / 2.
    }

    pub fn translated(&self, dy: f32) -> Self {
        Self {
            top: self.top + dy,
            bottom: self.bottom + dy,
        }
    }
}

/// Source of live item boxes.
///
/// Boxes are queried fresh on every frame: idle items move while they
/// animate into their shifted slots, so nothing here may be cached across
/// updates.
pub trait ItemBounds<K> {
    fn item_box(&self, id: &K) -> Option<ItemBox>;
}

impl<K, F> ItemBounds<K> for F
where
    F: Fn(&K) -> Option<ItemBox>,
{
    fn item_box(&self, id: &K) -> Option<ItemBox> {
        self(id)
    }
}

impl<K: Eq + Hash> ItemBounds<K> for HashMap<K, ItemBox> {
    fn item_box(&self, id: &K) -> Option<ItemBox> {
        self.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_degenerate_box_is_its_top() {
        let b = ItemBox::new(12., 12.);
        assert_eq!(b.height(), 0.);
        assert_eq!(b.center_y(), 12.);
    }

    #[test]
    fn translated_box_keeps_height() {
        let b = ItemBox::from_top(10., 30.).translated(-4.);
        assert_eq!(b, ItemBox::new(6., 36.));
        assert_eq!(b.height(), 30.);
    }

    #[test]
    fn closures_and_maps_are_bounds_sources() {
        let map: HashMap<&str, ItemBox> = [("a", ItemBox::new(0., 10.))].into_iter().collect();
        assert_eq!(map.item_box(&"a"), Some(ItemBox::new(0., 10.)));
        assert_eq!(map.item_box(&"b"), None);

        let f = |id: &&str| (*id == "b").then(|| ItemBox::new(5., 6.));
        assert_eq!(f.item_box(&"b"), Some(ItemBox::new(5., 6.)));
    }

    #[test]
    fn offset_is_measured_from_origin() {
        let offset = Point::new(0., 40.).offset_from(Point::new(10., 15.));
        assert_eq!(offset, Offset::new(-10., 25.));
    }
}
