mod list;
mod motion;

pub use list::{DndList, DndListItem, DndListReorder, DndListRowState, DndListState, dnd_list};
