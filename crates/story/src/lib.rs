pub mod dnd_list;
