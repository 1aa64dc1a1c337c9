use thiserror::Error;

/// Why [`GestureTracker::start`](crate::GestureTracker::start) refused to
/// begin a gesture. The tracker state is unchanged in every case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StartRejected {
    #[error("pressed item is not a member of the list")]
    NotInList,

    #[error("a gesture is already in progress")]
    AlreadyDragging,
}
