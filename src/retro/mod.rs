//! Retroactive containers.
//!
//! A retroactive container logs every update with a logical time and lets
//! later callers insert or delete updates at arbitrary past times; the
//! observable state always reflects the edited history replayed in time
//! order. Queries at the present are available everywhere; the dictionary,
//! ordered set, and multiset additionally answer queries at any past time,
//! and the deque answers `front`/`back` at any past time.
//!
//! Shared conventions:
//!
//! - Retroactive updates (`*_at`) return `bool`: rejection (duplicate
//!   time, history that would replay a removal of something absent) is an
//!   expected outcome, and a rejected update leaves the container
//!   untouched.
//! - Present-time updates synthesize the time `max(existing) + 1` (0 on an
//!   empty container).
//! - `delete_operation(tm)` removes the update logged at `tm`, subject to
//!   the same consistency rules.
//! - `clear` empties the container; `Clone` deep-copies it into an
//!   independently mutable equal value.

pub mod deque;
pub mod dictionary;
pub mod multiset;
pub mod partial_set;
pub mod set;

pub use deque::RetroDeque;
pub use dictionary::RetroDictionary;
pub use multiset::RetroMultiset;
pub use partial_set::PartialRetroSet;
pub use set::RetroSet;
