//! View-state adapters over a shared `RepoHandle`.
//!
//! Adapters cache ids only (lane order, card ids per lane, the active floor
//! and its tables). Reads re-resolve entities from the repository and hand
//! back owned snapshots. Every mutation goes through the repository, awaits
//! `save`, then refreshes the cached ids.

pub mod accounts;
pub mod board;
pub mod floor;

pub use accounts::AccountsView;
pub use board::{BoardView, LaneSnapshot, Shift};
pub use floor::FloorView;
