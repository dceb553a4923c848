pub mod eval;
pub mod ordering;
pub mod see;
pub mod tables;
#[allow(clippy::module_inception)]
pub mod search;
pub mod tt;

pub use search::{Clock, Engine, Limits, SearchReport, StopHandle};

pub const DEPTH_LIMIT: i32 = 64;
pub const PLY_LIMIT: usize = 128;
pub const CHECKMATE: i32 = 100_000;
pub const NEAR_CHECKMATE: i32 = CHECKMATE - PLY_LIMIT as i32;
pub const INFINITY: i32 = 110_000;
/// Score of a drawn position from the root player's point of view; a shade
/// below zero so equal positions are preferred over repeating.
pub const DRAW_VALUE: i32 = -30;
