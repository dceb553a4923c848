pub mod attacks;
pub mod generate;
pub mod notation;
pub mod perft;
pub mod types;
