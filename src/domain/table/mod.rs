pub mod cell;
pub mod search;
pub mod sort;
pub mod state;
