pub mod command;
pub mod pairwise;
pub mod utils;

pub use pairwise::AlignError;
