pub mod ansi;
pub mod open;
pub mod table;

pub use open::open_input;
pub use table::Table;
