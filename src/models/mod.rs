pub mod list;
pub mod song;

pub use list::*;
pub use song::*;
