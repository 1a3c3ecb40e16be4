mod bits;
mod field;
mod order;
mod table;

pub use bits::*;
pub use field::*;
pub use order::*;
pub use table::*;
