pub mod indicators;
pub mod relative;


pub use indicators::*;
pub use relative::*;
