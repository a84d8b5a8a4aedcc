pub mod donation;
pub mod donor;

pub use donation::*;
pub use donor::*;
