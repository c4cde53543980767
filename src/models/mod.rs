pub mod customer;
pub mod de;
pub mod filter;
pub mod order;
pub mod report;

pub use customer::*;
pub use filter::*;
pub use order::*;
pub use report::*;
