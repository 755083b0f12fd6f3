//! HTTP handlers, grouped by resource

pub mod closing;
pub mod health;
pub mod internal_costs;
pub mod overhead;
pub mod salaries;

pub use closing::*;
pub use health::*;
pub use internal_costs::*;
pub use overhead::*;
pub use salaries::*;
