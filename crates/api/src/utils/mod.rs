pub mod actor;
pub mod command_helpers;
pub mod error;
pub mod health;
pub mod logging;

pub use actor::Caller;
pub use command_helpers::execute;
pub use error::ApiError;
