//! Application layer: start-up context, the operation facade and its
//! response envelope.

mod api;
mod context;
mod error;
mod response;

pub use api::App;
pub use context::{AppContext, AppPaths};
pub use error::{AppError, AppResult};
pub use response::{Response, CODE_ERROR, CODE_SUCCESS};
