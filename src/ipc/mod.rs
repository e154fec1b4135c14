mod effects;
mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use error::err;
pub use router::{handle_request, tick};
pub use types::{AppState, Request};
