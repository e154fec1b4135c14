pub mod filter;
pub mod render;
pub mod stats;
pub mod store;

pub use filter::Filterable;
pub use render::Renderable;
pub use store::{Record, Store};
