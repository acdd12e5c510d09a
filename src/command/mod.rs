//! The `/standup` command: parsing, expiry, rendering and dispatch.

mod dispatcher;
mod expiry;
mod registry;
mod render;
mod store;
mod tokenizer;

pub use dispatcher::*;
pub use expiry::*;
pub use registry::*;
pub use render::*;
pub use store::*;
pub use tokenizer::*;
