//! Order-in-progress state.
//!
//! A cart line is identified by its base item plus portion variant; the same
//! dish at full and half portion are two independent lines. Lines exist only
//! while their quantity is at least 1 - a decrement reaching zero deletes the
//! line, so presence of a key is itself proof of a positive quantity.

mod line;
mod reconciler;
mod session;

pub use line::{LineKey, Portion};
pub use reconciler::Cart;
pub use session::Session;
