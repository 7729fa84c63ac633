//! Menu domain: backend client, item/category types, image upload.

mod client;
mod types;
mod upload;

pub use client::MenuClient;
pub use types::{MenuItem, MenuItemPatch, NewMenuItem};
pub use upload::Uploader;
