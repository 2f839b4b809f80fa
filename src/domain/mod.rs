pub mod id;
pub use id::new_id;

pub mod message;
pub use message::*;

pub mod folder;
pub use folder::*;

pub mod server;
pub use server::*;
