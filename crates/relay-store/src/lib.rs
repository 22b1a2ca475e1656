pub mod error;
pub mod requests;
pub mod store;

pub use error::{Result, StoreError};
pub use requests::{NewInbound, NewNode, NewUser};
pub use store::EntityStore;
