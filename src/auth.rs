//! Identifiers, scope sets, secrets, and the authentication result model.

pub mod id;
pub mod result;
pub mod scope;
pub mod secret;

pub use id::*;
pub use result::*;
pub use scope::*;
pub use secret::*;
