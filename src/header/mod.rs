//! Header names, the multi-value map that stores them, and the typed
//! element registry layered on top.

mod element;
mod map;
pub(crate) mod name;

pub use element::{Coding, ConnectionOption, Element, MediaType};
pub use map::HeaderMap;
pub use name::Name;
