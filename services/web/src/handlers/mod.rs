pub mod email;
pub mod health;
pub mod index;
pub mod scan;
pub mod upload;

pub use email::*;
pub use health::*;
pub use index::*;
pub use scan::*;
