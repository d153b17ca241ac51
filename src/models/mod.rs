pub mod context;
pub mod entity;
pub mod enums;
pub mod note;

pub use context::*;
pub use entity::*;
pub use enums::*;
pub use note::*;
