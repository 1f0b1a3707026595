pub mod font;
pub mod loader;
pub mod model;

pub use font::{builtin_font, Font, Symbol};
pub use loader::{BoardLoadError, BoardLoader};
pub use model::*;
