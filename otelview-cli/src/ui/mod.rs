mod popup;
mod render;
pub mod theme;

pub use render::render;
pub use theme::styles;
