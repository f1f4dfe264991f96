mod board;
mod render;

pub use render::render;
