//! Canvas 2D rendering module
//!
//! `shapes` holds the pure styling rules; the canvas and DOM halves only
//! exist on wasm32.

pub mod shapes;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
pub mod hud;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPresenter;
#[cfg(target_arch = "wasm32")]
pub use hud::Hud;
