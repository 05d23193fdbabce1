//! Drawboard Render Library
//!
//! Renderer abstraction and implementations for Drawboard.
//! The default implementation uses Vello for GPU-accelerated rendering.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, SELECTION_COLOR};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
