#![no_std]
extern crate alloc;

pub mod color;
pub mod config;
pub mod fade_canvas;
pub mod geometry;
pub mod overlay;
pub mod visualizer;

pub use color::LinePalette;
pub use config::VisualizerConfig;
pub use fade_canvas::FadeCanvas;
pub use geometry::{Orientation, SegmentBuffer};
pub use overlay::FlashOverlay;
pub use visualizer::{FrameInput, SpectrumVisualizer};
