//! Tiltscape library - procedural live wallpaper engine driven by device tilt

pub mod cli;
pub mod color;
pub mod compositor;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod force;
pub mod frame;
pub mod geometry;
pub mod motion;
pub mod params;
pub mod particles;
pub mod raster;
pub mod record;
pub mod water;
