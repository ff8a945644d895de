//! Backend implementations for the render module
//!
//! Both backends rasterize on the CPU. The software backend keeps its
//! display surface in memory, which makes it usable headless and in tests.
//! The windowed backend (feature `windowed`) opens a native window through
//! `winit` and presents every frame with `softbuffer`.

pub mod software;

#[cfg(feature = "windowed")]
pub mod windowed;
