// Photostamp library
// Watermark compositing and atomic gallery publication

pub mod config;
pub mod constants;
pub mod gallery;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod watermark;
