// Markscale: adaptive watermark geometry library

pub mod config;
pub mod logging;
pub mod watermark;
