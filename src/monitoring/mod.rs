// monitoring/mod.rs
pub mod admin_cli;
pub mod charts;
pub mod log_buffer;
pub mod metrics;
pub mod render_surface;
