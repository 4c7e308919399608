//! Shared numeric helpers.

pub mod stats;

pub use stats::{ln_half_normal_pdf, ln_normal_pdf};
