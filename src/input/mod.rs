//! User input subsystem — quadrature encoder and its push switch.

pub mod button;
pub mod encoder;
