//! Period management for the simulation

pub mod period;
