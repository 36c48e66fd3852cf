//! Deterministic random number generation
//!
//! The engine itself is deterministic. Drivers that need noise (wage shocks,
//! liquidity preferences) draw it from this seeded xorshift64* generator so
//! runs replay exactly.

mod xorshift;

pub use xorshift::RngManager;
