//! Nullable infrastructure for deterministic testing.
//!
//! The staking provider is the only external dependency of a staking session.
//! [`NullProvider`] stands in for it in tests:
//! - Returns scripted balances, yield terms and pending actions
//! - Records every call for assertions
//! - Can fail fetches, or hold them until released
//! - Never touches the network
//!
//! [`test_data`] holds the fixtures shared by the workspace's tests.

pub mod provider;
pub mod test_data;

pub use provider::NullProvider;
