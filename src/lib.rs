//! ICMPv4 echo prober.
//!
//! Sends Echo-Requests carrying a timestamp and a verifiable byte pattern,
//! matches replies by identifier and sequence, retries unanswered probes and
//! summarizes loss, retries, corruption and round-trip times.
//!
//! The probe loop lives in [`ping::ProbeEngine`]; [`ping::Pinger`] holds the
//! run configuration and opens the raw socket.

pub mod error;
pub mod history;
pub mod logging;
pub mod packet;
pub mod ping;
pub mod reply;
pub mod socket;
pub mod stats;

pub use error::Error;
