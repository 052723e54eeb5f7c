//! Cartwheel Core - shared types.
//!
//! Pure data types used by the `api` crate: newtype entity ids and the
//! normalized [`Email`] address. No I/O, no storage, no HTTP, so anything
//! can depend on this crate without dragging the service stack along.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
