#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus, writing and reading bytes, and writing and reading bits.
//! ROM level commands (match, skip, resume, overdrive match, read ROM) and a full bus
//! enumeration ([`OneWire::find_devices`]) are provided on top of those primitives.
//!
//! The crate also provides a search algorithm for discovering devices on the 1-Wire bus, implemented in the [OneWireSearch] struct,
//! and the CRC checks used to validate ROM codes ([OneWireCrc]) and data payloads ([OneWireCrc16]).

mod consts;
mod crc;
mod error;
mod search;
mod traits;
pub use crc::{OneWireCrc, OneWireCrc16};
pub use error::OneWireError;
pub use search::{OneWireSearch, OneWireSearchKind, SearchState, SearchStep};
pub use traits::{OneWire, OneWireStatus};

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
