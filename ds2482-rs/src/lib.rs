#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/*! # DS2482
 *
 * Driver for the DS2482 I2C to 1-Wire bridge. The bridge generates the 1-Wire
 * timing itself; the host drives it through a handful of command bytes and
 * polls its status register.
 *
 * [`Ds2482`] implements [`OneWire`], which brings bus enumeration
 * ([`OneWire::find_devices`]) and ROM addressing on top of the bridge primitives.
 */

pub use embedded_onewire::{OneWire, OneWireError, OneWireResult};
mod error;
mod onewire;
mod registers;

pub use error::Ds2482Error;
pub use registers::{Command, DeviceConfiguration, DeviceStatus, Ds2482, Ds2482Builder, Register};

/// Results of DS2482-specific function calls.
pub type Ds2482Result<T, E> = Result<T, Ds2482Error<E>>;
