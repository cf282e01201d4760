#[derive(Debug, PartialEq)]
/// DS2482 Hardware Errors
pub enum Ds2482Error<E> {
    /// I2C bus errors.
    I2c(E),
    /// The 1-Wire line stayed busy for every status poll.
    RetriesExceeded,
}

impl<E> From<E> for Ds2482Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
