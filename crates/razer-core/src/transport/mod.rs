//! Transport layer module.

pub mod mock;
pub mod traits;
pub mod unix;

pub use mock::MockChannel;
pub use traits::{Channel, TransportError};
pub use unix::UnixChannel;
