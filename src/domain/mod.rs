//! Domain layer: checkout and host value types, the session value, the error
//! classifier, and the ports the application layer drives.

pub mod checkout;
pub mod classifier;
pub mod host;
pub mod ports;
pub mod session;
