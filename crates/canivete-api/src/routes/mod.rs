//! Route registration, one module per capability.
//!
//! Each module exposes a `capability` function that binds its operations to
//! the injected service. Mounting happens in [`build_router`](crate::build_router).

pub mod datetime;
pub mod finance;
pub mod internet;
pub mod programming;
