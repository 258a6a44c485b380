//! Business logic of the geolocator.
//!
//! The crate does not perform any I/O on its own. Remote lookups and
//! persistence are reached through the traits in [`gateways`] and
//! [`repositories`].

pub mod gateways;
pub mod repositories;
pub mod usecases;

pub mod entities {
    pub use geoloc_entities::{address::*, geo::*, quota::*, time::*};
}
