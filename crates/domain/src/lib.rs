//! Domain layer for Route Navigator
//!
//! Contains the bus schedule model, bus stops, coordinates, and the static
//! route directory. This layer has no I/O and defines the ubiquitous language.

pub mod directory;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use directory::{BusDirectory, MatchMode};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
