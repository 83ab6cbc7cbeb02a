pub mod accommodations;
pub mod contracts;
pub mod error;
pub mod geocoding;
pub mod guard;
pub mod members;
pub mod notifications;
pub mod owners;
pub mod ratings;
pub mod reservations;
pub mod roles;
pub mod universities;
