//! # Almacén de Recursos
//! src/store/mod.rs
//!
//! Colección ordenada de valores JSON que vive mientras vive el proceso.
//! El ID de un item es su posición actual en la colección.

pub mod resource_store;

pub use resource_store::{ResourceStore, StoredItem};
