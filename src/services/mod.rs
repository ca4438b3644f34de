//! Gallery services: storage, resources, time and the two session components.

pub mod clock;
pub mod events;
pub mod gallery;
pub mod photo_repository;
pub mod resources;
pub mod slot_store;
pub mod transport;
pub mod uploader;
