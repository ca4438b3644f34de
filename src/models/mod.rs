//! Core data models for the wedding gallery.
//!
//! Photo records are what gets persisted; pending uploads and resource handles
//! only live for the duration of a session.

pub mod photo;
pub mod resource;
pub mod upload;
