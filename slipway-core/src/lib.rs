//! Slipway Core
//!
//! Core types and abstractions for the Slipway deploy tracker.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, JobEvent, etc.)
//! - DTOs: Data transfer objects for creating and presenting jobs

pub mod domain;
pub mod dto;
