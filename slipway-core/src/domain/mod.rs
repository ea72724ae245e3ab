//! Core domain types
//!
//! This module contains the core domain structures used across Slipway
//! services. These types represent the fundamental business entities and are
//! shared between the tracker (for persistence and lifecycle logic) and any
//! process runner driving a job.

pub mod event;
pub mod job;
