//! Data Transfer Objects
//!
//! This module contains DTOs used at the tracker's edges: requests to create
//! jobs and presentation views of their state. DTOs are lightweight
//! representations of domain entities optimized for transfer.

pub mod job;
