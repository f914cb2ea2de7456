// src/config/mod.rs
//! Deployment configuration loaders.

pub mod ai;
