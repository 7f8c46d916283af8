// src/compose/mod.rs

//! Pipeline composition: resolving a named pipeline into an ordered step
//! plan and executing it sequentially.

pub mod composer;

pub use composer::{Composer, PipelineReport, Plan};
