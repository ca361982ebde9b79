// src/inputs/mod.rs

//! Declaration of file-valued task inputs.
//!
//! Configuration has two phases, modelled as two sets of types:
//!
//! - [`TaskInputsBuilder`] / [`PropertyBuilder`] are mutable and only exist
//!   while a task is being configured.
//! - [`TaskInputs`] / [`PropertyConfiguration`] are the immutable result of
//!   [`TaskInputsBuilder::freeze`], and the only thing the fingerprinting
//!   engine accepts.
//!
//! [`InputRegistry`] offers the same protocol through opaque
//! [`PropertyHandle`]s for callers that configure many tasks at once and
//! freeze them one by one.

pub mod builder;
pub mod property;
pub mod registry;

pub use builder::{PropertyBuilder, TaskInputsBuilder};
pub use property::{PropertyConfiguration, TaskInputs};
pub use registry::{InputRegistry, PropertyHandle};
