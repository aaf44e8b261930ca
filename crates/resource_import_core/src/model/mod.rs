//! Catalog domain model.
//!
//! # Responsibility
//! - Define the transient input shape (`ResourceDescriptor`).
//! - Define persisted catalog entities (`Resource`, `Category`, `Language`).
//!
//! # Invariants
//! - A `Resource` is identified by its `url` for reconciliation purposes.
//! - `Category` and `Language` are identified by `name`.

pub mod descriptor;
pub mod resource;
