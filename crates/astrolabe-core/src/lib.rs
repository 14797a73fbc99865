//! Astrolabe Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Astrolabe
//! diagram-as-code pipeline. It includes:
//!
//! - **Identifiers**: Typed, diagram-scoped indices ([`identifier`] module)
//! - **Colors**: Validated CSS colors ([`color::Color`])
//! - **Attributes**: Diagram direction and edge styling ([`attributes`] module)
//! - **Catalog**: The total node-kind to visual-style lookup ([`catalog`] module)

pub mod attributes;
pub mod catalog;
pub mod color;
pub mod identifier;
