//! Built-in rule kinds
//!
//! Each kind is a synchronous function with the [`RuleFn`] signature,
//! pushing formatted messages into the sink it is given. None of them
//! checks emptiness: the required guard in the resolver does that before a
//! kind ever sees the value.
//!
//! [`RuleFn`]: crate::validation::registry::RuleFn
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod constraints;
pub mod format;
pub mod range;
pub mod required;
pub mod type_check;
