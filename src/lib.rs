// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install versioned rule sets into projects.
//!
//! A __rule set__ is a bundle of rule files for an automated coding
//! assistant, plus an optional root-level instructions document. Rule sets
//! live in a template repository. Ruledrop copies one rule set into the Git
//! project the user is standing in, preferring a local checkout of the
//! template repository and falling back to a shallow clone of the remote.
//!
//! # See Also
//!
//! 1. [`engine`] for the full installation pipeline.
//! 2. [`source`] for how rule sets are found.
//! 3. [`install`] for the overwrite policy.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod install;
pub mod path;
pub mod report;
pub mod rule;
pub mod source;
pub mod target;
