// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pf-core: Core types shared by the pindelflow crates

pub mod macros;

pub mod exclude;
pub mod job_error;
pub mod options;
pub mod stage;

pub use exclude::Exclusions;
pub use job_error::JobError;
pub use options::{logs_dir, progress_dir, RunOptions, RunOptionsBuilder};
pub use stage::{JobKey, Stage, UnknownName};
