//! Kubegate: natural-language cluster operations behind a policy gate.
//!
//! A request flows through five stages:
//!
//! 1. [`retrieve`] looks up runbook cards relevant to the request.
//! 2. [`planner`] asks a text generator for a JSON plan and parses it.
//! 3. [`validate`] checks the planned command against the [`policy`].
//! 4. [`pipeline`] gates on confirmation and dry run, then [`exec`] runs it.
//! 5. [`audit`] appends one record per attempted operation.

pub mod audit;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod exit_codes;
pub mod pipeline;
pub mod planner;
pub mod policy;
pub mod retrieve;
pub mod validate;

#[cfg(test)]
mod test_support;
