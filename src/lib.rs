//! # Actman - activity management
//!
//! Keeps a tree of tasks, the collaborators working on them and the time
//! each collaborator spends on each leaf task per day. Budgets, consumption
//! and estimated time to complete roll up along the tree, and the whole model
//! can be exchanged as an XML document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
