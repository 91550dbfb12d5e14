//! Core library modules of actman.
//!
//! The model types ([`collaborator`], [`duration`], [`task`],
//! [`contribution`]) are plain data. [`tree`] and [`aggregation`] implement
//! the rules over a borrowed connection, and [`model_mgr::ModelMgr`] wraps
//! them in transactions for every caller: the CLI, [`xml`] and the tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::db::db::Db;
//! use actman::libs::config::ModelConfig;
//! use actman::libs::model_mgr::ModelMgr;
//! use actman::libs::collaborator::Collaborator;
//!
//! let mgr = ModelMgr::new(Db::new()?, ModelConfig::default());
//! mgr.create_collaborator(&Collaborator::new("jdoe", "John", "Doe"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregation;
pub mod collaborator;
pub mod config;
pub mod contribution;
pub mod data_storage;
pub mod duration;
pub mod error;
pub mod formatter;
pub mod messages;
pub mod model_mgr;
pub mod task;
pub mod task_path;
pub mod tree;
pub mod view;
pub mod xml;
