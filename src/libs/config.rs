//! Configuration management for actman.
//!
//! The configuration is a JSON file stored next to the database in the
//! per-user data directory. Every section is optional on disk: a missing
//! file or a missing section falls back to the defaults, so the application
//! runs without any setup.
//!
//! ## Sections
//!
//! - **model**: behaviour of the model manager (todo adjustment, prefixes used
//!   for generated logins and codes, default name of new tasks)
//! - **database**: name of the SQLite file inside the data directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::libs::config::Config;
//!
//! let config = Config::read()?;
//! let db_path = config.database_path()?;
//! println!("model stored in {}", db_path.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::db::DB_FILE_NAME;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// A configurable section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Settings of the model manager.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Whether contributions recorded from the command line adjust the task's todo.
    pub update_todo: bool,
    /// Login prefix of generated collaborators (`login`, `login1`, ...).
    pub collaborator_login_prefix: String,
    /// Code prefix of generated tasks (`N`, `N1`, ...).
    pub task_code_prefix: String,
    pub new_task_name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            update_todo: true,
            collaborator_login_prefix: "login".to_string(),
            task_code_prefix: "N".to_string(),
            new_task_name: "New task".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    /// File name inside the data directory.
    pub file_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            file_name: DB_FILE_NAME.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Loads the configuration file, or the defaults when there is none.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Full path of the SQLite file holding the model.
    pub fn database_path(&self) -> Result<PathBuf> {
        let file_name = self
            .database
            .as_ref()
            .map(|database| database.file_name.as_str())
            .unwrap_or(DB_FILE_NAME);
        DataStorage::new().get_path(file_name)
    }

    /// Interactive setup wizard, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = [
            ConfigModule {
                key: "model".to_string(),
                name: "Model".to_string(),
            },
            ConfigModule {
                key: "database".to_string(),
                name: "Database".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "model" => {
                    let default = config.model.clone();
                    msg_print!(Message::ConfigModuleModel);
                    config.model = ModelConfig {
                        update_todo: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptUpdateTodo.to_string())
                            .default(default.update_todo)
                            .interact()?,
                        collaborator_login_prefix: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptLoginPrefix.to_string())
                            .default(default.collaborator_login_prefix)
                            .interact_text()?,
                        task_code_prefix: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTaskCodePrefix.to_string())
                            .default(default.task_code_prefix)
                            .interact_text()?,
                        new_task_name: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptNewTaskName.to_string())
                            .default(default.new_task_name)
                            .interact_text()?,
                    };
                }
                "database" => {
                    let default = config.database.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleDatabase);
                    config.database = Some(DatabaseConfig {
                        file_name: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDatabaseFileName.to_string())
                            .default(default.file_name)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
