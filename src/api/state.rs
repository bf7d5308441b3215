//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PayrollConfig;
use crate::pipeline::PayrollPipeline;
use crate::render::SlipFormat;

/// Shared application state.
///
/// Holds the loaded payroll configuration and the directories the handlers
/// read timesheets from and write salary slips to.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<PayrollConfig>,
    input_dir: PathBuf,
    output_dir: PathBuf,
    format: SlipFormat,
}

impl AppState {
    /// Creates a new application state producing plain-text slips.
    pub fn new(
        config: PayrollConfig,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            format: SlipFormat::default(),
        }
    }

    /// Sets the slip output format.
    pub fn with_format(mut self, format: SlipFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns a reference to the payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Directory uploaded timesheets are stored in and processed from.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Directory salary slips are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The slip output format.
    pub fn format(&self) -> SlipFormat {
        self.format
    }

    /// Builds a pipeline sharing this state's configuration.
    pub fn pipeline(&self) -> PayrollPipeline {
        PayrollPipeline::new(Arc::clone(&self.config), self.format.renderer())
    }
}
