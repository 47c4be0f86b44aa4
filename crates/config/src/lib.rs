// Configuration loading

pub mod settings;

pub use settings::{
    ConfigError, DatabaseSettings, OutputSettings, Overrides, PipelineSettings, ScoringSettings,
    Settings,
};
