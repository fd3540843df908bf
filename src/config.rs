//! Runtime settings -- compiled-in defaults for the shipped flower model,
//! optionally overridden by a `predict.toml` in the working directory

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

/// Default log filter, installed by the binary before logger init
pub const RUST_LOG: &str = "warn";

/// Path to the TorchScript classifier
const MODEL_FILE: &str = "ml/flower3.pt";

/// Side length of the square model input, in pixels
const INPUT_SIZE: u32 = 150;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The path to the TorchScript model file
    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// Class names, indexed by the model's output positions
    #[serde(default = "default_class_names")]
    pub class_names: Vec<String>,

    /// Images are resized to `input_size` x `input_size` before inference
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_model_file() -> String {
    MODEL_FILE.to_string()
}

fn default_class_names() -> Vec<String> {
    vec!["Marigold".to_string(), "Scarlet Sage".to_string()]
}

fn default_input_size() -> u32 {
    INPUT_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model_file: default_model_file(),
            class_names: default_class_names(),
            input_size: default_input_size(),
        }
    }
}

impl Settings {
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("predict").required(false))
            .build()?
            .try_deserialize()
    }
}

/// Process-wide settings, parsed once. An unreadable or invalid
/// `predict.toml` falls back to the defaults
pub fn settings() -> &'static Settings {
    static SETTINGS: Lazy<Settings> = Lazy::new(|| match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            warn!("predict.toml not usable, falling back to defaults: {err}");
            Settings::default()
        }
    });
    &SETTINGS
}
