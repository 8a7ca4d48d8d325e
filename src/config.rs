use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;

use crate::properties::{keys, PropertyStore};

/// File-backed configuration seeding the root property store
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Free-form extra properties, written verbatim into the store
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct RecognitionConfig {
    /// BCP-47 language tag
    pub language: String,

    /// Leading silence before a recognition gives up, in milliseconds
    pub initial_silence_timeout_ms: u64,

    /// Trailing silence that ends an utterance, in milliseconds
    pub end_silence_timeout_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            initial_silence_timeout_ms: 5000,
            end_silence_timeout_ms: 500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recognition: RecognitionConfig::default(),
            properties: HashMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Write the configured values into `store` under the well-known keys
    pub fn apply_to(&self, store: &Arc<PropertyStore>) {
        store.set_string_value(keys::RECOGNITION_LANGUAGE, &self.recognition.language);
        store.set_string_value(
            keys::INITIAL_SILENCE_TIMEOUT_MS,
            &self.recognition.initial_silence_timeout_ms.to_string(),
        );
        store.set_string_value(
            keys::END_SILENCE_TIMEOUT_MS,
            &self.recognition.end_silence_timeout_ms.to_string(),
        );

        for (name, value) in &self.properties {
            store.set_string_value(name, value);
        }
    }
}
