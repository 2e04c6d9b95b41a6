use std::collections::HashMap;

use voxstream_core::{RecognizerError, SpeechSettings};

use crate::backend::SpeechBackend;

type BackendFactory = fn(&SpeechSettings) -> Result<Box<dyn SpeechBackend>, RecognizerError>;

pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("azure", |settings| {
            Ok(Box::new(crate::azure::AzureSpeechBackend::new(settings)?))
        });
        registry.register("null", |_settings| {
            Ok(Box::new(crate::null_backend::NullBackend::new()))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: BackendFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(
        &self,
        name: &str,
        settings: &SpeechSettings,
    ) -> Result<Box<dyn SpeechBackend>, RecognizerError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RecognizerError::BackendNotFound(name.to_string()))?;
        factory(settings)
    }

    pub fn list_backends(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
