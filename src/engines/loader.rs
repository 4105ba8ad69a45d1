//! Engine loader for initializing the configured count engine

use super::traits::Engine;
use super::{esearch, pubmed_web};
use crate::config::SearchSettings;
use crate::error::SearchError;
use tracing::info;

/// Loader for initializing engines from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Create and initialize the engine named in the settings
    pub fn load(settings: &SearchSettings) -> Result<Box<dyn Engine>, SearchError> {
        let mut engine = Self::create_engine(&settings.engine)?;
        engine.init(settings)?;
        info!("Loaded engine: {}", engine.name());
        Ok(engine)
    }

    /// Create an engine instance by name
    fn create_engine(engine_type: &str) -> Result<Box<dyn Engine>, SearchError> {
        let engine: Box<dyn Engine> = match engine_type {
            "esearch" => Box::new(esearch::ESearch::new()),
            "pubmed_web" => Box::new(pubmed_web::PubMedWeb::new()),
            _ => {
                return Err(SearchError::Config(format!(
                    "unknown engine {:?} (available: {})",
                    engine_type,
                    Self::available_engines().join(", ")
                )));
            }
        };
        Ok(engine)
    }

    /// Get list of available engine types
    pub fn available_engines() -> Vec<&'static str> {
        vec!["esearch", "pubmed_web"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_engines() {
        for name in EngineLoader::available_engines() {
            let settings = SearchSettings {
                engine: name.to_string(),
                ..Default::default()
            };
            assert_eq!(EngineLoader::load(&settings).unwrap().name(), name);
        }
    }

    #[test]
    fn test_unknown_engine() {
        let settings = SearchSettings {
            engine: "selenium".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            EngineLoader::load(&settings),
            Err(SearchError::Config(_))
        ));
    }
}
