//! Key-to-extractor dispatch table. Unknown keys fall back to the generic
//! extractor rather than erroring, per the registry pattern: parsers
//! register themselves at load time against a string key, and the dispatch
//! point never refuses a key it doesn't recognize.

use crate::parser::generic::GenericParser;
use crate::parser::VenueParser;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn VenueParser>>,
    generic: Arc<dyn VenueParser>,
}

impl ParserRegistry {
    pub fn new(generic: Arc<dyn VenueParser>) -> Self {
        Self {
            parsers: HashMap::new(),
            generic,
        }
    }

    pub fn register(&mut self, key: impl Into<String>, parser: Arc<dyn VenueParser>) {
        self.parsers.insert(key.into(), parser);
    }

    pub fn get(&self, key: &str) -> Arc<dyn VenueParser> {
        self.parsers.get(key).cloned().unwrap_or_else(|| self.generic.clone())
    }
}

/// Builds the registry with every illustrative concrete parser installed.
/// A small number of parsers are implemented to exercise the registry;
/// their scraping logic is intentionally thin since per-source extraction
/// bodies are out of scope.
pub fn build_default_registry(extractor_url: Option<String>, extractor_model: Option<String>) -> ParserRegistry {
    let generic: Arc<dyn VenueParser> = Arc::new(GenericParser::new(extractor_url, extractor_model));
    let mut registry = ParserRegistry::new(generic);
    registry.register(
        "british-showjumping",
        Arc::new(crate::parser::parsers::british_showjumping::BritishShowjumpingParser),
    );
    registry.register(
        "british-dressage",
        Arc::new(crate::parser::parsers::british_dressage::BritishDressageParser),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_core::{ExtractedEvent, Result};

    struct MockParser;

    #[async_trait]
    impl VenueParser for MockParser {
        async fn fetch_and_parse(
            &self,
            _source_url: &str,
            _ctx: &crate::parser::ParseContext<'_>,
        ) -> Result<Vec<ExtractedEvent>> {
            Ok(vec![])
        }
    }

    #[test]
    fn unknown_key_falls_back_to_generic() {
        let generic: Arc<dyn VenueParser> = Arc::new(MockParser);
        let registry = ParserRegistry::new(generic.clone());
        assert!(Arc::ptr_eq(&registry.get("never-registered"), &generic));
    }

    #[test]
    fn registered_key_returns_that_parser() {
        let generic: Arc<dyn VenueParser> = Arc::new(MockParser);
        let specific: Arc<dyn VenueParser> = Arc::new(MockParser);
        let mut registry = ParserRegistry::new(generic);
        registry.register("specific", specific.clone());
        assert!(Arc::ptr_eq(&registry.get("specific"), &specific));
    }
}
