//! Compiled-in source definitions, grounded in the teacher's
//! `API_PRIORITY_ORDER` const-slice pattern: a fixed, ordered list baked
//! into the binary rather than loaded from a config file at runtime.

use catalog_core::{Result, Source, Storage};
use chrono::Utc;
use uuid::Uuid;

pub struct SourceDef {
    pub key: &'static str,
    pub display_name: &'static str,
    pub url: &'static str,
    pub enabled: bool,
    /// Registry key used to look up the parser for this source; see
    /// `crate::parser::registry`.
    pub parser_key: &'static str,
}

pub const SOURCE_DEFS: &[SourceDef] = &[
    SourceDef {
        key: "british-showjumping",
        display_name: "British Showjumping",
        url: "https://www.britishshowjumping.co.uk/events",
        enabled: true,
        parser_key: "british-showjumping",
    },
    SourceDef {
        key: "british-dressage",
        display_name: "British Dressage",
        url: "https://www.britishdressage.co.uk/events",
        enabled: true,
        parser_key: "british-dressage",
    },
    SourceDef {
        key: "pony-club",
        display_name: "The Pony Club",
        url: "https://www.pcuk.org/events",
        enabled: true,
        parser_key: "generic",
    },
];

/// Ensures every compiled-in source exists in the database, keyed by
/// unique `key`. Idempotent: running it twice produces the same rows.
pub async fn seed_sources(storage: &dyn Storage) -> Result<()> {
    for def in SOURCE_DEFS {
        let existing = storage.get_source_by_key(def.key).await?;
        let source = Source {
            id: existing.map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            key: def.key.to_string(),
            display_name: def.display_name.to_string(),
            url: def.url.to_string(),
            enabled: def.enabled,
            created_at: Utc::now(),
        };
        storage.upsert_source(&source).await?;
    }
    Ok(())
}
