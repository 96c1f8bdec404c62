//! Venue matcher: resolves `(normalized_name, normalized_postcode)` to a
//! venue id, creating one if needed.
//!
//! Holds an in-memory index built at scan start and mutated by each
//! successful resolution. The lock is held across the `insert_venue` call
//! itself (not just the map lookups), which serializes concurrent creates
//! within one matcher instance. Two different scans each build their own
//! matcher over the same storage, so that alone cannot prevent a genuine
//! cross-scan race; `insert_venue`'s `UNIQUE(canonical_name)` constraint is
//! the backstop, and a `DuplicateVenueName` error here means this resolve
//! lost the race and should fold in the winner's row instead of failing.

use catalog_core::{CatalogError, Result, Storage, Venue};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

struct Index {
    by_alias: HashMap<String, Uuid>,
    by_postcode: HashMap<String, HashSet<Uuid>>,
    canonical_names: HashMap<Uuid, String>,
}

pub struct VenueMatcher {
    index: Mutex<Index>,
    ambiguous_names: HashSet<String>,
}

impl VenueMatcher {
    /// Builds the index from everything currently in storage. Called once
    /// per scan; venues created mid-scan are folded in as they're resolved.
    pub async fn build(storage: &dyn Storage, ambiguous_names: HashSet<String>) -> Result<Self> {
        let venues = storage.list_all_venues().await?;
        let aliases = storage.list_all_aliases().await?;

        let mut by_alias = HashMap::new();
        let mut by_postcode: HashMap<String, HashSet<Uuid>> = HashMap::new();
        let mut canonical_names = HashMap::new();

        for venue in &venues {
            by_alias.insert(venue.canonical_name.clone(), venue.id);
            canonical_names.insert(venue.id, venue.canonical_name.clone());
            if let Some(postcode) = &venue.postcode {
                by_postcode.entry(postcode.clone()).or_default().insert(venue.id);
            }
        }
        for alias in &aliases {
            by_alias.insert(alias.alias_name.clone(), alias.venue_id);
        }

        Ok(Self {
            index: Mutex::new(Index {
                by_alias,
                by_postcode,
                canonical_names,
            }),
            ambiguous_names,
        })
    }

    /// Resolves a canonicalized name/postcode pair to a venue id, creating
    /// and persisting a new venue if no match is found. Never deletes or
    /// merges existing venues. Holds the index lock across the storage
    /// call that decides the outcome, so the insert-then-update-index
    /// sequence for one matcher instance can't interleave with another.
    pub async fn resolve(
        &self,
        storage: &dyn Storage,
        normalized_name: &str,
        normalized_postcode: Option<&str>,
    ) -> Result<Uuid> {
        use crate::observability::metrics::{increment, MetricName};

        let skip_alias_lookup =
            self.ambiguous_names.contains(normalized_name) && normalized_postcode.is_none();

        let mut index = self.index.lock().await;

        if !skip_alias_lookup {
            if let Some(&id) = index.by_alias.get(normalized_name) {
                increment(MetricName::MatcherExactAlias);
                return Ok(id);
            }
        }

        let prefix = format!("{normalized_name} ");
        let prefix_matches: Vec<Uuid> = index
            .canonical_names
            .iter()
            .filter(|(_, name)| name.starts_with(&prefix))
            .map(|(id, _)| *id)
            .collect();
        if prefix_matches.len() == 1 {
            increment(MetricName::MatcherPrefixMatch);
            return Ok(prefix_matches[0]);
        }

        if let Some(postcode) = normalized_postcode {
            let found = index.by_postcode.get(postcode).and_then(|ids| {
                if ids.len() == 1 {
                    ids.iter().next().copied()
                } else {
                    None
                }
            });
            if let Some(id) = found {
                increment(MetricName::MatcherPostcodeMatch);
                storage
                    .upsert_alias(&catalog_core::VenueAlias {
                        alias_name: normalized_name.to_string(),
                        venue_id: id,
                    })
                    .await?;
                index.by_alias.insert(normalized_name.to_string(), id);
                return Ok(id);
            }
        }

        increment(MetricName::MatcherCreated);
        let venue = Venue::new(normalized_name);
        let venue = Venue {
            postcode: normalized_postcode.map(str::to_string),
            ..venue
        };

        match storage.insert_venue(&venue).await {
            Ok(()) => {
                index.by_alias.insert(normalized_name.to_string(), venue.id);
                index.canonical_names.insert(venue.id, normalized_name.to_string());
                if let Some(postcode) = &venue.postcode {
                    index
                        .by_postcode
                        .entry(postcode.clone())
                        .or_default()
                        .insert(venue.id);
                }
                Ok(venue.id)
            }
            Err(CatalogError::DuplicateVenueName(_)) => {
                let winner = storage
                    .get_venue_by_canonical_name(normalized_name)
                    .await?
                    .ok_or_else(|| CatalogError::DuplicateVenueName(normalized_name.to_string()))?;
                index.by_alias.insert(normalized_name.to_string(), winner.id);
                index.canonical_names.insert(winner.id, winner.canonical_name.clone());
                if let Some(postcode) = &winner.postcode {
                    index
                        .by_postcode
                        .entry(postcode.clone())
                        .or_default()
                        .insert(winner.id);
                }
                Ok(winner.id)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::storage::MemoryStorage;

    #[tokio::test]
    async fn exact_alias_resolves_to_existing_venue() {
        let storage = MemoryStorage::new();
        let venue = Venue::new("Allens Hill Competition Centre");
        storage.insert_venue(&venue).await.unwrap();
        storage
            .upsert_alias(&catalog_core::VenueAlias {
                alias_name: "Allens Hill".to_string(),
                venue_id: venue.id,
            })
            .await
            .unwrap();

        let matcher = VenueMatcher::build(&storage, HashSet::new()).await.unwrap();
        let resolved = matcher.resolve(&storage, "Allens Hill", None).await.unwrap();
        assert_eq!(resolved, venue.id);
    }

    #[tokio::test]
    async fn unknown_name_creates_new_venue() {
        let storage = MemoryStorage::new();
        let matcher = VenueMatcher::build(&storage, HashSet::new()).await.unwrap();
        let resolved = matcher.resolve(&storage, "Brand New Showground", None).await.unwrap();
        let venue = storage.get_venue_by_id(resolved).await.unwrap().unwrap();
        assert_eq!(venue.canonical_name, "Brand New Showground");
    }

    #[tokio::test]
    async fn postcode_match_learns_runtime_alias() {
        let storage = MemoryStorage::new();
        let mut venue = Venue::new("Arena UK");
        venue.postcode = Some("LE14 2RP".to_string());
        storage.insert_venue(&venue).await.unwrap();

        let matcher = VenueMatcher::build(&storage, HashSet::new()).await.unwrap();
        let resolved = matcher
            .resolve(&storage, "Arena Uk Showground", Some("LE14 2RP"))
            .await
            .unwrap();
        assert_eq!(resolved, venue.id);

        let aliases = storage.list_all_aliases().await.unwrap();
        assert!(aliases.iter().any(|a| a.alias_name == "Arena Uk Showground"));
    }

    #[tokio::test]
    async fn ambiguous_alias_guard_skips_alias_lookup_and_creates_new_venue() {
        let storage = MemoryStorage::new();
        let existing = Venue::new("Hartpury Equestrian Centre");
        storage.insert_venue(&existing).await.unwrap();
        storage
            .upsert_alias(&catalog_core::VenueAlias {
                alias_name: "The Arena".to_string(),
                venue_id: existing.id,
            })
            .await
            .unwrap();

        let mut ambiguous = HashSet::new();
        ambiguous.insert("The Arena".to_string());
        let matcher = VenueMatcher::build(&storage, ambiguous).await.unwrap();

        let resolved = matcher.resolve(&storage, "The Arena", None).await.unwrap();
        assert_ne!(resolved, existing.id);

        let created = storage.get_venue_by_id(resolved).await.unwrap().unwrap();
        assert_eq!(created.canonical_name, "The Arena");
    }

    #[tokio::test]
    async fn concurrent_create_collision_resolves_to_the_winning_venue() {
        let storage = MemoryStorage::new();
        let matcher_a = VenueMatcher::build(&storage, HashSet::new()).await.unwrap();
        let matcher_b = VenueMatcher::build(&storage, HashSet::new()).await.unwrap();

        let winner_id = matcher_a
            .resolve(&storage, "New Ground Equestrian", None)
            .await
            .unwrap();
        // matcher_b's index was built before matcher_a's insert landed, so it
        // still believes the name is unclaimed and also tries to create it.
        let loser_id = matcher_b
            .resolve(&storage, "New Ground Equestrian", None)
            .await
            .unwrap();

        assert_eq!(loser_id, winner_id);
        let venues = storage.list_all_venues().await.unwrap();
        assert_eq!(
            venues.iter().filter(|v| v.canonical_name == "New Ground Equestrian").count(),
            1
        );
    }
}
