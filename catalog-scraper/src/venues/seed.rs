//! Compiled-in venue seed data, loaded at startup (§4.8, §6).

use catalog_core::{Result, Venue, VenueAlias};
use catalog_core::Storage;

pub struct VenueSeed {
    pub canonical_name: &'static str,
    pub postcode: Option<&'static str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub aliases: &'static [&'static str],
}

/// A small illustrative seed list. Real deployments carry the full venue
/// register; this crate ships enough to exercise seeding and the matcher.
pub const VENUE_SEEDS: &[VenueSeed] = &[
    VenueSeed {
        canonical_name: "Allens Hill Competition Centre",
        postcode: Some("DE6 2DZ"),
        latitude: None,
        longitude: None,
        aliases: &["Allens Hill"],
    },
    VenueSeed {
        canonical_name: "Arena UK",
        postcode: Some("LE14 2RP"),
        latitude: Some(52.8167),
        longitude: Some(-0.7667),
        aliases: &[],
    },
    VenueSeed {
        canonical_name: "Hartpury Events",
        postcode: Some("GL19 3BE"),
        latitude: None,
        longitude: None,
        aliases: &["Hartpury", "Hartpury College"],
    },
];

/// The names the venue matcher treats specially: too generic to resolve by
/// exact alias alone without a postcode.
pub const AMBIGUOUS_VENUE_NAMES: &[&str] = &["The Arena", "The Showground", "Tbc"];

pub async fn seed_venues(storage: &dyn Storage) -> Result<()> {
    for seed in VENUE_SEEDS {
        let venue = Venue {
            id: uuid::Uuid::new_v4(),
            canonical_name: seed.canonical_name.to_string(),
            postcode: seed.postcode.map(str::to_string),
            latitude: seed.latitude,
            longitude: seed.longitude,
            distance_miles: None,
        };
        storage.upsert_venue_seed(&venue).await?;

        let resolved = storage
            .get_venue_by_canonical_name(seed.canonical_name)
            .await?
            .expect("venue was just seeded");

        for alias in seed.aliases {
            storage
                .upsert_alias(&VenueAlias {
                    alias_name: alias.to_string(),
                    venue_id: resolved.id,
                })
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::storage::MemoryStorage;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let storage = MemoryStorage::new();
        seed_venues(&storage).await.unwrap();
        seed_venues(&storage).await.unwrap();

        let venues = storage.list_all_venues().await.unwrap();
        assert_eq!(venues.len(), VENUE_SEEDS.len());
    }

    #[tokio::test]
    async fn seeded_aliases_resolve() {
        let storage = MemoryStorage::new();
        seed_venues(&storage).await.unwrap();
        let aliases = storage.list_all_aliases().await.unwrap();
        assert!(aliases.iter().any(|a| a.alias_name == "Hartpury"));
    }
}
