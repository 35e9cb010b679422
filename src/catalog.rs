//! Card catalog loaded from the game's card list

use crate::boss::Boss;
use crate::card::RosterCard;
use crate::error::CatalogError;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Immutable set of known cards, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<RosterCard>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(cards: Vec<RosterCard>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            if by_id.insert(card.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }
        Ok(Self { cards, by_id })
    }

    /// Load from a JSON array of cards
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<RosterCard> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), cards = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&RosterCard> {
        self.by_id.get(id).map(|&index| &self.cards[index])
    }

    /// Case-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&RosterCard> {
        self.cards.iter().find(|card| card.name.eq_ignore_ascii_case(name))
    }

    /// Id first, then name
    pub fn lookup(&self, key: &str) -> Option<&RosterCard> {
        self.get(key).or_else(|| self.find_by_name(key))
    }

    /// Every card of the given realms as a boss, in catalog order
    pub fn bosses(&self, realms: &BTreeSet<u8>) -> Vec<Boss> {
        self.cards
            .iter()
            .filter(|card| realms.contains(&card.realm))
            .map(Boss::from_card)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterCard> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"[
        {"id": 101, "name": "Pebble", "realm": 1, "power": 5, "defense": 20, "rarity": "common"},
        {"id": "205", "name": "Sea Turtle", "realm": 2, "power": 8},
        {"id": 1101, "name": "Aizen", "realm": 11, "power": 900, "defense": 3}
    ]"#;

    #[test]
    fn loads_and_defaults_missing_fields() {
        let catalog = Catalog::from_json_str(CARDS).unwrap();
        assert_eq!(catalog.len(), 3);
        let turtle = catalog.get("205").unwrap();
        assert_eq!(turtle.defense, 0.0);
        assert_eq!((turtle.tier, turtle.level, turtle.quantity), (1, 1, 1));
        assert_eq!(catalog.get("101").unwrap().rarity.as_deref(), Some("common"));
    }

    #[test]
    fn name_lookup_ignores_case() {
        let catalog = Catalog::from_json_str(CARDS).unwrap();
        assert_eq!(catalog.find_by_name("sea turtle").unwrap().id, "205");
        assert_eq!(catalog.lookup("PEBBLE").unwrap().id, "101");
        assert_eq!(catalog.lookup("101").unwrap().name, "Pebble");
        assert!(catalog.lookup("Kraken").is_none());
    }

    #[test]
    fn bosses_filter_by_realm() {
        let catalog = Catalog::from_json_str(CARDS).unwrap();
        let bosses = catalog.bosses(&BTreeSet::from([11]));
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].name, "Aizen");
        assert_eq!(bosses[0].hp(), 300_000);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[{"id": 1, "name": "A"}, {"id": "1", "name": "B"}]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CatalogError::DuplicateId(id)) if id == "1"
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Json(_))));
    }
}
