//! Reference Catalog
//!
//! Immutable table of reference-brand products. Built once at startup and
//! shared behind `Arc` by every pricing run.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use rust_decimal::prelude::*;
use shared::models::{CatalogStats, PriceRange, ReferenceProduct};
use thiserror::Error;

/// Built-in reference data, overridable through `CATALOG_PATH`
const BUILTIN_CATALOG: &str = include_str!("../../data/reference_catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate reference code: {0}")]
    DuplicateCode(String),

    #[error("reference entry #{0} has an empty code")]
    EmptyCode(usize),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    products: Vec<ReferenceProduct>,
}

impl ReferenceCatalog {
    /// Build a catalog, rejecting empty or duplicate codes (case-insensitive)
    pub fn new(products: Vec<ReferenceProduct>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for (index, product) in products.iter().enumerate() {
            let code = product.code.trim();
            if code.is_empty() {
                return Err(CatalogError::EmptyCode(index));
            }
            if !seen.insert(code.to_lowercase()) {
                return Err(CatalogError::DuplicateCode(code.to_string()));
            }
        }
        Ok(Self { products })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<ReferenceProduct> = serde_json::from_str(json)?;
        Self::new(products)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Case-insensitive lookup by code
    pub fn lookup(&self, code: &str) -> Option<&ReferenceProduct> {
        let code = code.trim();
        self.products
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    /// All entries in catalog order (the order resolution ties are broken by)
    pub fn all(&self) -> &[ReferenceProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// First entry whose nominal capacity equals `capacity_ah`
    pub fn find_by_capacity(&self, capacity_ah: u32) -> Option<&ReferenceProduct> {
        self.products
            .iter()
            .find(|p| p.nominal_capacity_ah == Some(capacity_ah))
    }

    /// Entries whose code, alias or description contains `term`
    pub fn search(&self, term: &str, limit: usize) -> Vec<&ReferenceProduct> {
        let needle = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.code.to_lowercase().contains(&needle)
                    || p.aliases.iter().any(|a| a.to_lowercase().contains(&needle))
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let priced: Vec<Decimal> = self
            .products
            .iter()
            .filter(|p| p.is_priced())
            .map(|p| p.net_price)
            .collect();

        let capacities: BTreeSet<u32> = self
            .products
            .iter()
            .filter_map(|p| p.nominal_capacity_ah)
            .collect();

        let price_range = match (priced.iter().min(), priced.iter().max()) {
            (Some(&min), Some(&max)) => {
                let sum: Decimal = priced.iter().sum();
                let average = (sum / Decimal::from(priced.len()))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                Some(PriceRange { min, max, average })
            }
            _ => None,
        };

        CatalogStats {
            total_products: self.products.len(),
            priced_products: priced.len(),
            priceless_products: self.products.len() - priced.len(),
            total_aliases: self.products.iter().map(|p| p.aliases.len()).sum(),
            capacities: capacities.into_iter().collect(),
            price_range,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_product(
    code: &str,
    capacity: Option<u32>,
    price: Decimal,
    aliases: &[&str],
) -> ReferenceProduct {
    ReferenceProduct {
        code: code.to_string(),
        brand: shared::models::REFERENCE_BRAND.to_string(),
        nominal_capacity_ah: capacity,
        voltage: "12V".to_string(),
        net_price: price,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());

        let va45 = catalog.lookup("va45bd").unwrap();
        assert_eq!(va45.net_price, dec!(42.80));
        assert_eq!(va45.nominal_capacity_ah, Some(45));
        assert!(va45.aliases.iter().any(|a| a == "12X45"));
    }

    #[test]
    fn test_builtin_catalog_has_priceless_entries() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let entry = catalog.lookup("VA70DD/E").unwrap();
        assert!(!entry.is_priced());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let err = ReferenceCatalog::new(vec![
            test_product("VA45BD", Some(45), dec!(42.80), &[]),
            test_product("va45bd", Some(45), dec!(40), &[]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode(code) if code == "va45bd"));
    }

    #[test]
    fn test_empty_code_rejected() {
        let err = ReferenceCatalog::new(vec![test_product("  ", None, dec!(1), &[])]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCode(0)));
    }

    #[test]
    fn test_duplicate_aliases_allowed() {
        let catalog = ReferenceCatalog::new(vec![
            test_product("A1", Some(60), dec!(10), &["60Ah"]),
            test_product("B1", Some(60), dec!(11), &["60Ah"]),
        ]);
        assert!(catalog.is_ok());
    }

    #[test]
    fn test_lookup_missing() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        assert!(catalog.lookup("NOPE").is_none());
    }

    #[test]
    fn test_find_by_capacity_returns_first_in_order() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        assert_eq!(catalog.find_by_capacity(60).unwrap().code, "VA60DD/E");
        assert_eq!(catalog.find_by_capacity(70).unwrap().code, "VA70ND/E");
        assert!(catalog.find_by_capacity(999).is_none());
    }

    #[test]
    fn test_search_by_alias_and_code() {
        let catalog = ReferenceCatalog::builtin().unwrap();

        let hits = catalog.search("hilux", 10);
        let codes: Vec<&str> = hits.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["VA85DD/E", "VA90LD/E"]);

        let hits = catalog.search("VA6V", 3);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|p| p.code.starts_with("VA6V")));
    }

    #[test]
    fn test_stats() {
        let catalog = ReferenceCatalog::new(vec![
            test_product("A", Some(45), dec!(40), &["a1", "a2"]),
            test_product("B", Some(60), dec!(60), &[]),
            test_product("C", Some(45), dec!(0), &["c1"]),
        ])
        .unwrap();

        let stats = catalog.stats();
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.priced_products, 2);
        assert_eq!(stats.priceless_products, 1);
        assert_eq!(stats.total_aliases, 3);
        assert_eq!(stats.capacities, vec![45, 60]);
        let range = stats.price_range.unwrap();
        assert_eq!(range.min, dec!(40));
        assert_eq!(range.max, dec!(60));
        assert_eq!(range.average, dec!(50));
    }

    #[test]
    fn test_stats_without_prices() {
        let catalog = ReferenceCatalog::new(vec![test_product("A", None, dec!(0), &[])]).unwrap();
        assert!(catalog.stats().price_range.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"code":"X1","nominal_capacity_ah":50,"net_price":12.5}}]"#
        )
        .unwrap();

        let catalog = ReferenceCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("x1").unwrap().net_price, dec!(12.5));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ReferenceCatalog::from_file("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
