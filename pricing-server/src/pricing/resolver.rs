//! Equivalence Resolver
//!
//! Finds the reference product equivalent to an arbitrary input descriptor.
//! Strategies run in a fixed priority order and the first hit wins; later
//! strategies are never consulted once one matches.

use std::sync::LazyLock;

use regex::Regex;
use shared::models::{
    InputProductDescriptor, MatchStatus, MatchStrategyKind, ReferenceProduct, ResolutionSummary,
};

use super::catalog::ReferenceCatalog;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit-run pattern is valid"));

/// One step of the matching cascade
pub trait MatchStrategy: Send + Sync {
    fn kind(&self) -> MatchStrategyKind;

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct>;
}

/// Resolver outcome for one descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'c> {
    Matched {
        product: &'c ReferenceProduct,
        strategy: MatchStrategyKind,
    },
    /// Entry found but its price is zero or negative
    Priceless {
        product: &'c ReferenceProduct,
        strategy: MatchStrategyKind,
    },
    Unmatched,
}

impl<'c> Resolution<'c> {
    /// The matched product, only when its price can anchor wholesale pricing
    pub fn usable(&self) -> Option<&'c ReferenceProduct> {
        match *self {
            Self::Matched { product, .. } => Some(product),
            _ => None,
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            Self::Matched { .. } => MatchStatus::Matched,
            Self::Priceless { .. } => MatchStatus::Priceless,
            Self::Unmatched => MatchStatus::Unmatched,
        }
    }

    pub fn summary(&self) -> ResolutionSummary {
        match self {
            Self::Matched { product, strategy } | Self::Priceless { product, strategy } => {
                ResolutionSummary {
                    status: self.status(),
                    reference_code: Some(product.code.clone()),
                    reference_net_price: Some(product.net_price),
                    strategy: Some(*strategy),
                }
            }
            Self::Unmatched => ResolutionSummary {
                status: MatchStatus::Unmatched,
                reference_code: None,
                reference_net_price: None,
                strategy: None,
            },
        }
    }
}

/// Normalize a capacity string: drop every non-digit, parse what remains
///
/// "60Ah" -> 60, "62.5Ah" -> 625, "Ah" -> None
pub fn normalize_capacity(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// First run of digits in free text ("UB 450 Ag" -> 450)
pub fn first_digit_run(text: &str) -> Option<u32> {
    DIGIT_RUN.find(text).and_then(|m| m.as_str().parse().ok())
}

// ==================== Strategies ====================

/// 1. Model text equals a catalog code
pub struct ExactCode;

impl MatchStrategy for ExactCode {
    fn kind(&self) -> MatchStrategyKind {
        MatchStrategyKind::ExactCode
    }

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct> {
        catalog.lookup(descriptor.model_text()?)
    }
}

/// 2. Declared capacity equals a nominal capacity
pub struct DeclaredCapacity;

impl MatchStrategy for DeclaredCapacity {
    fn kind(&self) -> MatchStrategyKind {
        MatchStrategyKind::Capacity
    }

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct> {
        let capacity = normalize_capacity(descriptor.declared_capacity.as_deref()?)?;
        catalog.find_by_capacity(capacity)
    }
}

/// 3. Code contains the model text, or the model text contains the code
pub struct CodeSubstring;

impl MatchStrategy for CodeSubstring {
    fn kind(&self) -> MatchStrategyKind {
        MatchStrategyKind::Substring
    }

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct> {
        let model = descriptor.model_text()?.to_lowercase();
        catalog.all().iter().find(|p| {
            let code = p.code.to_lowercase();
            code.contains(&model) || model.contains(&code)
        })
    }
}

/// 4. Model text equals, contains, or is contained by an alias
///
/// Exact alias equality is tried across the whole catalog before any
/// containment test, so "12X65" never resolves through "12X65 ALTA".
pub struct AliasMatch;

impl MatchStrategy for AliasMatch {
    fn kind(&self) -> MatchStrategyKind {
        MatchStrategyKind::Alias
    }

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct> {
        let model = descriptor.model_text()?.to_lowercase();
        let aliases = |p: &ReferenceProduct| -> Vec<String> {
            p.aliases
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect()
        };

        catalog
            .all()
            .iter()
            .find(|p| aliases(p).iter().any(|a| *a == model))
            .or_else(|| {
                catalog.all().iter().find(|p| {
                    aliases(p)
                        .iter()
                        .any(|a| a.contains(&model) || model.contains(a.as_str()))
                })
            })
    }
}

/// 5. First digit run of the model text treated as an implied capacity
pub struct ImpliedCapacity;

impl MatchStrategy for ImpliedCapacity {
    fn kind(&self) -> MatchStrategyKind {
        MatchStrategyKind::PatternCapacity
    }

    fn try_match<'c>(
        &self,
        descriptor: &InputProductDescriptor,
        catalog: &'c ReferenceCatalog,
    ) -> Option<&'c ReferenceProduct> {
        catalog.find_by_capacity(first_digit_run(descriptor.model_text()?)?)
    }
}

// ==================== Resolver ====================

pub struct EquivalenceResolver<'c> {
    catalog: &'c ReferenceCatalog,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl<'c> EquivalenceResolver<'c> {
    /// Resolver with the standard five-step cascade
    pub fn new(catalog: &'c ReferenceCatalog) -> Self {
        Self::with_strategies(
            catalog,
            vec![
                Box::new(ExactCode),
                Box::new(DeclaredCapacity),
                Box::new(CodeSubstring),
                Box::new(AliasMatch),
                Box::new(ImpliedCapacity),
            ],
        )
    }

    pub fn with_strategies(
        catalog: &'c ReferenceCatalog,
        strategies: Vec<Box<dyn MatchStrategy>>,
    ) -> Self {
        Self {
            catalog,
            strategies,
        }
    }

    pub fn resolve(&self, descriptor: &InputProductDescriptor) -> Resolution<'c> {
        let hit = self.strategies.iter().find_map(|strategy| {
            strategy
                .try_match(descriptor, self.catalog)
                .map(|product| (product, strategy.kind()))
        });

        match hit {
            Some((product, strategy)) if product.is_priced() => {
                tracing::debug!(
                    row = descriptor.row_index,
                    model = %descriptor.type_or_model,
                    code = %product.code,
                    ?strategy,
                    "Reference equivalence found"
                );
                Resolution::Matched { product, strategy }
            }
            Some((product, strategy)) => {
                tracing::warn!(
                    row = descriptor.row_index,
                    model = %descriptor.type_or_model,
                    code = %product.code,
                    ?strategy,
                    "Reference equivalence has no usable price"
                );
                Resolution::Priceless { product, strategy }
            }
            None => {
                tracing::debug!(
                    row = descriptor.row_index,
                    model = %descriptor.type_or_model,
                    "No reference equivalence"
                );
                Resolution::Unmatched
            }
        }
    }
}
