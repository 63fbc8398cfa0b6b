//! Input rows and product descriptors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw row as delivered by the ingestion collaborator: column name -> cell
pub type RawRow = Map<String, Value>;

/// Optional hints naming the source column for each extracted field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Column holding the free-text type/model code (e.g. "12X45")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

/// Product descriptor extracted from one raw row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputProductDescriptor {
    /// Position of the row in the submitted batch
    pub row_index: usize,
    #[serde(default)]
    pub raw_fields: RawRow,
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-text type or model, matched against the reference catalog
    #[serde(default)]
    pub type_or_model: String,
    #[serde(default)]
    pub declared_capacity: Option<String>,
    #[serde(default)]
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub cost_basis: Option<Decimal>,
    /// Cost was derived from the list price rather than read from the row
    #[serde(default)]
    pub cost_estimated: bool,
}

impl InputProductDescriptor {
    pub fn new(row_index: usize, type_or_model: impl Into<String>) -> Self {
        Self {
            row_index,
            type_or_model: type_or_model.into(),
            ..Default::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_capacity(mut self, capacity: impl Into<String>) -> Self {
        self.declared_capacity = Some(capacity.into());
        self
    }

    pub fn with_list_price(mut self, price: Decimal) -> Self {
        self.list_price = Some(price);
        self
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost_basis = Some(cost);
        self
    }

    /// Trimmed model text, `None` when blank
    pub fn model_text(&self) -> Option<&str> {
        let trimmed = self.type_or_model.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// A row that could not be priced, kept in the run's error list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_index: usize,
    pub reason: String,
}

impl RowError {
    pub fn new(row_index: usize, reason: impl Into<String>) -> Self {
        Self {
            row_index,
            reason: reason.into(),
        }
    }
}

/// Body of `POST /api/pricing/run`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingRunRequest {
    pub rows: Vec<RawRow>,
    #[serde(default)]
    pub mapping: ColumnMapping,
}

/// Body of `POST /api/pricing/product`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPricingRequest {
    pub row: RawRow,
    #[serde(default)]
    pub mapping: ColumnMapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder() {
        let d = InputProductDescriptor::new(3, " 12X45 ")
            .with_brand("Acubat")
            .with_capacity("45Ah")
            .with_list_price(dec!(136490))
            .with_cost(dec!(81954));
        assert_eq!(d.row_index, 3);
        assert_eq!(d.model_text(), Some("12X45"));
        assert_eq!(d.brand.as_deref(), Some("Acubat"));
        assert_eq!(d.cost_basis, Some(dec!(81954)));
        assert!(!d.cost_estimated);
    }

    #[test]
    fn test_blank_model_text() {
        assert_eq!(InputProductDescriptor::new(0, "   ").model_text(), None);
    }

    #[test]
    fn test_run_request_mapping_is_optional() {
        let req: PricingRunRequest =
            serde_json::from_str(r#"{"rows":[{"Tipo":"12X45","Costo":81954}]}"#).unwrap();
        assert_eq!(req.rows.len(), 1);
        assert_eq!(req.mapping, ColumnMapping::default());

        let req: ProductPricingRequest =
            serde_json::from_str(r#"{"row":{"Tipo":"12X45"},"mapping":{"cost":"Neto"}}"#).unwrap();
        assert_eq!(req.row.len(), 1);
        assert_eq!(req.mapping.cost.as_deref(), Some("Neto"));
    }
}
