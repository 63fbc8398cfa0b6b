//! Row Mapper
//!
//! Turns raw spreadsheet rows into [`InputProductDescriptor`]s. Column hints
//! win; otherwise headers are matched against known Spanish and English names
//! after case and accent folding.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::*;
use serde_json::Value;
use shared::models::{ColumnMapping, InputProductDescriptor, RawRow, RowError};

const BRAND_HEADERS: &[&str] = &["marca", "brand", "fabricante"];
const MODEL_HEADERS: &[&str] = &[
    "tipo",
    "type",
    "id_bateria",
    "modelo",
    "model",
    "codigo",
    "code",
    "referencia",
];
const CAPACITY_HEADERS: &[&str] = &["capacidad", "capacity", "ah", "amperaje"];
const LIST_PRICE_HEADERS: &[&str] = &[
    "precio_lista",
    "precio_de_lista",
    "list_price",
    "pvp",
    "precio_pvp",
    "precio",
    "price",
];
const COST_HEADERS: &[&str] = &[
    "costo",
    "coste",
    "cost",
    "precio_costo",
    "costo_neto",
    "precio_neto",
    "neto",
];

/// Fold a header for comparison: "Precio de Lista" -> "precio_de_lista"
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    for ch in header.trim().chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            c if c.is_ascii_alphanumeric() => c,
            _ => '_',
        };
        if folded == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(folded);
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Parse a locale-formatted amount
///
/// With both separators the last one is the decimal mark. A lone separator
/// followed by exactly three digits groups thousands ("136.490"), otherwise it
/// is the decimal mark ("12,5"). Repeated separators always group thousands.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized: String = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            let (decimal, group) = if dot > comma { ('.', ',') } else { (',', '.') };
            cleaned
                .chars()
                .filter(|&c| c != group)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (Some(_), None) => single_separator(&cleaned, '.'),
        (None, Some(_)) => single_separator(&cleaned, ','),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

fn single_separator(cleaned: &str, sep: char) -> String {
    let occurrences = cleaned.matches(sep).count();
    let digits_after = cleaned
        .rsplit(sep)
        .next()
        .map(|tail| tail.chars().filter(char::is_ascii_digit).count())
        .unwrap_or(0);

    if occurrences > 1 || digits_after == 3 {
        cleaned.chars().filter(|&c| c != sep).collect()
    } else {
        cleaned.replace(sep, ".")
    }
}

/// Cost derived from a list price: `list * percent / 100`
pub fn estimate_cost(list_price: Decimal, estimated_cost_percent: Decimal) -> Option<Decimal> {
    list_price
        .checked_mul(estimated_cost_percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Normalized header -> original key, first occurrence wins
struct HeaderIndex<'r> {
    row: &'r RawRow,
    keys: HashMap<String, &'r str>,
}

impl<'r> HeaderIndex<'r> {
    fn new(row: &'r RawRow) -> Self {
        let mut keys = HashMap::with_capacity(row.len());
        for key in row.keys() {
            keys.entry(normalize_header(key)).or_insert(key.as_str());
        }
        Self { row, keys }
    }

    fn find(&self, hint: Option<&str>, candidates: &[&str]) -> Option<&'r Value> {
        hint.map(normalize_header)
            .into_iter()
            .chain(candidates.iter().map(|c| c.to_string()))
            .find_map(|name| self.keys.get(&name))
            .and_then(|key| self.row.get(*key))
    }
}

/// Map one raw row, or explain why it cannot be priced
pub fn map_row(
    row_index: usize,
    row: &RawRow,
    mapping: &ColumnMapping,
    estimated_cost_percent: Decimal,
) -> Result<InputProductDescriptor, RowError> {
    let index = HeaderIndex::new(row);

    let model = index
        .find(mapping.model.as_deref(), MODEL_HEADERS)
        .and_then(cell_text)
        .ok_or_else(|| RowError::new(row_index, "missing type/model"))?;

    let mut descriptor = InputProductDescriptor::new(row_index, model);
    descriptor.raw_fields = row.clone();
    descriptor.brand = index
        .find(mapping.brand.as_deref(), BRAND_HEADERS)
        .and_then(cell_text);
    descriptor.declared_capacity = index
        .find(mapping.capacity.as_deref(), CAPACITY_HEADERS)
        .and_then(cell_text);
    descriptor.list_price = index
        .find(mapping.list_price.as_deref(), LIST_PRICE_HEADERS)
        .and_then(cell_amount);
    descriptor.cost_basis = index
        .find(mapping.cost.as_deref(), COST_HEADERS)
        .and_then(cell_amount);

    fill_estimated_cost(descriptor, estimated_cost_percent)
}

/// Estimate a missing cost from the list price; rows with neither are rejected
pub fn fill_estimated_cost(
    mut descriptor: InputProductDescriptor,
    estimated_cost_percent: Decimal,
) -> Result<InputProductDescriptor, RowError> {
    match (descriptor.cost_basis, descriptor.list_price) {
        (Some(_), _) => Ok(descriptor),
        (None, Some(list)) => match estimate_cost(list, estimated_cost_percent) {
            Some(cost) => {
                descriptor.cost_basis = Some(cost);
                descriptor.cost_estimated = true;
                Ok(descriptor)
            }
            None => Err(RowError::new(descriptor.row_index, "estimated cost out of range")),
        },
        (None, None) => Err(RowError::new(descriptor.row_index, "missing cost and list price")),
    }
}

pub fn map_rows(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    estimated_cost_percent: Decimal,
) -> Vec<Result<InputProductDescriptor, RowError>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| map_row(i, row, mapping, estimated_cost_percent))
        .collect()
}
