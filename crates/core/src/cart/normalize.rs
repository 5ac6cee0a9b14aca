//! Stored-cart normalization.
//!
//! Carts have been stored in two shapes over time:
//!
//! ```text
//! legacy:  [12, "13", 14]
//! current: [{"product": 12, "quantity": 2}, {"product": 13, "quantity": 1}]
//! ```
//!
//! [`normalize`] accepts either (or a mix) and never fails. Anything it cannot
//! make sense of degrades to a safe default, and each such fallback is logged
//! so bad records can be traced back without changing what callers see.

use serde_json::{Map, Number, Value};

use super::{Cart, CartLine};
use crate::types::ProductId;

/// Field holding the product reference on current-shape lines.
const PRODUCT_FIELD: &str = "product";

/// Alternate product field written by some older clients.
const PRODUCT_ID_FIELD: &str = "productId";

/// Field holding the quantity on current-shape lines.
const QUANTITY_FIELD: &str = "quantity";

/// Result of normalizing a stored cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The canonical cart.
    pub cart: Cart,
    /// Whether the stored value differs from the canonical shape and should
    /// be written back.
    pub healed: bool,
}

/// Convert any stored cart representation into a [`Cart`].
///
/// - Non-arrays become an empty cart.
/// - Objects with a `product` (or `productId`) keep that product; the
///   quantity survives only if it is a positive whole number, otherwise 1.
/// - Bare identifiers (numbers or numeric strings) become a line of 1.
/// - Anything else cannot name a product and is dropped.
///
/// Normalizing the output of [`Cart::to_raw`] returns the same cart.
#[must_use]
pub fn normalize(raw: &Value) -> Cart {
    let Value::Array(entries) = raw else {
        if !raw.is_null() {
            tracing::warn!(
                shape = value_kind(raw),
                "stored cart is not an array, treating as empty"
            );
        }
        return Cart::new();
    };

    Cart::from_lines(
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| normalize_entry(index, entry)),
    )
}

/// Normalize a stored cart and report whether it needs to be written back.
#[must_use]
pub fn normalize_stored(raw: &Value) -> Normalized {
    let cart = normalize(raw);
    let healed = cart.to_raw() != *raw;
    Normalized { cart, healed }
}

fn normalize_entry(index: usize, entry: &Value) -> Option<CartLine> {
    match entry {
        Value::Object(fields) => {
            let Some(product) = product_reference(fields) else {
                tracing::warn!(
                    index,
                    "dropping cart entry with no usable product reference"
                );
                return None;
            };
            Some(CartLine {
                product,
                quantity: coerce_quantity(index, fields.get(QUANTITY_FIELD)),
            })
        }
        other => {
            let product = parse_product_id(other);
            if product.is_none() {
                tracing::warn!(
                    index,
                    shape = value_kind(other),
                    "dropping cart entry that is not a product identifier"
                );
            }
            product.map(CartLine::single)
        }
    }
}

/// Resolve the product a current-shape line refers to.
///
/// Populated documents (`{"product": {"_id": 12, ...}}`) are unwrapped to
/// their identifier.
fn product_reference(fields: &Map<String, Value>) -> Option<ProductId> {
    let reference = [PRODUCT_FIELD, PRODUCT_ID_FIELD]
        .into_iter()
        .filter_map(|key| fields.get(key))
        .find(|value| !value.is_null())?;

    match reference {
        Value::Object(document) => ["_id", "id"]
            .into_iter()
            .filter_map(|key| document.get(key))
            .find_map(parse_product_id),
        other => parse_product_id(other),
    }
}

fn parse_product_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .map(ProductId::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn coerce_quantity(index: usize, value: Option<&Value>) -> u32 {
    let Some(value) = value else {
        tracing::debug!(index, "cart entry has no quantity, defaulting to 1");
        return 1;
    };

    match value {
        Value::Number(n) => whole_positive(n).unwrap_or_else(|| {
            tracing::warn!(index, quantity = %n, "invalid cart quantity, defaulting to 1");
            1
        }),
        other => {
            tracing::warn!(
                index,
                shape = value_kind(other),
                "non-numeric cart quantity, defaulting to 1"
            );
            1
        }
    }
}

/// A JSON number as a quantity, if it is a whole number in `1..=u32::MAX`.
///
/// Accepts float encodings of whole numbers (`3.0`), which some drivers
/// produce for numeric fields.
fn whole_positive(n: &Number) -> Option<u32> {
    let whole = n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| (1.0..=f64::from(u32::MAX)).contains(f))
            .map(float_to_u64)
    })?;
    u32::try_from(whole).ok().filter(|q| *q > 0)
}

// Callers check range and integrality first.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u64(f: f64) -> u64 {
    f as u64
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn p(id: i32) -> ProductId {
        ProductId::new(id)
    }

    fn lines(cart: &Cart) -> Vec<(i32, u32)> {
        cart.lines()
            .iter()
            .map(|line| (line.product.as_i32(), line.quantity))
            .collect()
    }

    #[test]
    fn test_non_array_is_empty() {
        for raw in [
            json!(null),
            json!(true),
            json!(7),
            json!("12"),
            json!({ "product": 1, "quantity": 2 }),
        ] {
            assert!(normalize(&raw).is_empty(), "expected empty cart for {raw}");
        }
    }

    #[test]
    fn test_legacy_identifiers() {
        let cart = normalize(&json!([1, 2, 3]));
        assert_eq!(lines(&cart), vec![(1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_legacy_string_identifiers() {
        let cart = normalize(&json!(["4", " 5 "]));
        assert_eq!(lines(&cart), vec![(4, 1), (5, 1)]);
    }

    #[test]
    fn test_current_shape_kept() {
        let cart = normalize(&json!([
            { "product": 1, "quantity": 3 },
            { "product": 2, "quantity": 1 },
        ]));
        assert_eq!(lines(&cart), vec![(1, 3), (2, 1)]);
    }

    #[test]
    fn test_mixed_shapes() {
        let cart = normalize(&json!([9, { "product": 1, "quantity": 2 }, "3"]));
        assert_eq!(lines(&cart), vec![(9, 1), (1, 2), (3, 1)]);
    }

    #[test]
    fn test_bad_quantities_default_to_one() {
        let cart = normalize(&json!([
            { "product": 1, "quantity": 0 },
            { "product": 2, "quantity": -4 },
            { "product": 3, "quantity": "5" },
            { "product": 4, "quantity": null },
            { "product": 5 },
            { "product": 6, "quantity": 2.5 },
        ]));
        assert_eq!(
            lines(&cart),
            vec![(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1)]
        );
    }

    #[test]
    fn test_whole_float_quantity_kept() {
        let cart = normalize(&json!([{ "product": 1, "quantity": 3.0 }]));
        assert_eq!(lines(&cart), vec![(1, 3)]);
    }

    #[test]
    fn test_product_id_alias_and_string_reference() {
        let cart = normalize(&json!([
            { "productId": 7, "quantity": 2 },
            { "product": "8", "quantity": 1 },
        ]));
        assert_eq!(lines(&cart), vec![(7, 2), (8, 1)]);
    }

    #[test]
    fn test_populated_product_document() {
        let cart = normalize(&json!([
            { "product": { "_id": 11, "name": "Jeans" }, "quantity": 2 },
            { "product": { "id": 12 } },
        ]));
        assert_eq!(lines(&cart), vec![(11, 2), (12, 1)]);
    }

    #[test]
    fn test_unusable_entries_dropped() {
        let cart = normalize(&json!([
            null,
            false,
            [1],
            "not-an-id",
            { "quantity": 3 },
            { "product": null },
            { "product": { "name": "no id" } },
            2,
        ]));
        assert_eq!(lines(&cart), vec![(2, 1)]);
    }

    #[test]
    fn test_out_of_range_identifier_dropped() {
        let cart = normalize(&json!([i64::from(i32::MAX) + 1, 1]));
        assert_eq!(lines(&cart), vec![(1, 1)]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let cart = normalize(&json!([1, { "product": 1, "quantity": 4 }]));
        assert_eq!(lines(&cart), vec![(1, 1), (1, 4)]);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            json!([1, "2", { "product": 3, "quantity": 0 }]),
            json!([{ "productId": 4, "quantity": 6, "extra": true }]),
            json!(null),
            json!([]),
            json!([{ "product": { "_id": 5 } }, 5]),
        ];
        for raw in inputs {
            let once = normalize(&raw);
            let twice = normalize(&once.to_raw());
            assert_eq!(once, twice, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_normalize_stored_reports_healing() {
        let legacy = normalize_stored(&json!([1, 2]));
        assert!(legacy.healed);
        assert_eq!(legacy.cart.product_ids(), vec![p(1), p(2)]);

        let canonical = normalize_stored(&json!([{ "product": 1, "quantity": 2 }]));
        assert!(!canonical.healed);

        let empty = normalize_stored(&json!([]));
        assert!(!empty.healed);

        let missing = normalize_stored(&json!(null));
        assert!(missing.healed);
        assert!(missing.cart.is_empty());
    }
}
