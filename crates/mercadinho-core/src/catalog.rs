//! # Catalog Store
//!
//! Product catalog operations: registration, code generation, edits and
//! lookups.
//!
//! ## Product Code Generation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Category "Alimentos"                                                   │
//! │       │                                                                 │
//! │       ▼  strip non-alphanumerics, uppercase, first 3 chars             │
//! │  Prefix "ALI"                                                           │
//! │       │                                                                 │
//! │       ▼  count existing codes with the prefix, add 1, pad to 4         │
//! │  Code "ALI0007"                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All operations take the product list explicitly; persistence lives in
//! the callers.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Product, Unit};
use crate::validation::{
    validate_category, validate_price, validate_product_code, validate_product_name,
    validate_stock,
};

// =============================================================================
// Request Types
// =============================================================================

/// A product registration request. The code is generated, never supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub quantity: Quantity,
    pub unit: Unit,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A partial product edit. `None` fields keep their current value;
/// `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<Quantity>,
    pub unit: Option<Unit>,
    pub category: Option<String>,
    pub image: Option<Option<String>>,
}

// =============================================================================
// Lookups
// =============================================================================

/// Finds a product by code. The one lookup every other module goes
/// through.
pub fn find_product<'a>(products: &'a [Product], code: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.code == code)
}

/// Mutable variant of [`find_product`].
pub fn find_product_mut<'a>(products: &'a mut [Product], code: &str) -> Option<&'a mut Product> {
    products.iter_mut().find(|p| p.code == code)
}

/// Products in a category, sorted by name.
pub fn products_in_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    let mut found: Vec<&Product> = products
        .iter()
        .filter(|p| p.category == category)
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// Distinct category names, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    names.sort();
    names.dedup();
    names
}

// =============================================================================
// Code Generation
// =============================================================================

/// Derives the next product code for a category.
///
/// ## Rules
/// - Prefix: category with non-alphanumerics stripped, uppercased,
///   truncated to 3 characters (`"Alimentos"` → `ALI`).
/// - Sequence: count of existing codes sharing the prefix, plus one,
///   zero-padded to 4 digits.
/// - A category with no letters or digits cannot form a prefix and is
///   rejected.
///
/// ## Example
/// ```rust
/// use mercadinho_core::catalog::generate_product_code;
///
/// let code = generate_product_code(&[], "Alimentos").unwrap();
/// assert_eq!(code, "ALI0001");
/// ```
pub fn generate_product_code(products: &[Product], category: &str) -> CoreResult<String> {
    let prefix: String = category
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .take(3)
        .collect();

    if prefix.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "category".to_string(),
            reason: "must contain at least one letter or digit".to_string(),
        }
        .into());
    }

    let sequence = products
        .iter()
        .filter(|p| p.code.starts_with(&prefix))
        .count()
        + 1;

    Ok(format!("{}{:04}", prefix, sequence))
}

// =============================================================================
// Mutations
// =============================================================================

/// Registers a new product and returns its generated code.
///
/// ## Validation
/// - name required, at most 80 characters
/// - category required, must yield a code prefix
/// - price and stock non-negative
/// - a generated code that already exists is rejected as a duplicate
pub fn add_product(products: &mut Vec<Product>, draft: NewProduct) -> CoreResult<String> {
    validate_product_name(&draft.name)?;
    validate_category(&draft.category)?;
    validate_price(draft.price)?;
    validate_stock(draft.quantity)?;

    let code = generate_product_code(products, &draft.category)?;
    if find_product(products, &code).is_some() {
        return Err(ValidationError::Duplicate {
            field: "code".to_string(),
            value: code,
        }
        .into());
    }

    products.push(Product {
        code: code.clone(),
        name: draft.name.trim().to_string(),
        price: draft.price,
        quantity: draft.quantity,
        unit: draft.unit,
        category: draft.category.trim().to_string(),
        image: draft.image,
    });

    Ok(code)
}

/// Applies a partial edit to a product.
///
/// Stock edits clamp at zero from below rather than erroring, matching
/// how stocktake corrections have always been entered.
pub fn edit_product(
    products: &mut [Product],
    code: &str,
    changes: ProductUpdate,
) -> CoreResult<()> {
    validate_product_code(code)?;

    if let Some(name) = &changes.name {
        validate_product_name(name)?;
    }
    if let Some(category) = &changes.category {
        validate_category(category)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }

    let product = find_product_mut(products, code)
        .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

    if let Some(name) = changes.name {
        product.name = name.trim().to_string();
    }
    if let Some(price) = changes.price {
        product.price = price;
    }
    if let Some(quantity) = changes.quantity {
        product.quantity = quantity.clamp_non_negative();
    }
    if let Some(unit) = changes.unit {
        product.unit = unit;
    }
    if let Some(category) = changes.category {
        product.category = category.trim().to_string();
    }
    if let Some(image) = changes.image {
        product.image = image;
    }

    Ok(())
}

/// Removes a product from the catalog and returns it.
///
/// Cart lines and ledger entries are snapshots, so nothing guards
/// against removing a product that is referenced by either.
pub fn remove_product(products: &mut Vec<Product>, code: &str) -> CoreResult<Product> {
    validate_product_code(code)?;

    let position = products
        .iter()
        .position(|p| p.code == code)
        .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

    Ok(products.remove(position))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Money::from_centavos(500),
            quantity: Quantity::from_units(10),
            unit: Unit::Unit,
            category: category.to_string(),
            image: None,
        }
    }

    #[test]
    fn test_generate_product_code_sequences_per_prefix() {
        let mut products = Vec::new();

        let first = add_product(&mut products, draft("Arroz 5kg", "Alimentos")).unwrap();
        let second = add_product(&mut products, draft("Feijão 1kg", "Alimentos")).unwrap();
        let other = add_product(&mut products, draft("Detergente", "Limpeza")).unwrap();

        assert_eq!(first, "ALI0001");
        assert_eq!(second, "ALI0002");
        assert_eq!(other, "LIM0001");
    }

    #[test]
    fn test_generate_product_code_strips_and_uppercases() {
        assert_eq!(
            generate_product_code(&[], "horti-frúti 2024").unwrap(),
            "HOR0001"
        );
        assert!(generate_product_code(&[], "---").is_err());
    }

    #[test]
    fn test_generate_product_code_short_category() {
        // Fewer than 3 usable chars just makes a shorter prefix.
        assert_eq!(generate_product_code(&[], "Ovo").unwrap(), "OVO0001");
        assert_eq!(generate_product_code(&[], "A1").unwrap(), "A10001");
    }

    #[test]
    fn test_add_product_rejects_duplicate_code() {
        let mut products = Vec::new();
        add_product(&mut products, draft("Arroz", "Alimentos")).unwrap();
        // Removing the earlier entry makes the counter collide with a
        // manually re-inserted code.
        products.push(Product {
            code: "ALI0002".to_string(),
            name: "Feijão".to_string(),
            price: Money::from_centavos(800),
            quantity: Quantity::from_units(5),
            unit: Unit::Unit,
            category: "Alimentos".to_string(),
            image: None,
        });
        products.remove(0);

        // One "ALI" code exists, so the generator proposes ALI0002 again.
        let result = add_product(&mut products, draft("Macarrão", "Alimentos"));
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_add_product_validates_fields() {
        let mut products = Vec::new();

        assert!(add_product(&mut products, draft("", "Alimentos")).is_err());
        assert!(add_product(&mut products, draft("Arroz", "")).is_err());

        let mut negative_price = draft("Arroz", "Alimentos");
        negative_price.price = Money::from_centavos(-1);
        assert!(add_product(&mut products, negative_price).is_err());

        let mut negative_stock = draft("Arroz", "Alimentos");
        negative_stock.quantity = Quantity::from_thousandths(-500);
        assert!(add_product(&mut products, negative_stock).is_err());

        assert!(products.is_empty());
    }

    #[test]
    fn test_edit_product_clamps_negative_stock() {
        let mut products = Vec::new();
        let code = add_product(&mut products, draft("Arroz", "Alimentos")).unwrap();

        edit_product(
            &mut products,
            &code,
            ProductUpdate {
                quantity: Some(Quantity::from_thousandths(-2000)),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(products[0].quantity, Quantity::zero());
    }

    #[test]
    fn test_edit_product_partial_update() {
        let mut products = Vec::new();
        let code = add_product(&mut products, draft("Arroz", "Alimentos")).unwrap();

        edit_product(
            &mut products,
            &code,
            ProductUpdate {
                price: Some(Money::from_centavos(2790)),
                image: Some(Some("arroz.png".to_string())),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(products[0].name, "Arroz");
        assert_eq!(products[0].price, Money::from_centavos(2790));
        assert_eq!(products[0].image.as_deref(), Some("arroz.png"));

        let missing = edit_product(&mut products, "XXX9999", ProductUpdate::default());
        assert!(matches!(missing, Err(CoreError::ProductNotFound(_))));
    }

    #[test]
    fn test_remove_product() {
        let mut products = Vec::new();
        let code = add_product(&mut products, draft("Arroz", "Alimentos")).unwrap();

        let removed = remove_product(&mut products, &code).unwrap();
        assert_eq!(removed.code, code);
        assert!(products.is_empty());

        assert!(matches!(
            remove_product(&mut products, &code),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_category_queries() {
        let mut products = Vec::new();
        add_product(&mut products, draft("Feijão", "Alimentos")).unwrap();
        add_product(&mut products, draft("Arroz", "Alimentos")).unwrap();
        add_product(&mut products, draft("Sabão", "Limpeza")).unwrap();

        let food = products_in_category(&products, "Alimentos");
        let names: Vec<&str> = food.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Arroz", "Feijão"]);

        assert_eq!(categories(&products), vec!["Alimentos", "Limpeza"]);
    }
}
