//! # Cart Math
//!
//! Pure calculations behind the persisted cart: line totals, the cached cart
//! total and the checks run before a line is added or merged.
//!
//! ## Add-to-Cart Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/cart/lines { product, size, quantity: 2 }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  merge_line_quantity(existing 1, adding 2, stock 5) ← THIS MODULE      │
//! │       │                                                                 │
//! │       ├── adding <= 0 or > 999      → ValidationError                  │
//! │       ├── merged > 999              → QuantityTooLarge                 │
//! │       ├── merged > stock            → InsufficientStock                │
//! │       └── OK(3)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  upsert line, then cart_total(lines) is written back to the cart       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check here is advisory. Checkout re-checks stock with an atomic
//! decrement and is the only gate that actually protects inventory.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SizeLabel;
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// A cart line reduced to what the total depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i64,
}

impl PricedLine {
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        PricedLine {
            unit_price,
            quantity,
        }
    }

    /// unit price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Σ quantity × unit price. An empty cart totals zero.
pub fn cart_total(lines: &[PricedLine]) -> Money {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Quantity a line will hold after adding `adding` units to `existing`.
///
/// `existing` is 0 when the line does not exist yet. `available` is the
/// current stock of the size.
pub fn merge_line_quantity(
    product: &str,
    size: SizeLabel,
    existing: i64,
    adding: i64,
    available: i64,
) -> CoreResult<i64> {
    validate_quantity(adding)?;

    let merged = existing + adding;
    if merged > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: merged,
            max: MAX_ITEM_QUANTITY,
        });
    }

    if merged > available {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            size: size.to_string(),
            available,
            requested: merged,
        });
    }

    Ok(merged)
}

/// Rejects a brand-new line when the cart already holds the maximum.
pub fn check_cart_capacity(current_lines: usize, is_new_line: bool) -> CoreResult<()> {
    if is_new_line && current_lines >= MAX_CART_LINES {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
