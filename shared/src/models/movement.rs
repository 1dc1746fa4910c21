//! Stock movement ledger models
//!
//! Every change to a product's quantity is an immutable movement. The sign of
//! the change comes from the movement type, never from the stored quantity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StockError;

/// Fixed set of movement types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Sale,
    Receipt,
    Adjustment,
    Return,
    Damage,
}

impl MovementType {
    pub const ALL: [MovementType; 5] = [
        MovementType::Sale,
        MovementType::Receipt,
        MovementType::Adjustment,
        MovementType::Return,
        MovementType::Damage,
    ];

    /// Types accepted by the manual adjustment path
    pub const MANUAL_ADJUSTMENTS: [MovementType; 3] = [
        MovementType::Adjustment,
        MovementType::Damage,
        MovementType::Return,
    ];

    /// Arithmetic effect on stock: +1 or -1
    pub fn sign(self) -> i32 {
        match self {
            MovementType::Sale | MovementType::Damage => -1,
            MovementType::Receipt | MovementType::Adjustment | MovementType::Return => 1,
        }
    }

    pub fn is_decrease(self) -> bool {
        self.sign() < 0
    }

    pub fn is_manual_adjustment(self) -> bool {
        Self::MANUAL_ADJUSTMENTS.contains(&self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::Receipt => "receipt",
            MovementType::Adjustment => "adjustment",
            MovementType::Return => "return",
            MovementType::Damage => "damage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MovementType::Sale => "Product sold to customer",
            MovementType::Receipt => "Stock received from supplier",
            MovementType::Adjustment => "Manual stock adjustment",
            MovementType::Return => "Customer return",
            MovementType::Damage => "Damaged or expired stock",
        }
    }

    /// Parse a type name for the manual adjustment path.
    /// `receipt` and `sale` are valid movement types but are rejected here.
    pub fn parse_manual_adjustment(name: &str) -> Result<Self, StockError> {
        let movement_type: MovementType = name.parse()?;
        if movement_type.is_manual_adjustment() {
            Ok(movement_type)
        } else {
            Err(StockError::InvalidMovementType(name.to_string()))
        }
    }
}

impl FromStr for MovementType {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovementType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StockError::InvalidMovementType(s.to_string()))
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference data row describing a movement type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementTypeInfo {
    pub name: MovementType,
    pub description: String,
    pub sign: i32,
}

impl From<MovementType> for MovementTypeInfo {
    fn from(movement_type: MovementType) -> Self {
        Self {
            name: movement_type,
            description: movement_type.description().to_string(),
            sign: movement_type.sign(),
        }
    }
}

/// A recorded stock movement. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_sku: String,
    pub product_name: Option<String>,
    pub movement_type: MovementType,
    /// Always positive; direction comes from `movement_type`
    pub quantity: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reference_id: Option<String>,
    pub reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub performed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn signed_quantity(&self) -> i32 {
        self.movement_type.sign() * self.quantity
    }

    /// Snapshot consistency: `new = previous + sign * quantity` and never negative
    pub fn is_consistent(&self) -> bool {
        self.quantity > 0
            && self.new_quantity >= 0
            && self.previous_quantity + self.signed_quantity() == self.new_quantity
    }
}

/// Effect of applying one movement to a product's current quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockChange {
    pub movement_type: MovementType,
    pub quantity: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
}

impl StockChange {
    pub fn delta(&self) -> i32 {
        self.new_quantity - self.previous_quantity
    }
}

/// Compute the stock change for a movement against the current quantity.
///
/// Rejects non-positive quantities and any decrease that would leave the
/// product with negative stock. Nothing is written by this function; callers
/// persist the returned snapshots inside the same locked transaction that
/// read `current`.
pub fn apply_movement(
    sku: &str,
    current: i32,
    movement_type: MovementType,
    quantity: i32,
) -> Result<StockChange, StockError> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity {
            sku: sku.to_string(),
            quantity,
        });
    }

    let new_quantity = current
        .checked_add(movement_type.sign() * quantity)
        .ok_or_else(|| StockError::QuantityOverflow(sku.to_string()))?;

    if new_quantity < 0 {
        return Err(StockError::InsufficientStock {
            sku: sku.to_string(),
            available: current,
            requested: quantity,
        });
    }

    Ok(StockChange {
        movement_type,
        quantity,
        previous_quantity: current,
        new_quantity,
    })
}

/// Quantity implied by replaying a product's movements from zero
pub fn ledger_balance<'a, I>(movements: I) -> i64
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    movements
        .into_iter()
        .map(|m| i64::from(m.signed_quantity()))
        .sum()
}
