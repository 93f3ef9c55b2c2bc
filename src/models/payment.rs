//! Payment structure models.
//!
//! A [`PaymentStructure`] is the template an employee is paid against: ordered
//! additions and deductions whose amounts are Fixed, Range or Unspecified.
//! Resolution turns it into a [`ResolvedPaymentStructure`] with concrete
//! amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of the synthetic EPF deduction appended during resolution.
pub const EPF_LINE_ITEM: &str = "EPF 8%";

/// The amount specification of a line item or a target salary.
///
/// # Example
///
/// ```
/// use salary_engine::models::AmountSpec;
/// use rust_decimal::Decimal;
///
/// let spec: AmountSpec =
///     serde_json::from_str(r#"{ "kind": "range", "min": "2000", "max": "4000" }"#).unwrap();
/// assert_eq!(spec, AmountSpec::range(Decimal::new(2000, 0), Decimal::new(4000, 0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountSpec {
    /// A fixed amount, rounded to the nearest 100 on resolution.
    Fixed {
        /// The configured amount.
        amount: Decimal,
    },
    /// Any multiple of 100 within `[min, max]`.
    Range {
        /// Lower bound (inclusive).
        min: Decimal,
        /// Upper bound (inclusive).
        max: Decimal,
    },
    /// No amount configured; one is generated from the basic salary.
    #[default]
    Unspecified,
}

impl AmountSpec {
    /// Creates a fixed amount spec.
    pub fn fixed(amount: Decimal) -> Self {
        AmountSpec::Fixed { amount }
    }

    /// Creates a range amount spec.
    pub fn range(min: Decimal, max: Decimal) -> Self {
        AmountSpec::Range { min, max }
    }
}

/// A named addition or deduction in a payment structure template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLineItem {
    /// Name of the item, unique within its list.
    pub name: String,
    /// How the amount is determined.
    #[serde(default)]
    pub amount: AmountSpec,
    /// Whether the item counts towards the EPF base.
    #[serde(default)]
    pub affects_total_earnings: bool,
}

impl PaymentLineItem {
    /// Creates a line item.
    pub fn new(name: impl Into<String>, amount: AmountSpec, affects_total_earnings: bool) -> Self {
        Self {
            name: name.into(),
            amount,
            affects_total_earnings,
        }
    }
}

/// Ordered additions and deductions making up a payment structure template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStructure {
    /// Additions, in display order.
    #[serde(default)]
    pub additions: Vec<PaymentLineItem>,
    /// Deductions, in display order.
    #[serde(default)]
    pub deductions: Vec<PaymentLineItem>,
}

/// A line item with its resolved amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLineItem {
    /// Name of the item.
    pub name: String,
    /// Resolved amount.
    pub amount: Decimal,
    /// Whether the item counts towards the EPF base.
    pub affects_total_earnings: bool,
}

/// A payment structure with concrete amounts, including the EPF deduction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaymentStructure {
    /// Resolved additions.
    pub additions: Vec<ResolvedLineItem>,
    /// Resolved deductions, ending with the EPF deduction.
    pub deductions: Vec<ResolvedLineItem>,
}

impl ResolvedPaymentStructure {
    /// Sum of all additions.
    pub fn total_additions(&self) -> Decimal {
        self.additions.iter().map(|item| item.amount).sum()
    }

    /// Sum of all deductions, EPF included.
    pub fn total_deductions(&self) -> Decimal {
        self.deductions.iter().map(|item| item.amount).sum()
    }

    /// Returns the EPF deduction, if the structure has been resolved.
    pub fn epf(&self) -> Option<&ResolvedLineItem> {
        self.deductions.iter().find(|item| item.name == EPF_LINE_ITEM)
    }
}
