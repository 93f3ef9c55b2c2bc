//! Compensation resolution.
//!
//! Resolves a [`PaymentStructure`] of Fixed, Range and Unspecified line items
//! into concrete amounts, steers the adjustable items towards an optional
//! target salary, appends the EPF deduction and computes the final salary.
//!
//! Every resolved line item (EPF excepted) is a non-negative multiple of 100,
//! and every ranged item stays within its configured bounds. When the ranges
//! cannot absorb the adjustment a target needs, the result is left
//! approximate and the unabsorbed amount is reported as a shortfall.

use rand::{Rng, RngCore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AmountSpec, EPF_LINE_ITEM, PaymentLineItem, PaymentStructure, ResolvedLineItem,
    ResolvedPaymentStructure, SalaryRecord,
};

use super::random::{
    HUNDRED, hundreds_within, random_hundred_within, round_to_hundred, zero_centred,
};

/// EPF withholding rate (8%).
pub const EPF_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Lower bound of a generated Unspecified amount, in basis points of basic.
const UNSPECIFIED_MIN_BPS: i64 = 500;

/// Upper bound of a generated Unspecified amount, in basis points of basic.
const UNSPECIFIED_MAX_BPS: i64 = 1500;

/// Per-slot variation applied when spreading an adjustment (10%).
const SLOT_VARIATION: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// The figures resolution starts from.
#[derive(Debug, Clone, Copy)]
pub struct CompensationInput<'a> {
    /// Basic salary.
    pub basic: Decimal,
    /// Target total salary; `Unspecified` means none.
    pub target: &'a AmountSpec,
    /// Overtime payment.
    pub ot: Decimal,
    /// Holiday pay.
    pub holiday_pay: Decimal,
    /// No-pay deduction.
    pub no_pay: Decimal,
    /// The payment structure template.
    pub structure: &'a PaymentStructure,
    /// The record being updated, in update mode.
    pub existing: Option<&'a SalaryRecord>,
}

/// The result of resolving compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    /// Resolved structure, ending with the EPF deduction.
    pub payment_structure: ResolvedPaymentStructure,
    /// The EPF base.
    pub basic_for_salary: Decimal,
    /// Net salary.
    pub final_salary: Decimal,
    /// The resolved target, if one was set.
    pub target: Option<Decimal>,
    /// Adjustment the adjustable items could not absorb (zero when reconciled).
    pub shortfall: Decimal,
}

/// An item being resolved, remembering its spec.
#[derive(Debug, Clone)]
struct Slot<'a> {
    item: &'a PaymentLineItem,
    amount: Decimal,
}

impl Slot<'_> {
    fn resolved(&self) -> ResolvedLineItem {
        ResolvedLineItem {
            name: self.item.name.clone(),
            amount: self.amount,
            affects_total_earnings: self.item.affects_total_earnings,
        }
    }
}

/// Validates a payment structure before resolution.
///
/// Rejects duplicate names within a list, a caller-supplied EPF item,
/// negative amounts, inverted ranges and ranges without a multiple of 100.
pub fn validate_payment_structure(structure: &PaymentStructure) -> EngineResult<()> {
    for list in [&structure.additions, &structure.deductions] {
        for (index, item) in list.iter().enumerate() {
            if item.name == EPF_LINE_ITEM {
                return Err(invalid(&item.name, "EPF is computed and cannot be supplied"));
            }
            if list[..index].iter().any(|other| other.name == item.name) {
                return Err(invalid(&item.name, "duplicate line item name"));
            }
            validate_amount(&item.name, &item.amount)?;
        }
    }
    Ok(())
}

fn validate_amount(name: &str, spec: &AmountSpec) -> EngineResult<()> {
    match spec {
        AmountSpec::Fixed { amount } if *amount < Decimal::ZERO => {
            Err(invalid(name, "amount must not be negative"))
        }
        AmountSpec::Range { min, .. } if *min < Decimal::ZERO => {
            Err(invalid(name, "range minimum must not be negative"))
        }
        AmountSpec::Range { min, max } if min > max => {
            Err(invalid(name, &format!("range minimum {} exceeds maximum {}", min, max)))
        }
        AmountSpec::Range { min, max } if hundreds_within(*min, *max).is_none() => Err(invalid(
            name,
            &format!("range {}-{} contains no multiple of 100", min, max),
        )),
        _ => Ok(()),
    }
}

fn invalid(item: &str, message: &str) -> EngineError {
    EngineError::InvalidPaymentStructure {
        item: item.to_string(),
        message: message.to_string(),
    }
}

/// Resolves an amount spec to a starting value.
fn initial_amount(spec: &AmountSpec, basic: Decimal, rng: &mut dyn RngCore) -> Decimal {
    match spec {
        AmountSpec::Fixed { amount } => round_to_hundred(*amount),
        AmountSpec::Range { min, max } => {
            random_hundred_within(*min, *max, rng).unwrap_or(Decimal::ZERO)
        }
        AmountSpec::Unspecified => {
            let bps = rng.gen_range(UNSPECIFIED_MIN_BPS..=UNSPECIFIED_MAX_BPS);
            round_to_hundred(basic * Decimal::new(bps, 4))
        }
    }
}

/// Resolves the target salary, if any.
fn resolve_target(spec: &AmountSpec, rng: &mut dyn RngCore) -> EngineResult<Option<Decimal>> {
    match spec {
        AmountSpec::Unspecified => Ok(None),
        AmountSpec::Fixed { amount } => Ok(Some(round_to_hundred(*amount))),
        AmountSpec::Range { min, max } => random_hundred_within(*min, *max, rng)
            .map(Some)
            .ok_or_else(|| invalid("target_salary", "range contains no multiple of 100")),
    }
}

fn is_ranged(slot: &&mut Slot<'_>) -> bool {
    matches!(slot.item.amount, AmountSpec::Range { .. })
}

fn is_unspecified(slot: &&mut Slot<'_>) -> bool {
    matches!(slot.item.amount, AmountSpec::Unspecified)
}

fn affecting_total(slots: &[Slot<'_>]) -> Decimal {
    slots
        .iter()
        .filter(|slot| slot.item.affects_total_earnings)
        .map(|slot| slot.amount)
        .sum()
}

/// Moves ranged items towards the adjustment, in order, while at least 100 remains.
///
/// `sign` is `+1` for additions and `-1` for deductions; `adjustment` is the
/// net amount still wanted and is reduced by whatever each item absorbs.
fn absorb_ranged(slots: &mut [&mut Slot<'_>], sign: Decimal, adjustment: &mut Decimal) {
    for slot in slots.iter_mut() {
        if adjustment.abs() < HUNDRED {
            break;
        }
        let AmountSpec::Range { min, max } = &slot.item.amount else {
            continue;
        };
        let Some((low, high)) = hundreds_within(*min, *max) else {
            continue;
        };

        let current = slot.amount;
        let wanted = round_to_hundred(current + sign * *adjustment);
        let new = wanted.clamp(low, high);
        *adjustment -= sign * (new - current);
        slot.amount = new;

        debug!(item = %slot.item.name, from = %current, to = %new, "Adjusted ranged item");
    }
}

/// Resolves compensation for one employee.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rust_decimal::Decimal;
/// use salary_engine::calculation::{CompensationInput, resolve_compensation};
/// use salary_engine::models::{AmountSpec, PaymentLineItem, PaymentStructure};
///
/// let structure = PaymentStructure {
///     additions: vec![PaymentLineItem::new(
///         "Meals",
///         AmountSpec::fixed(Decimal::new(1250, 0)),
///         false,
///     )],
///     deductions: vec![],
/// };
/// let input = CompensationInput {
///     basic: Decimal::new(50000, 0),
///     target: &AmountSpec::Unspecified,
///     ot: Decimal::ZERO,
///     holiday_pay: Decimal::ZERO,
///     no_pay: Decimal::ZERO,
///     structure: &structure,
///     existing: None,
/// };
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let resolved = resolve_compensation(&input, &mut rng).unwrap();
/// assert_eq!(resolved.payment_structure.additions[0].amount, Decimal::new(1300, 0));
/// assert_eq!(resolved.payment_structure.epf().unwrap().amount, Decimal::new(4000, 0));
/// assert_eq!(resolved.final_salary, Decimal::new(47300, 0));
/// ```
pub fn resolve_compensation(
    input: &CompensationInput<'_>,
    rng: &mut dyn RngCore,
) -> EngineResult<Compensation> {
    validate_payment_structure(input.structure)?;

    let mut additions: Vec<Slot<'_>> = input
        .structure
        .additions
        .iter()
        .map(|item| Slot {
            item,
            amount: initial_amount(&item.amount, input.basic, rng),
        })
        .collect();
    let mut deductions: Vec<Slot<'_>> = input
        .structure
        .deductions
        .iter()
        .map(|item| Slot {
            item,
            amount: initial_amount(&item.amount, input.basic, rng),
        })
        .collect();

    let target = resolve_target(input.target, rng)?;
    let mut shortfall = Decimal::ZERO;

    if let Some(target) = target.filter(|t| *t > Decimal::ZERO) {
        shortfall = reconcile(input, target, &mut additions, &mut deductions, rng);
    }

    let prior_no_pay = input
        .existing
        .map(|record| record.no_pay.amount)
        .unwrap_or(Decimal::ZERO);
    let basic_for_salary = input.basic + prior_no_pay + input.holiday_pay
        + affecting_total(&additions)
        - affecting_total(&deductions);

    let mut payment_structure = ResolvedPaymentStructure {
        additions: additions.iter().map(Slot::resolved).collect(),
        deductions: deductions.iter().map(Slot::resolved).collect(),
    };
    payment_structure.deductions.push(ResolvedLineItem {
        name: EPF_LINE_ITEM.to_string(),
        amount: basic_for_salary * EPF_RATE,
        affects_total_earnings: false,
    });

    let final_salary = input.basic
        + input.holiday_pay
        + payment_structure.total_additions()
        + input.ot
        - payment_structure.total_deductions()
        - input.no_pay;

    Ok(Compensation {
        payment_structure,
        basic_for_salary,
        final_salary,
        target,
        shortfall,
    })
}

/// Steers adjustable items towards the target; returns the unabsorbed adjustment.
fn reconcile<'a>(
    input: &CompensationInput<'_>,
    target: Decimal,
    additions: &mut [Slot<'a>],
    deductions: &mut [Slot<'a>],
    rng: &mut dyn RngCore,
) -> Decimal {
    let mut fixed_net = Decimal::ZERO;
    for (slots, sign) in [(&mut *additions, Decimal::ONE), (&mut *deductions, Decimal::NEGATIVE_ONE)] {
        for slot in slots.iter_mut() {
            match &slot.item.amount {
                AmountSpec::Fixed { .. } => fixed_net += sign * slot.amount,
                AmountSpec::Range { min, max } => {
                    slot.amount = hundreds_within(*min, *max).map_or(Decimal::ZERO, |(low, _)| low);
                    fixed_net += sign * slot.amount;
                }
                AmountSpec::Unspecified => slot.amount = Decimal::ZERO,
            }
        }
    }

    let amount_needed = target - input.ot - input.holiday_pay - input.basic
        + (input.basic + input.holiday_pay) * EPF_RATE;
    let mut adjustment = amount_needed - fixed_net;
    debug!(%target, %amount_needed, %adjustment, "Reconciling towards target");

    let mut ranged_deductions: Vec<&mut Slot<'a>> = deductions.iter_mut().filter(is_ranged).collect();
    absorb_ranged(&mut ranged_deductions, Decimal::NEGATIVE_ONE, &mut adjustment);
    let mut ranged_additions: Vec<&mut Slot<'a>> = additions.iter_mut().filter(is_ranged).collect();
    absorb_ranged(&mut ranged_additions, Decimal::ONE, &mut adjustment);

    let mut open_additions: Vec<&mut Slot<'a>> =
        additions.iter_mut().filter(is_unspecified).collect();
    let mut open_deductions: Vec<&mut Slot<'a>> =
        deductions.iter_mut().filter(is_unspecified).collect();
    let slot_count = open_additions.len() + open_deductions.len();

    if slot_count > 0 && adjustment.abs() >= HUNDRED {
        let share = adjustment / Decimal::from(slot_count as u64);
        let variation = zero_centred(slot_count, rng);
        let mut variations = variation.into_iter();

        for slot in open_additions.iter_mut() {
            let z = variations.next().unwrap_or(Decimal::ZERO);
            slot.amount = round_to_hundred(share * (Decimal::ONE + SLOT_VARIATION * z));
            adjustment -= slot.amount;
        }
        for slot in open_deductions.iter_mut() {
            let z = variations.next().unwrap_or(Decimal::ZERO);
            slot.amount = round_to_hundred(-share * (Decimal::ONE + SLOT_VARIATION * z));
            adjustment += slot.amount;
        }
    }

    if adjustment.abs() >= HUNDRED {
        debug!(%adjustment, "Target not fully reconciled");
    }
    adjustment
}
