use crate::{
    error::SplitError,
    model::{Expense, MemberId, Money, SplitPolicy},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Accepted drift between declared shares and the total they must cover.
pub const SHARE_TOLERANCE: Money = Money::from_decimal(Decimal::from_parts(1, 0, 0, false, 2));

/// How an equal split treats amounts that do not divide evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EqualSplitRounding {
    /// `amount / n` at full decimal precision. Shares may differ from the
    /// total by a sub-cent residue.
    #[default]
    Exact,
    /// Shares truncated to `scale` places; leftover atomic units go one each
    /// to the first participants in member-id order, so shares sum to the
    /// amount exactly.
    DistributeRemainder { scale: u32 },
}

/// Per-participant share computation for a single expense.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitCalculator {
    rounding: EqualSplitRounding,
}

impl SplitCalculator {
    pub fn new(rounding: EqualSplitRounding) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> EqualSplitRounding {
        self.rounding
    }

    /// Share owed by `member` for `expense`; zero when the member is not a
    /// participant.
    ///
    /// Shares are not checked against the total here. Use
    /// [`SplitCalculator::validate_shares`] before persisting an expense.
    pub fn share_for(&self, expense: &Expense, member: &MemberId) -> Result<Money, SplitError> {
        if expense.split_among.is_empty() {
            return Err(SplitError::EmptySplitSet {
                expense_id: expense.id.clone(),
            });
        }
        let Some(position) = expense.split_among.iter().position(|m| m == member) else {
            return Ok(Money::ZERO);
        };

        let share = match expense.split_policy {
            SplitPolicy::Equal => {
                self.equal_shares(expense.amount, expense.split_among.len())[position]
            }
            SplitPolicy::Exact => exact_share(expense, member),
            SplitPolicy::Percentage => percentage_share(expense, member)?,
        };
        Ok(share)
    }

    /// Every participant's share, in member-id order.
    pub fn shares(&self, expense: &Expense) -> Result<Vec<(MemberId, Money)>, SplitError> {
        if expense.split_among.is_empty() {
            return Err(SplitError::EmptySplitSet {
                expense_id: expense.id.clone(),
            });
        }

        let shares: Vec<(MemberId, Money)> = match expense.split_policy {
            SplitPolicy::Equal => expense
                .split_among
                .iter()
                .cloned()
                .zip(self.equal_shares(expense.amount, expense.split_among.len()))
                .collect(),
            SplitPolicy::Exact => expense
                .split_among
                .iter()
                .map(|member| (member.clone(), exact_share(expense, member)))
                .collect(),
            SplitPolicy::Percentage => expense
                .split_among
                .iter()
                .map(|member| Ok((member.clone(), percentage_share(expense, member)?)))
                .collect::<Result<_, SplitError>>()?,
        };
        Ok(shares)
    }

    /// Checks that an expense can be persisted: positive amount, at least one
    /// participant, and explicit shares covering the total within
    /// [`SHARE_TOLERANCE`].
    pub fn validate_shares(&self, expense: &Expense) -> Result<(), SplitError> {
        if !expense.amount.is_positive() {
            return Err(SplitError::InvalidAmount {
                expense_id: expense.id.clone(),
                amount: expense.amount,
            });
        }
        if expense.split_among.is_empty() {
            return Err(SplitError::EmptySplitSet {
                expense_id: expense.id.clone(),
            });
        }

        let expected = match expense.split_policy {
            SplitPolicy::Equal => return Ok(()),
            SplitPolicy::Exact => expense.amount,
            SplitPolicy::Percentage => Money::from_decimal(Decimal::ONE_HUNDRED),
        };
        let actual = Money::checked_sum(
            expense
                .split_among
                .iter()
                .map(|member| declared_share(expense, member)),
        )
        .ok_or_else(|| SplitError::AmountOverflow {
            expense_id: expense.id.clone(),
        })?;

        if (actual - expected).is_within(SHARE_TOLERANCE) {
            Ok(())
        } else {
            Err(SplitError::ShareMismatch {
                expense_id: expense.id.clone(),
                policy: expense.split_policy,
                expected,
                actual,
            })
        }
    }

    fn equal_shares(&self, amount: Money, count: usize) -> Vec<Money> {
        let total = amount.as_decimal();
        let divisor = Decimal::from(count);

        match self.rounding {
            EqualSplitRounding::Exact => vec![Money::from_decimal(total / divisor); count],
            EqualSplitRounding::DistributeRemainder { scale } => {
                let unit = Decimal::new(1, scale);
                let base = (total / divisor).round_dp_with_strategy(scale, RoundingStrategy::ToZero);
                let remainder = total - base * divisor;
                let step = if remainder.is_sign_negative() {
                    -unit
                } else {
                    unit
                };
                let extra_units = (remainder / unit).trunc().abs().to_usize().unwrap_or(0);
                // Sub-unit residue when the amount itself has more places than `scale`.
                let residue = remainder - step * Decimal::from(extra_units);

                (0..count)
                    .map(|idx| {
                        let mut share = base;
                        if idx < extra_units {
                            share += step;
                        }
                        if idx == 0 {
                            share += residue;
                        }
                        Money::from_decimal(share)
                    })
                    .collect()
            }
        }
    }
}

fn declared_share(expense: &Expense, member: &MemberId) -> Money {
    expense
        .split_shares
        .get(member)
        .copied()
        .map(Money::from_decimal)
        .unwrap_or(Money::ZERO)
}

fn exact_share(expense: &Expense, member: &MemberId) -> Money {
    declared_share(expense, member)
}

fn percentage_share(expense: &Expense, member: &MemberId) -> Result<Money, SplitError> {
    let percent = declared_share(expense, member).as_decimal();
    expense
        .amount
        .checked_mul(percent)
        .map(|scaled| Money::from_decimal(scaled.as_decimal() / Decimal::ONE_HUNDRED))
        .ok_or_else(|| SplitError::AmountOverflow {
            expense_id: expense.id.clone(),
        })
}
