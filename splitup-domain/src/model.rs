use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use crate::error::SplitError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Store-generated user id.
    MemberId
);
string_id!(GroupId);
string_id!(ExpenseId);
string_id!(SettlementId);

/// Net signed amount per member. Positive: the group owes this member.
pub type MemberBalances = BTreeMap<MemberId, Money>;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub const fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn signum(self) -> i64 {
        if self.is_positive() {
            1
        } else if self.is_negative() {
            -1
        } else {
            0
        }
    }

    /// Rounds half away from zero to `scale` decimal places.
    pub fn round_dp(self, scale: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(self, factor: Decimal) -> Option<Money> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        Self(self.0.saturating_sub(other.0))
    }

    /// `None` when an intermediate sum leaves the representable range.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// True when `|self| <= tolerance`.
    pub fn is_within(self, tolerance: Money) -> bool {
        self.abs() <= tolerance
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Stand-in for an id that has no loaded member record.
    pub fn unnamed(id: MemberId) -> Self {
        let display_name = id.to_string();
        Self { id, display_name }
    }
}

/// How an expense amount is divided among its participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum SplitPolicy {
    #[default]
    Equal,
    /// Per-member amounts; written as `UNEQUAL` by older clients.
    Exact,
    /// Per-member percentages of the amount.
    Percentage,
}

impl SplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitPolicy::Equal => "EQUAL",
            SplitPolicy::Exact => "EXACT",
            SplitPolicy::Percentage => "PERCENTAGE",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPolicy {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(SplitPolicy::Equal),
            "EXACT" | "UNEQUAL" => Ok(SplitPolicy::Exact),
            "PERCENTAGE" => Ok(SplitPolicy::Percentage),
            _ => Err(SplitError::UnknownPolicy(s.to_owned())),
        }
    }
}

impl TryFrom<String> for SplitPolicy {
    type Error = SplitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    pub paid_by: MemberId,
    #[serde(default)]
    pub split_among: BTreeSet<MemberId>,
    #[serde(rename = "splitType", default)]
    pub split_policy: SplitPolicy,
    /// Amounts for `Exact`, percentages for `Percentage`, unused for `Equal`.
    #[serde(rename = "splitDetails", default)]
    pub split_shares: BTreeMap<MemberId, Decimal>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub is_settled: bool,
}

impl Expense {
    /// Equal split with no explicit shares.
    pub fn equal<I, M>(
        id: impl Into<ExpenseId>,
        group_id: impl Into<GroupId>,
        amount: Money,
        paid_by: impl Into<MemberId>,
        split_among: I,
    ) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            description: String::new(),
            amount,
            paid_by: paid_by.into(),
            split_among: split_among.into_iter().map(Into::into).collect(),
            split_policy: SplitPolicy::Equal,
            split_shares: BTreeMap::new(),
            created_at: Timestamp::default(),
            is_settled: false,
        }
    }

    /// Split by explicit per-member values; participants are the share keys.
    pub fn with_shares<I, M>(
        id: impl Into<ExpenseId>,
        group_id: impl Into<GroupId>,
        amount: Money,
        paid_by: impl Into<MemberId>,
        policy: SplitPolicy,
        shares: I,
    ) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        let split_shares: BTreeMap<MemberId, Decimal> = shares
            .into_iter()
            .map(|(member, share)| (member.into(), share))
            .collect();
        Self {
            id: id.into(),
            group_id: group_id.into(),
            description: String::new(),
            amount,
            paid_by: paid_by.into(),
            split_among: split_shares.keys().cloned().collect(),
            split_policy: policy,
            split_shares,
            created_at: Timestamp::default(),
            is_settled: false,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn created_at(mut self, at: Timestamp) -> Self {
        self.created_at = at;
        self
    }

    pub fn settled(mut self) -> Self {
        self.is_settled = true;
        self
    }

    pub fn involves(&self, member: &MemberId) -> bool {
        &self.paid_by == member || self.split_among.contains(member)
    }
}

/// A completed payment between two members. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub id: SettlementId,
    pub group_id: GroupId,
    pub from_user_id: MemberId,
    pub to_user_id: MemberId,
    pub amount: Money,
    #[serde(default)]
    pub settled_at: Timestamp,
    #[serde(default)]
    pub expense_ids: BTreeSet<ExpenseId>,
}

impl SettlementRecord {
    pub fn new(
        id: impl Into<SettlementId>,
        group_id: impl Into<GroupId>,
        from: impl Into<MemberId>,
        to: impl Into<MemberId>,
        amount: Money,
    ) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            from_user_id: from.into(),
            to_user_id: to.into(),
            amount,
            settled_at: Timestamp::default(),
            expense_ids: BTreeSet::new(),
        }
    }

    pub fn settled_at(mut self, at: Timestamp) -> Self {
        self.settled_at = at;
        self
    }
}

/// Settlement awaiting an id from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDraft {
    pub group_id: GroupId,
    pub from_user_id: MemberId,
    pub to_user_id: MemberId,
    pub amount: Money,
    pub settled_at: Timestamp,
    pub expense_ids: BTreeSet<ExpenseId>,
}

impl SettlementDraft {
    pub fn into_record(self, id: SettlementId) -> SettlementRecord {
        SettlementRecord {
            id,
            group_id: self.group_id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            amount: self.amount,
            settled_at: self.settled_at,
            expense_ids: self.expense_ids,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub invite_code: String,
    #[serde(default)]
    pub created_by: Option<MemberId>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub member_ids: Vec<MemberId>,
    #[serde(default)]
    pub expense_ids: Vec<ExpenseId>,
    #[serde(default)]
    pub settlement_ids: Vec<SettlementId>,
}

/// One member's balance split into what they are owed and what they owe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberPosition {
    pub owed: Money,
    pub owes: Money,
}

impl MemberPosition {
    pub fn from_balance(balance: Money) -> Self {
        if balance.is_positive() {
            Self {
                owed: balance,
                owes: Money::ZERO,
            }
        } else {
            Self {
                owed: Money::ZERO,
                owes: -balance,
            }
        }
    }

    pub fn net(self) -> Money {
        self.owed - self.owes
    }
}
