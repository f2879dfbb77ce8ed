use splitup_domain::Money;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Renders amounts as `{symbol}{amount}` with two decimals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn format(&self, amount: Money) -> String {
        let rounded = amount.round_dp(2);
        let sign = if rounded.is_negative() { "-" } else { "" };
        format!("{sign}{}{:.2}", self.symbol, rounded.abs().as_decimal())
    }

    /// Like [`format`](Self::format), with `+` on non-negative amounts.
    pub fn format_signed(&self, amount: Money) -> String {
        if amount.round_dp(2).is_negative() {
            self.format(amount)
        } else {
            format!("+{}", self.format(amount))
        }
    }
}
