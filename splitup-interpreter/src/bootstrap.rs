use splitup_domain::{EqualSplitRounding, MemberId};
use splitup_presentation::{CurrencyFormat, DEFAULT_CURRENCY_SYMBOL};
use std::{borrow::Cow, env};

pub type CliResult<T> = Result<T, Cow<'static, str>>;

/// Settings read from the environment and an optional `.env` file.
pub struct AppConfig {
    pub currency: CurrencyFormat,
    pub equal_split: EqualSplitRounding,
    pub viewer: Option<MemberId>,
}

impl AppConfig {
    pub fn from_env() -> CliResult<Self> {
        let _ = dotenvy::dotenv();

        let symbol = env::var("SPLITUP_CURRENCY_SYMBOL")
            .unwrap_or_else(|_| DEFAULT_CURRENCY_SYMBOL.to_owned());
        let equal_split = match env::var("SPLITUP_EQUAL_SPLIT") {
            Ok(value) => parse_equal_split(&value)?,
            Err(_) => EqualSplitRounding::default(),
        };
        let viewer = env::var("SPLITUP_VIEWER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(MemberId::from);

        Ok(Self {
            currency: CurrencyFormat::new(symbol),
            equal_split,
            viewer,
        })
    }
}

fn parse_equal_split(value: &str) -> CliResult<EqualSplitRounding> {
    match value.trim().to_ascii_lowercase().as_str() {
        "exact" => Ok(EqualSplitRounding::Exact),
        "cents" => Ok(EqualSplitRounding::DistributeRemainder { scale: 2 }),
        other => Err(format!("SPLITUP_EQUAL_SPLIT must be `exact` or `cents`, got `{other}`").into()),
    }
}

pub fn init_logging() {
    tracing_subscriber::fmt::init();
}
