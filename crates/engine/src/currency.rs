use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO 4217 currency code of an account.
///
/// Amounts are stored as an `i64` number of **minor units** (see `Money`).
/// Every supported currency uses two fraction digits, so `10.50 USD` is
/// stored as `1050`. The ledger never converts between currencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Chf,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        2
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "CHF" => Ok(Currency::Chf),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(Currency::try_from("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" EUR ").unwrap(), Currency::Eur);
        assert_eq!(Currency::try_from("chf").unwrap().code(), "CHF");
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(matches!(
            Currency::try_from("XYZ"),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(Currency::try_from("US").is_err());
    }
}
