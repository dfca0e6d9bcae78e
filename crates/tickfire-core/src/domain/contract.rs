use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Security type codes understood by the gateway (`secType` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SecurityType {
    Stock,
    Option,
    Future,
    Forex,
    Index,
    Cfd,
    Bond,
    Fund,
    Crypto,
}

impl SecurityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "STK",
            Self::Option => "OPT",
            Self::Future => "FUT",
            Self::Forex => "CASH",
            Self::Index => "IND",
            Self::Cfd => "CFD",
            Self::Bond => "BOND",
            Self::Fund => "FUND",
            Self::Crypto => "CRYPTO",
        }
    }
}

impl Display for SecurityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STK" => Ok(Self::Stock),
            "OPT" => Ok(Self::Option),
            "FUT" => Ok(Self::Future),
            "CASH" => Ok(Self::Forex),
            "IND" => Ok(Self::Index),
            "CFD" => Ok(Self::Cfd),
            "BOND" => Ok(Self::Bond),
            "FUND" => Ok(Self::Fund),
            "CRYPTO" => Ok(Self::Crypto),
            _ => Err(ValidationError::UnknownSecurityType {
                value: value.to_owned(),
            }),
        }
    }
}

impl From<SecurityType> for String {
    fn from(value: SecurityType) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for SecurityType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Routing destination such as `SMART`, `NASDAQ`, or `ARCA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exchange(String);

impl Exchange {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '.');
        if !valid {
            return Err(ValidationError::InvalidExchange {
                value: input.to_owned(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn smart() -> Self {
        Self(String::from("SMART"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-letter ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());
        if !valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn usd() -> Self {
        Self(String::from("USD"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instrument description sent alongside every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub symbol: Symbol,
    pub security_type: SecurityType,
    pub exchange: Exchange,
    pub currency: Currency,
}

/// Assemble a contract. All fields are already validated by their types.
pub fn build_contract(
    symbol: Symbol,
    security_type: SecurityType,
    exchange: Exchange,
    currency: Currency,
) -> Contract {
    Contract {
        symbol,
        security_type,
        exchange,
        currency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_security_type_codes_case_insensitively() {
        assert_eq!("stk".parse::<SecurityType>(), Ok(SecurityType::Stock));
        assert_eq!("CASH".parse::<SecurityType>(), Ok(SecurityType::Forex));
        assert!(matches!(
            "equity".parse::<SecurityType>(),
            Err(ValidationError::UnknownSecurityType { .. })
        ));
    }

    #[test]
    fn validates_currency_and_exchange() {
        assert_eq!(Currency::parse("usd").expect("valid").as_str(), "USD");
        assert!(Currency::parse("USDT").is_err());
        assert_eq!(Exchange::parse(" smart ").expect("valid").as_str(), "SMART");
        assert!(Exchange::parse("").is_err());
    }

    #[test]
    fn builds_stock_contract() {
        let contract = build_contract(
            Symbol::parse("aapl").expect("valid"),
            SecurityType::Stock,
            Exchange::smart(),
            Currency::usd(),
        );
        assert_eq!(contract.symbol.as_str(), "AAPL");
        assert_eq!(contract.security_type.as_str(), "STK");
        assert_eq!(contract.exchange.as_str(), "SMART");
        assert_eq!(contract.currency.as_str(), "USD");
    }
}
