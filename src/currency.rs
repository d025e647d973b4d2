use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display currencies. Amounts are held in BRL and converted only when shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// Fixed demo rate from the BRL base. Not a market quote.
    pub fn rate(&self) -> f64 {
        match self {
            Currency::Brl => 1.0,
            Currency::Usd => 0.20,
            Currency::Eur => 0.18,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(AppError::UnknownCurrency(s.to_string())),
        }
    }
}

pub fn convert(value: f64, currency: Currency) -> f64 {
    value * currency.rate()
}

/// `"R$ 1.234,50"` style rendering of a base-currency amount.
pub fn format_money(value: f64, currency: Currency) -> String {
    format!("{} {}", currency.symbol(), format_pt_br(convert(value, currency)))
}

/// pt-BR digits: `.` groups thousands, `,` separates two or three decimals.
fn format_pt_br(value: f64) -> String {
    let thousandths = (value.abs() * 1000.0).round() as u64;
    let negative = value < 0.0 && thousandths > 0;

    let integer = (thousandths / 1000).to_string();
    let mut fraction = format!("{:03}", thousandths % 1000);
    if fraction.ends_with('0') {
        fraction.pop();
    }

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}{},{}", if negative { "-" } else { "" }, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_brl() {
        assert_eq!(format_money(4000.0, Currency::Brl), "R$ 4.000,00");
        assert_eq!(format_money(1234567.5, Currency::Brl), "R$ 1.234.567,50");
        assert_eq!(format_money(0.0, Currency::Brl), "R$ 0,00");
    }

    #[test]
    fn test_format_money_converts_before_formatting() {
        assert_eq!(format_money(4000.0, Currency::Usd), "$ 800,00");
        assert_eq!(format_money(10000.0, Currency::Eur), "€ 1.800,00");
    }

    #[test]
    fn test_format_keeps_third_decimal_when_significant() {
        assert_eq!(format_pt_br(12.345), "12,345");
        assert_eq!(format_pt_br(-999.5), "-999,50");
        assert_eq!(format_pt_br(-0.0001), "0,00");
    }

    #[test]
    fn test_currency_parse_and_serde() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(matches!("GBP".parse::<Currency>(), Err(AppError::UnknownCurrency(_))));
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
    }
}
