//! Display helpers shared by every UI surface.

use crate::entities::Money;

/// Render a price, e.g. `$1,234.50`, `¥1,500`, `CHF 12.00`.
pub fn format_price(money: &Money) -> String {
    let digits = money.currency.minor_unit_digits();
    let scale = 10u64.pow(digits);
    let major = group_thousands(money.amount_minor / scale);
    let number = if digits == 0 {
        major
    } else {
        format!(
            "{}.{:0width$}",
            major,
            money.amount_minor % scale,
            width = digits as usize
        )
    };

    match currency_symbol(money.currency.as_str()) {
        Some(symbol) => format!("{}{}", symbol, number),
        None => format!("{} {}", money.currency, number),
    }
}

/// Shorten a wallet address to `first6...last4`.
///
/// Addresses of 10 characters or fewer are returned unchanged.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CurrencyCode;

    fn money(amount: u64, code: &str) -> Money {
        Money::new(amount, CurrencyCode::new(code).unwrap())
    }

    #[test]
    fn test_format_price_usd() {
        assert_eq!(format_price(&money(123_450, "USD")), "$1,234.50");
        assert_eq!(format_price(&money(5, "USD")), "$0.05");
        assert_eq!(format_price(&money(100_000_000, "USD")), "$1,000,000.00");
    }

    #[test]
    fn test_format_price_zero_decimal_currency() {
        assert_eq!(format_price(&money(1_500, "JPY")), "¥1,500");
    }

    #[test]
    fn test_format_price_unknown_currency_uses_code() {
        assert_eq!(format_price(&money(1_200, "CHF")), "CHF 12.00");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(truncate_address("0x12345678"), "0x12345678");
        assert_eq!(truncate_address(""), "");
    }
}
