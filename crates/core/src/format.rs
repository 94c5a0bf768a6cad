// Human-readable number formatting for reports.

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cents → `"$25,000.00"`.
pub fn money(cents: u64) -> String {
    format!("${}.{:02}", thousands(cents / 100), cents % 100)
}

/// Optional cents, `"n/a"` when absent.
pub fn money_opt(cents: Option<u64>) -> String {
    cents.map(money).unwrap_or_else(|| "n/a".to_string())
}

/// `"15,000 units"`.
pub fn units(n: u64) -> String {
    format!("{} units", thousands(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(15000), "15,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn money_formatting() {
        assert_eq!(money(2_500_000), "$25,000.00");
        assert_eq!(money(5), "$0.05");
        assert_eq!(money_opt(None), "n/a");
    }

    #[test]
    fn units_formatting() {
        assert_eq!(units(18000), "18,000 units");
    }
}
