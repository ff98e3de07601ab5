/// Group digits with `.` the way the id-ID locale prints currency
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    grouped
}

/// `Rp 15.000`
pub fn format_rupiah(amount: i64) -> String {
    format!("Rp {}", group_thousands(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(500), "500");
        assert_eq!(group_thousands(8000), "8.000");
        assert_eq!(group_thousands(125000), "125.000");
        assert_eq!(group_thousands(1234567), "1.234.567");
        assert_eq!(group_thousands(-20000), "-20.000");
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(15000), "Rp 15.000");
    }
}
