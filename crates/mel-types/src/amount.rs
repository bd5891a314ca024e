use crate::error::TypeError;

/// Ledger amounts are whole numbers of the native currency's smallest unit.
pub type Amount = u64;

/// Smallest units per display unit. 1 coin = 1e8 minimal units.
pub const UNIT: Amount = 100_000_000;

/// Render an amount as a decimal coin value, trimming trailing zeros.
pub fn format_coins(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return format!("{whole}");
    }
    let frac = format!("{frac:08}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Parse a decimal coin value ("2", "0.5", "1.25") into smallest units.
/// At most 8 fractional digits are accepted.
pub fn parse_coins(s: &str) -> Result<Amount, TypeError> {
    let bad = || TypeError::InvalidAmount(s.to_string());
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(bad());
    }
    if frac.len() > 8 {
        return Err(bad());
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| bad())?
    };
    let frac_units: Amount = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<8}").parse().map_err(|_| bad())?
    };

    whole
        .checked_mul(UNIT)
        .and_then(|units| units.checked_add(frac_units))
        .ok_or_else(bad)
}
