//! Store-wide currency handling: a static rate table plus the pure
//! convert/format helpers every price display goes through.
//!
//! Rates are expressed as KES per unit, so every pair between supported
//! codes is derivable and the table has no holes. Unknown codes are a
//! hard error rather than a silent rate of 1.

pub const SUPPORTED: [&str; 3] = ["KES", "USD", "EUR"];

fn kes_per_unit(code: &str) -> Result<f64, String> {
    match code {
        "KES" => Ok(1.0),
        "USD" => Ok(129.0),
        "EUR" => Ok(139.85),
        other => Err(format!("unsupported currency: {other}")),
    }
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED.contains(&code)
}

pub fn symbol(code: &str) -> Result<&'static str, String> {
    match code {
        "KES" => Ok("KSh "),
        "USD" => Ok("$"),
        "EUR" => Ok("€"),
        other => Err(format!("unsupported currency: {other}")),
    }
}

/// Decimal digits shown per currency. KES prices are whole shillings.
pub fn decimals(code: &str) -> Result<usize, String> {
    match code {
        "KES" => Ok(0),
        "USD" | "EUR" => Ok(2),
        other => Err(format!("unsupported currency: {other}")),
    }
}

pub fn convert(amount: f64, from: &str, to: &str) -> Result<f64, String> {
    if from == to {
        return Ok(amount);
    }
    Ok(amount * kes_per_unit(from)? / kes_per_unit(to)?)
}

/// Converts `amount` from its recorded currency into the active one and
/// renders it with symbol, thousands grouping and the currency's decimals.
pub fn format(amount: f64, from: &str, active: &str) -> Result<String, String> {
    let converted = convert(amount, from, active)?;
    let digits = decimals(active)?;
    let sym = symbol(active)?;

    let sign = if converted < 0.0 { "-" } else { "" };
    let fixed = format!("{:.*}", digits, converted.abs());

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let grouped = group_thousands(int_part);

    Ok(match frac_part {
        Some(f) => format!("{sign}{sym}{grouped}.{f}"),
        None => format!("{sign}{sym}{grouped}"),
    })
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Active display currency: the user's cookie choice if valid, else the
/// configured default, else KES.
pub fn resolve_active(cookie: Option<&str>, default_currency: &str) -> String {
    if let Some(c) = cookie {
        if is_supported(c) {
            return c.to_string();
        }
    }
    if is_supported(default_currency) {
        return default_currency.to_string();
    }
    "KES".to_string()
}
