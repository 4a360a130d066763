// Utility modules

use crate::{
    constants::{MICRO_STX_PER_STX, STX_DECIMALS},
    error::{AppError, Result},
};

/// Basic guard for list limits so a single request cannot fan out unbounded.
pub fn ensure_history_limit(limit: u32, configured_max: u32) -> Result<()> {
    if limit > configured_max.max(1) {
        return Err(AppError::BadRequest(format!(
            "limit must be at most {}",
            configured_max.max(1)
        )));
    }
    Ok(())
}

/// Renders micro-STX as `"<whole>.<frac> STX"`, rounding half-up at the last
/// shown digit. Integer arithmetic only.
pub fn format_stx(micro_stx: u128, decimals: u32) -> String {
    let decimals = decimals.min(STX_DECIMALS);
    let divisor = 10u128.pow(STX_DECIMALS - decimals);
    let mut scaled = micro_stx / divisor;
    if (micro_stx % divisor) * 2 >= divisor && divisor > 1 {
        scaled += 1;
    }

    if decimals == 0 {
        return format!("{} STX", scaled);
    }
    let unit = 10u128.pow(decimals);
    format!(
        "{}.{:0width$} STX",
        scaled / unit,
        scaled % unit,
        width = decimals as usize
    )
}

/// Parses a user-entered STX amount (`"1"`, `"0.5"`, `"12.000001"`) into micro-STX.
pub fn parse_stx_amount(input: &str) -> Result<u128> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::InvalidAmount("amount is required".to_string()));
    }
    if input.starts_with('-') {
        return Err(AppError::InvalidAmount("amount must be positive".to_string()));
    }

    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AppError::InvalidAmount(format!("not a number: {input}")));
    }
    if frac.len() > STX_DECIMALS as usize {
        return Err(AppError::InvalidAmount(format!(
            "at most {STX_DECIMALS} decimal places"
        )));
    }

    let too_large = || AppError::InvalidAmount(format!("amount too large: {input}"));
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| too_large())?
    };
    let frac: u128 = format!("{:0<width$}", frac, width = STX_DECIMALS as usize)
        .parse()
        .map_err(|_| too_large())?;

    let micro = whole
        .checked_mul(MICRO_STX_PER_STX)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(too_large)?;
    if micro == 0 {
        return Err(AppError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(micro)
}
