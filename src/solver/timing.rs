use super::Times;

/// Reads the `time -p` side channel: `real`, `user` and `sys` lines holding
/// seconds, converted to whole milliseconds. Unparseable lines are skipped.
pub fn parse_times(text: &str) -> Times {
    let mut times = Times::default();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(label), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let slot = match label {
            "real" => &mut times.real_ms,
            "user" => &mut times.user_ms,
            "sys" => &mut times.sys_ms,
            _ => continue,
        };
        if let Some(ms) = seconds_to_ms(value) {
            *slot = Some(ms);
        }
    }
    times
}

fn seconds_to_ms(value: &str) -> Option<u64> {
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let secs = if whole.is_empty() { 0 } else { whole.parse::<u64>().ok()? };
    // first three fraction digits, truncated
    let mut ms = 0u64;
    let mut scale = 100u64;
    for c in frac.chars().take(3) {
        ms += u64::from(c.to_digit(10)?) * scale;
        scale /= 10;
    }
    secs.checked_mul(1000)?.checked_add(ms)
}
