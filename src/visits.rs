use serde::Deserialize;
use std::time::Duration;

const COUNTER_BASE: &str = "https://api.counterapi.dev/v1/plumterm";
/// Slug used when neither flag nor settings override it.
pub const DEFAULT_SLUG: &str = "site";

#[derive(Debug, Deserialize)]
struct CounterResponse {
    count: u64,
}

/// Record one visit and return the new total. None on any failure.
pub fn bump(slug: &str) -> Option<u64> {
    let url = format!("{}/{}/up", COUNTER_BASE, urlencoding::encode(slug));
    call(ureq::post(&url))
}

/// Read the current total without incrementing.
pub fn peek(slug: &str) -> Option<u64> {
    let url = format!("{}/{}", COUNTER_BASE, urlencoding::encode(slug));
    call(ureq::get(&url))
}

fn call(request: ureq::Request) -> Option<u64> {
    let response = request.timeout(Duration::from_secs(5)).call().ok()?;
    let counter: CounterResponse = response.into_json().ok()?;
    Some(counter.count)
}

/// Footer text for a possibly-missing count: a dash stands in on failure.
pub fn display(count: Option<u64>) -> String {
    match count {
        Some(n) => group_digits(n),
        None => "-".to_string(),
    }
}

pub(crate) fn group_digits(n: u64) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_count_shows_a_dash() {
        assert_eq!(display(None), "-");
    }

    #[test]
    fn counts_are_digit_grouped() {
        assert_eq!(display(Some(0)), "0");
        assert_eq!(display(Some(999)), "999");
        assert_eq!(display(Some(1000)), "1,000");
        assert_eq!(display(Some(1234567)), "1,234,567");
    }
}
