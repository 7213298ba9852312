//! Input sanitizers shared by the search parameters, the meta field table and the
//! settings schema.

/// Leading integer of `value`, made non-negative. Non-numeric input yields 0.
///
/// Mirrors the usual CMS `absint` helper: `"4.9"` is 4, `"-3"` is 3, `"12abc"` is 12.
/// Values beyond `i64::MAX` saturate so the result always fits a storage id.
pub fn absint(value: &str) -> u64 {
    let s = value.trim_start();
    let s = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .unwrap_or(u64::MAX)
        .min(i64::MAX as u64)
}

/// Whether `value` is a plain decimal number, optionally signed and with an exponent.
/// Surrounding whitespace is allowed; `inf`, `nan` and hex forms are not.
pub fn is_numeric(value: &str) -> bool {
    let s = value.trim_matches(|c: char| c.is_ascii_whitespace());
    let s = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);

    let (mantissa, exponent) = match s.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&s[..at], Some(&s[at + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(|c| c == '+' || c == '-').unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

/// Parses `value` as a number when [`is_numeric`] accepts it.
pub fn to_number(value: &str) -> Option<f64> {
    if !is_numeric(value) {
        return None;
    }
    value
        .trim_matches(|c: char| c.is_ascii_whitespace())
        .parse::<f64>()
        .ok()
}

/// Cleans a single-line text field: strips markup, collapses whitespace, removes
/// percent-encoded octets and trims.
pub fn sanitize_text_field(value: &str) -> String {
    let stripped = strip_tags(value);
    let collapsed = collapse_whitespace(&stripped);
    let without_octets = remove_octets(&collapsed);
    collapse_whitespace(&without_octets).trim().to_string()
}

fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(at) = rest.find('<') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let starts_tag = after
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
            .unwrap_or(false);

        if !starts_tag {
            out.push_str("&lt;");
            rest = after;
            continue;
        }

        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let tag_end = match after.find('>') {
            Some(end) => end + 1,
            None => return out,
        };
        rest = &after[tag_end..];

        // script and style bodies are dropped along with their tags
        if name == "script" || name == "style" {
            let closing = format!("</{name}");
            match rest.to_ascii_lowercase().find(&closing) {
                Some(close_at) => {
                    let tail = &rest[close_at..];
                    rest = tail.find('>').map(|end| &tail[end + 1..]).unwrap_or("");
                }
                None => rest = "",
            }
        }
    }

    out.push_str(rest);
    out
}

fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars() {
        if matches!(c, ' ' | '\t' | '\r' | '\n') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn remove_octets(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let bytes = current.as_bytes();
        let found = (0..bytes.len().saturating_sub(2)).find(|&i| {
            bytes[i] == b'%' && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit()
        });
        match found {
            Some(i) => current.replace_range(i..i + 3, ""),
            None => return current,
        }
    }
}
