//! Query-string access for dashboard routes.

/// Decode `application/x-www-form-urlencoded` text: `+` is a space and
/// `%XX` an escaped byte. Malformed escapes are kept literally.
fn decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h << 4 | l);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// First value of `key` in the URL's query string, decoded. Empty values
/// count as missing.
pub fn param(url: &str, key: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (decode(k) == key)
            .then(|| decode(v))
            .filter(|v| !v.is_empty())
    })
}

/// `param` parsed into `T`; unparsable values count as missing.
pub fn parsed<T: std::str::FromStr>(url: &str, key: &str) -> Option<T> {
    param(url, key)?.trim().parse().ok()
}

/// Checkbox-style flag: `1`, `true`, `yes` or `on`.
pub fn flag(url: &str, key: &str) -> bool {
    param(url, key).is_some_and(|v| {
        matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_decodes_values() {
        let url = "/api/detail?brand=Mercedes-Benz&model=EQS%20450%2B&year=2022";
        assert_eq!(param(url, "brand").as_deref(), Some("Mercedes-Benz"));
        assert_eq!(param(url, "model").as_deref(), Some("EQS 450+"));
        assert_eq!(parsed::<i32>(url, "year"), Some(2022));
        assert_eq!(param("/x?model=Model+3", "model").as_deref(), Some("Model 3"));
    }

    #[test]
    fn missing_and_empty_params() {
        assert_eq!(param("/api/grid", "country"), None);
        assert_eq!(param("/api/grid?country=", "country"), None);
        assert_eq!(param("/api/grid?forecast", "country"), None);
        assert_eq!(parsed::<i32>("/api/grid?year=abc", "year"), None);
    }

    #[test]
    fn malformed_escape_is_literal() {
        assert_eq!(param("/x?q=100%", "q").as_deref(), Some("100%"));
        assert_eq!(param("/x?q=%zz", "q").as_deref(), Some("%zz"));
    }

    #[test]
    fn flags() {
        assert!(flag("/api/grid?forecast=1", "forecast"));
        assert!(flag("/api/grid?forecast=true", "forecast"));
        assert!(!flag("/api/grid?forecast=0", "forecast"));
        assert!(!flag("/api/grid", "forecast"));
    }
}
