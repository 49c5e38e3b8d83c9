use chrono::Utc;

/// Generate a timestamp string in YYYYMMDD_HHMMSS_mmm format
pub fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// Generate a filename for a capture of `route`
pub fn generate_filename(prefix: &str, route: &str, timestamp: &str) -> String {
    format!("{}_{}_{}.png", prefix, route_slug(route), timestamp)
}

/// Turn a route into something usable inside a filename
pub fn route_slug(route: &str) -> String {
    let slug = sanitize_name(route.trim_matches('/'));
    if slug.is_empty() { "root".to_string() } else { slug }
}

/// Sanitize a name for use in filenames
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("hello world"), "hello_world");
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_name("q?x=1"), "q_x_1");
    }

    #[test]
    fn test_route_slug() {
        assert_eq!(route_slug("/"), "root");
        assert_eq!(route_slug("/datasets/list"), "datasets_list");
    }

    #[test]
    fn test_generate_filename() {
        let name = generate_filename("browser", "/quality/rules", "20240101_000000_000");
        assert_eq!(name, "browser_quality_rules_20240101_000000_000.png");
    }
}
