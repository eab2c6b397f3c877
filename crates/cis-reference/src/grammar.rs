//! Grammar checks for the pieces of a reference.
//!
//! - Path components: lowercase alphanumeric runs joined by `.`, `_`, `__`,
//!   or one or more `-`
//! - Domains: dot-separated hostname labels with an optional numeric port
//! - Tags: a word character followed by up to 127 word characters, `.` or `-`

/// Maximum length of a repository name, domain included.
pub const NAME_MAX_LEN: usize = 255;

/// Maximum length of a tag.
pub const TAG_MAX_LEN: usize = 128;

/// The hostname that is treated as a domain without a dot or port.
const LOCALHOST: &str = "localhost";

fn is_lower_alnum(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns `true` if `component` is a valid path component.
pub fn is_path_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    if bytes.is_empty() || !is_lower_alnum(bytes[0]) || !is_lower_alnum(bytes[bytes.len() - 1]) {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        if is_lower_alnum(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !is_lower_alnum(bytes[i]) {
            i += 1;
        }
        let separator = &component[start..i];
        let dashes = separator.bytes().all(|b| b == b'-');
        if !(separator == "." || separator == "_" || separator == "__" || dashes) {
            return false;
        }
    }
    true
}

fn is_domain_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    !bytes.is_empty()
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}

/// Returns `true` if `domain` is a valid `host[:port]`.
pub fn is_domain(domain: &str) -> bool {
    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    !host.is_empty() && host.split('.').all(is_domain_label)
}

/// Returns `true` if the first component of a multi-component name should be
/// read as a domain rather than as part of the repository path.
pub fn looks_like_domain(first: &str) -> bool {
    first.contains('.')
        || first.contains(':')
        || first == LOCALHOST
        || first.bytes().any(|b| b.is_ascii_uppercase())
}

/// Returns `true` if `tag` is a valid tag.
pub fn is_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= TAG_MAX_LEN
        && is_word(bytes[0])
        && bytes[1..].iter().all(|b| is_word(*b) || *b == b'.' || *b == b'-')
}
