//! Base-zone derivation
//!
//! A record such as `host.sub.example.com` lives in the zone `example.com`.
//! The zone is taken to be the last two labels of the name. This is wrong
//! for multi-label public suffixes: `www.example.co.uk` maps to `co.uk`,
//! which no account will contain, so the zone lookup for such names fails.

/// Return the last two dot-separated labels of `domain`
///
/// The input is used as-is: no case folding, no trailing-dot stripping and
/// no IDNA encoding. Returns `None` when `domain` has a single label.
///
/// ```
/// assert_eq!(dnsync_core::base_zone("asdf.test.jonaz.net"), Some("jonaz.net"));
/// assert_eq!(dnsync_core::base_zone("localhost"), None);
/// ```
pub fn base_zone(domain: &str) -> Option<&str> {
    let last_dot = domain.rfind('.')?;
    match domain[..last_dot].rfind('.') {
        Some(start) => Some(&domain[start + 1..]),
        None => Some(domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_two_labels() {
        assert_eq!(base_zone("asdf.test.jonaz.net"), Some("jonaz.net"));
        assert_eq!(base_zone("host.sub.example.com"), Some("example.com"));
        assert_eq!(base_zone("a.example.com"), Some("example.com"));
    }

    #[test]
    fn two_label_name_is_its_own_zone() {
        assert_eq!(base_zone("example.com"), Some("example.com"));
    }

    #[test]
    fn single_label_has_no_zone() {
        assert_eq!(base_zone("localhost"), None);
        assert_eq!(base_zone(""), None);
    }

    #[test]
    fn public_suffixes_are_not_special_cased() {
        assert_eq!(base_zone("www.example.co.uk"), Some("co.uk"));
    }

    #[test]
    fn input_is_not_normalized() {
        assert_eq!(base_zone("Host.Example.COM"), Some("Example.COM"));
        assert_eq!(base_zone("host.example.com."), Some("com."));
    }
}
