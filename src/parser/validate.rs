use once_cell::sync::Lazy;
use regex::Regex;

// RFC 1034 section 3.1: at most 63 characters (octets in the RFC) per label.
const MAX_LABEL_LEN: usize = 63;

static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}0-9-]+$").expect("valid domain label regex"));

/// Whether `address` looks like something we can actually send mail to.
///
/// This is stricter than RFC 5322 in some places: the domain needs at least two labels, so
/// `martin@localhost` and ip literals are rejected. The local part may contain anything except
/// whitespace, `<`, `>`, `@` and `;`.
pub fn is_valid(address: &str) -> bool {
    let (local, domain) = match address.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    if local.is_empty() || local.chars().any(is_excluded_from_local) {
        return false;
    }

    let mut labels = 0;

    for label in domain.split('.') {
        if label.chars().count() > MAX_LABEL_LEN || !LABEL.is_match(label) {
            return false;
        }

        labels += 1;
    }

    labels >= 2
}

fn is_excluded_from_local(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '\x0C' | '\r' | '<' | '>' | '@' | ';'
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn valid() {
        let addresses = [
            "a@b.c",
            "martin@example.com",
            "dot.in.local.part@example.com",
            "tagged+tag@example.com",
            "dashed-dash@ex-ample.com",
            "example@example.verylongtld",
            "MAILER-DAEMON@example.org",
            "f€@Ü.русские",
            "mailto:nichole@harrisgroup.com",
        ];

        for address in addresses {
            assert!(is_valid(address), "{} should be valid", address);
        }
    }

    #[test]
    fn invalid() {
        let long_label = format!("a@{}.com", "x".repeat(64));

        let addresses = [
            "",
            "@",
            "no.at.example.com",
            "@example.com",
            "example@localhost",
            "admin@mailserver1",
            "multiple@at@signs@example.com",
            "john.doe@example..com",
            "martimbault@.qc.aira.com",
            "roby.bell@comcast.netVortex666!!",
            "noreply@http://www.acadiapinesmotel.com",
            "MM522@aol.com315=269-5244",
            "user@[IPv6:2001:DB8::1]",
            "semi;colon@example.com",
            "white space@example.com",
            "noij",
            long_label.as_str(),
        ];

        for address in addresses {
            assert!(!is_valid(address), "{} should be invalid", address);
        }
    }

    #[test]
    fn label_length() {
        let address = format!("a@{}.com", "x".repeat(MAX_LABEL_LEN));

        assert!(is_valid(&address));
    }
}
