use validator::ValidateEmail;

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const PLUS_TAG_DOMAINS: &[&str] = &[
    "outlook.com",
    "hotmail.com",
    "live.com",
    "icloud.com",
    "me.com",
    "mac.com",
];
const DASH_TAG_DOMAINS: &[&str] = &["yahoo.com", "ymail.com", "rocketmail.com"];

/// Syntactic mailbox check.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim().to_lowercase();
    !email.is_empty() && email.validate_email()
}

/// Canonical form of an address: lowercase, with provider sub-addressing
/// folded away so `John.Doe+news@GMail.com` and `johndoe@gmail.com` compare
/// equal.
///
/// Input that does not split into `local@domain` is only trimmed and
/// lowercased.
pub fn normalize_email(email: &str) -> String {
    let lowered = email.trim().to_lowercase();
    let Some((local, domain)) = lowered.rsplit_once('@') else {
        return lowered;
    };

    let (local, domain) = if GMAIL_DOMAINS.contains(&domain) {
        let local = strip_tag(local, '+').replace('.', "");
        (local, "gmail.com")
    } else if PLUS_TAG_DOMAINS.contains(&domain) {
        (strip_tag(local, '+').to_string(), domain)
    } else if DASH_TAG_DOMAINS.contains(&domain) {
        (strip_tag(local, '-').to_string(), domain)
    } else {
        (local.to_string(), domain)
    };

    if local.is_empty() {
        return lowered;
    }

    format!("{local}@{domain}")
}

fn strip_tag(local: &str, separator: char) -> &str {
    match local.split_once(separator) {
        Some((base, _)) => base,
        None => local,
    }
}
