/// Lowercases `text` and splits it on anything that is not alphanumeric.
///
/// `_` and `-` are separators too, so `purchase_order`, `purchase-order` and
/// `Purchase Order` all produce the tokens `purchase`, `order`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Normalized lookup key for a surface form: its tokens joined by single spaces.
pub fn normalize(surface: &str) -> String {
    tokenize(surface).join(" ")
}

pub(crate) fn is_numeric(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}
