//! Display helpers.

/// Initials shown on the header's user button.
///
/// ```
/// use viafitness_core::initials;
///
/// assert_eq!(initials("maria clara souza"), "MS");
/// assert_eq!(initials("ana"), "AA");
/// assert_eq!(initials("  "), "NN");
/// ```
#[must_use]
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return "NN".to_owned();
    };

    let last = words.next_back().unwrap_or(first);
    first
        .chars()
        .take(1)
        .chain(last.chars().take(1))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Product title from a product name: camelCase humps become words and the
/// first letter is capitalised.
///
/// ```
/// use viafitness_core::format_product_title;
///
/// assert_eq!(format_product_title("leggingFitnessPreta"), "Legging Fitness Preta");
/// ```
#[must_use]
pub fn format_product_title(name: &str) -> String {
    let mut title = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for ch in name.trim().chars() {
        match previous {
            None => title.extend(ch.to_uppercase()),
            Some(prev) if prev.is_lowercase() && ch.is_uppercase() => {
                title.push(' ');
                title.push(ch);
            }
            Some(_) => title.push(ch),
        }
        previous = Some(ch);
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials(""), "NN");
        assert_eq!(initials("joão"), "JJ");
        assert_eq!(initials("João da Silva"), "JS");
        assert_eq!(initials("  lia   maria "), "LM");
        assert_eq!(initials("é"), "ÉÉ");
    }

    #[test]
    fn test_format_product_title() {
        assert_eq!(format_product_title("topNadador"), "Top Nadador");
        assert_eq!(format_product_title("Shorts"), "Shorts");
        assert_eq!(format_product_title("conjunto fitness"), "Conjunto fitness");
        assert_eq!(format_product_title("BRA"), "BRA");
        assert_eq!(format_product_title(""), "");
    }
}
