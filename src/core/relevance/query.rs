// Query normalization.
//
// Every scoring path works from the same term list, so a query tokenized
// here behaves identically for name matching, content scoring and snippet
// extraction.

/// Terms shorter than this are dropped, unless that would leave no terms at all.
const MIN_TERM_CHARS: usize = 2;

/// Lowercases a single char while keeping a one-to-one char mapping.
///
/// `char::to_lowercase` may expand to several chars (e.g. `İ`). Taking only
/// the first keeps folded text the same length as the original, so an offset
/// found in folded text is a valid char offset into the original text.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Folds a whole string with [`fold_char`].
pub fn fold_str(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    raw: String,
    normalized: String,
    terms: Vec<String>,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        let tokens: Vec<String> = raw.split_whitespace().map(fold_str).collect();
        let normalized = tokens.join(" ");

        let mut terms: Vec<String> = Vec::new();
        for token in tokens
            .iter()
            .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        {
            if !terms.contains(token) {
                terms.push(token.clone());
            }
        }

        // A query made only of short tokens ("Q", "a b") still has to match something.
        if terms.is_empty() {
            for token in tokens {
                if !terms.contains(&token) {
                    terms.push(token);
                }
            }
        }

        Self {
            raw: raw.to_string(),
            normalized,
            terms,
        }
    }

    /// The query exactly as the user typed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercased query with runs of whitespace collapsed to one space.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn folded_terms(&self) -> Vec<Vec<char>> {
        self.terms.iter().map(|t| t.chars().collect()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_lowercased_and_whitespace_split() {
        let query = Query::new("  Budget\tAllocation  ");
        assert_eq!(query.terms(), &["budget", "allocation"]);
        assert_eq!(query.normalized(), "budget allocation");
        assert_eq!(query.raw(), "  Budget\tAllocation  ");
    }

    #[test]
    fn single_char_terms_are_dropped_when_longer_terms_exist() {
        let query = Query::new("a plan for Q2");
        assert_eq!(query.terms(), &["plan", "for", "q2"]);
        // Phrase containment still sees the whole query.
        assert_eq!(query.normalized(), "a plan for q2");
    }

    #[test]
    fn short_only_query_keeps_its_tokens() {
        let query = Query::new("Q");
        assert_eq!(query.terms(), &["q"]);
        assert!(!query.is_empty());
    }

    #[test]
    fn duplicate_terms_are_collapsed() {
        let query = Query::new("report Report REPORT summary");
        assert_eq!(query.terms(), &["report", "summary"]);
    }

    #[test]
    fn blank_query_has_no_terms() {
        assert!(Query::new("   ").is_empty());
        assert!(Query::new("").is_empty());
    }

    #[test]
    fn folding_preserves_char_count() {
        let text = "İstanbul ÅNGSTRÖM";
        assert_eq!(fold_str(text).chars().count(), text.chars().count());
    }
}
