//! Short labels for containers that share a long common name prefix.

pub const GENERIC_LABEL: &str = "logs";

#[derive(Clone, Copy, Debug)]
pub struct NameDiffer {
    separator: char,
}

impl Default for NameDiffer {
    fn default() -> Self {
        Self::new('-')
    }
}

impl NameDiffer {
    /// `separator` is rewritten to `_` before names are split into words.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    fn words<'a>(&self, normalized: &'a str) -> Vec<&'a str> {
        normalized.split('_').filter(|w| !w.is_empty()).collect()
    }

    fn normalize(&self, name: &str) -> String {
        name.replace(self.separator, "_")
    }

    /// First word of `name` that is not shared with `sibling`.
    pub fn distinguish(&self, name: &str, sibling: Option<&str>) -> String {
        let Some(sibling) = sibling else {
            return GENERIC_LABEL.to_string();
        };

        let name = self.normalize(name);
        let sibling = self.normalize(sibling);
        let ours = self.words(&name);
        let theirs = self.words(&sibling);

        let common = common_words(&ours, &theirs);
        ours.iter()
            .zip(common.iter())
            .find(|(_, shared)| !**shared)
            .map(|(word, _)| word.to_string())
            .unwrap_or_else(|| GENERIC_LABEL.to_string())
    }
}

/// For each word of `ours`, whether it belongs to the longest common word
/// subsequence with `theirs`.
fn common_words(ours: &[&str], theirs: &[&str]) -> Vec<bool> {
    let (n, m) = (ours.len(), theirs.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if ours[i] == theirs[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut shared = vec![false; n];
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if ours[i] == theirs[j] {
            shared[i] = true;
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_differing_word_is_the_label() {
        let differ = NameDiffer::default();
        assert_eq!(differ.distinguish("shop_web_1", Some("shop_api_1")), "web");
        assert_eq!(differ.distinguish("shop_api_1", Some("shop_web_1")), "api");
    }

    #[test]
    fn test_separator_is_normalized() {
        let differ = NameDiffer::new('-');
        assert_eq!(differ.distinguish("shop-web-1", Some("shop_api_1")), "web");
        assert_eq!(differ.distinguish("shop-db-1", Some("shop-db-2")), "1");
    }

    #[test]
    fn test_longer_names() {
        let differ = NameDiffer::default();
        assert_eq!(
            differ.distinguish("acme_shop_mail_worker_1", Some("acme_shop_worker_1")),
            "mail"
        );
    }

    #[test]
    fn test_fallback_label() {
        let differ = NameDiffer::default();
        assert_eq!(differ.distinguish("shop_web_1", None), GENERIC_LABEL);
        assert_eq!(differ.distinguish("shop_web_1", Some("shop_web_1")), GENERIC_LABEL);
    }
}
