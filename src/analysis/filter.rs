//! Stopword and excluded-keyword filtering.
//!
//! Word lists are plain configuration values. The default presets below are
//! offered to callers; nothing in the pipeline reads them implicitly.

use std::collections::HashSet;

/// Stopwords common to Korean economy headlines that carry no topical signal.
const KOREAN_NEWS_STOPWORDS: &[&str] = &[
    "기자", "지난해", "지원", "기업", "최대", "연휴", "역대", "사업", "대한", "이번", "관련",
    "대해", "등의", "지난", "오늘", "내일", "올해", "경우", "새로운", "뉴스", "경제", "보도",
    "대한민국", "정부", "금융", "시장", "포토", "한국", "속보", "위해", "작년", "투자", "개월",
    "브랜드", "중앙", "서울", "대통령", "전국", "사람", "의원",
];

/// Topical keywords that survive top-N pruning even when they dominate.
const PROTECTED_KEYWORDS: &[&str] = &[
    "트럼프", "삼성", "전쟁", "시크", "관세", "하이닉스", "아파트", "세종", "대왕고래", "인하",
    "접속", "차단", "외교", "산업부", "대출", "올트먼", "제주항공", "고려아연",
];

/// A read-only set of terms matched by exact, whitespace-trimmed comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet(HashSet<String>);

/// Words dropped from every headline.
pub type StopwordSet = TermSet;
/// Keywords the caller explicitly wants kept out of the table.
pub type ExcludedKeywordSet = TermSet;

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default stopword preset for Korean economy headlines.
    pub fn korean_news_stopwords() -> Self {
        KOREAN_NEWS_STOPWORDS.iter().collect()
    }

    /// Default keywords exempt from automatic top-N pruning.
    pub fn protected_keywords() -> Self {
        PROTECTED_KEYWORDS.iter().collect()
    }

    /// Insert a term, trimmed. Blank terms are ignored.
    pub fn insert(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        self.0.insert(term.to_string())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains(term.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: AsRef<str>> Extend<T> for TermSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for term in iter {
            self.insert(term.as_ref());
        }
    }
}

impl<T: AsRef<str>> FromIterator<T> for TermSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = TermSet::new();
        set.extend(iter);
        set
    }
}

/// Drops stopwords and excluded keywords from a term sequence.
///
/// Pure: the same configuration and input always give the same output, and
/// relative order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    stopwords: StopwordSet,
    excluded: ExcludedKeywordSet,
}

impl Filter {
    pub fn new(stopwords: StopwordSet, excluded: ExcludedKeywordSet) -> Self {
        Self {
            stopwords,
            excluded,
        }
    }

    /// Whether `term` survives filtering.
    pub fn keeps(&self, term: &str) -> bool {
        !self.stopwords.contains(term) && !self.excluded.contains(term)
    }

    /// The subsequence of `terms` that survives filtering.
    pub fn apply<'a, I>(&'a self, terms: I) -> impl Iterator<Item = I::Item> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: AsRef<str>,
    {
        terms.into_iter().filter(move |t| self.keeps(t.as_ref()))
    }
}
