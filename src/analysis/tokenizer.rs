//! Morphological tokenization of headline text.
//!
//! The analyzer is pluggable through [`MorphAnalyzer`]. [`HangulAnalyzer`]
//! is the built-in rule-based implementation: it segments text by script,
//! peels trailing postpositions (josa) and 하다/되다 predicate endings off
//! Hangul words, and tags what remains. [`Tokenizer`] keeps only the nouns
//! that meet the minimum length.

use crate::error::TokenizeError;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Part-of-speech tag attached to each analysed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    CommonNoun,
    ProperNoun,
    Verb,
    Particle,
    Number,
    Foreign,
    Punctuation,
    Other,
}

impl PartOfSpeech {
    /// Content-bearing classes kept for frequency counting.
    pub fn is_noun(self) -> bool {
        matches!(self, PartOfSpeech::CommonNoun | PartOfSpeech::ProperNoun)
    }
}

/// A tagged segment as produced by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    pub surface: String,
    pub pos: PartOfSpeech,
}

impl Morpheme {
    fn new(surface: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            surface: surface.into(),
            pos,
        }
    }
}

/// Anything able to segment text into tagged morphemes.
pub trait MorphAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError>;
}

/// A noun kept by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub pos: PartOfSpeech,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.term
    }
}

/// Splits headlines into noun tokens using a [`MorphAnalyzer`].
#[derive(Clone)]
pub struct Tokenizer {
    analyzer: Arc<dyn MorphAnalyzer>,
    min_len: usize,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("min_len", &self.min_len)
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    /// `min_len` is counted in characters; shorter nouns are dropped.
    pub fn new(analyzer: impl MorphAnalyzer + 'static, min_len: usize) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            min_len,
        }
    }

    pub fn tokenize(&self, text: &str) -> Result<Tokens, TokenizeError> {
        let morphemes = self.analyzer.analyze(text)?;
        Ok(Tokens {
            morphemes,
            min_len: self.min_len,
        })
    }
}

/// The analysed form of one headline.
///
/// [`Tokens::iter`] lazily yields the retained nouns and can be called any
/// number of times.
#[derive(Debug, Clone)]
pub struct Tokens {
    morphemes: Vec<Morpheme>,
    min_len: usize,
}

impl Tokens {
    pub fn iter(&self) -> impl Iterator<Item = Token> + '_ {
        self.morphemes
            .iter()
            .filter(|m| m.pos.is_noun() && m.surface.chars().count() >= self.min_len)
            .map(|m| Token {
                term: m.surface.clone(),
                pos: m.pos,
            })
    }
}

/// Which final-consonant (batchim) context a postposition attaches to.
#[derive(Debug, Clone, Copy)]
enum Attach {
    Any,
    Consonant,
    Vowel,
    VowelOrRieul,
}

const PARTICLES: &[(&str, Attach)] = &[
    ("에서는", Attach::Any),
    ("에서도", Attach::Any),
    ("에게서", Attach::Any),
    ("으로는", Attach::Consonant),
    ("으로도", Attach::Consonant),
    ("으로써", Attach::Consonant),
    ("으로서", Attach::Consonant),
    ("에서", Attach::Any),
    ("에게", Attach::Any),
    ("까지", Attach::Any),
    ("부터", Attach::Any),
    ("보다", Attach::Any),
    ("처럼", Attach::Any),
    ("만큼", Attach::Any),
    ("마저", Attach::Any),
    ("조차", Attach::Any),
    ("에는", Attach::Any),
    ("에도", Attach::Any),
    ("으로", Attach::Consonant),
    ("과의", Attach::Consonant),
    ("와의", Attach::Vowel),
    ("로는", Attach::VowelOrRieul),
    ("로도", Attach::VowelOrRieul),
    ("로의", Attach::VowelOrRieul),
    ("이나", Attach::Consonant),
    ("이란", Attach::Consonant),
    ("은", Attach::Consonant),
    ("는", Attach::Vowel),
    ("이", Attach::Consonant),
    ("가", Attach::Vowel),
    ("을", Attach::Consonant),
    ("를", Attach::Vowel),
    ("과", Attach::Consonant),
    ("와", Attach::Vowel),
    ("로", Attach::VowelOrRieul),
    ("의", Attach::Any),
    ("에", Attach::Any),
    ("도", Attach::Any),
    ("만", Attach::Any),
    ("들", Attach::Any),
];

/// Endings of 하다/되다/시키다 predicates whose stem is a noun.
const PREDICATE_ENDINGS: &[&str] = &[
    "하겠다", "하지만", "했지만", "시킨다", "했다", "한다", "하는", "하고", "하며", "하면", "해야",
    "했던", "했고", "하던", "하자", "하여", "해서", "해진", "하니", "된다", "됐다", "되는", "되고",
    "되며", "되자", "되어", "되던", "됐던", "시켜", "시킨", "이다", "였다", "할", "될", "된", "한",
    "해", "돼",
];

/// Two-syllable nouns that end in a syllable also used as a postposition.
const NOUN_TAILS: &[&str] = &[
    "주의", "협의", "합의", "논의", "회의", "동의", "정의", "결의", "건의", "심의", "문의", "강의",
    "모의", "의의", "민의", "예의", "상의", "제도", "속도", "한도", "정도", "태도", "지도", "강도",
    "빈도", "용도", "온도", "연도", "각도", "고도", "밀도", "궤도", "척도", "인도", "시도", "의도",
    "수도", "부도", "주도", "매도", "과도", "반도", "포도", "파도", "진도", "구도", "적도", "이도",
    "불만", "비만", "미만", "충만", "방만", "천만", "백만", "수만", "억만", "성과", "결과", "효과",
    "부과", "초과", "통과", "사과", "학과", "경로", "통로", "항로", "진로", "활로", "퇴로", "도로",
    "수로", "회로", "유로", "제로", "프로", "과로", "미로", "추가", "주가", "시가", "호가", "대가",
    "지가", "고가", "저가", "유가", "휴가", "여가", "부가", "외가", "나이", "아이", "길이", "높이",
    "깊이", "넓이", "놀이", "먹이", "벌이",
];

/// Whole words that look like verb forms or predicates but are nouns.
const KNOWN_NOUNS: &[&str] = &[
    "논란", "혼란", "반란", "곤란", "비난", "재난", "고난", "가난", "피난", "어른", "기린", "행운",
    "기운", "국운", "모친", "부친", "치킨", "한은", "연은", "단어", "언어", "용어", "방어", "영어",
    "국어", "상어", "타워", "파워", "샤워", "지난해", "남중국해", "무제한", "남북한",
];

/// Last syllables of adnominal verb forms (놀란, 늘어난, 있는).
const ADNOMINAL_FINALS: &[char] = &['는', '던', '난', '란', '른', '린', '운', '친', '킨'];

/// Multi-syllable verb endings (떨어진, 어려워, 커져, 늘면서).
const VERB_ENDINGS: &[&str] = &[
    "어진", "아진", "워진", "려진", "러진", "커진", "어서", "아서", "워서", "어도", "아도", "었던",
    "았던", "지만", "면서", "는데", "으며", "으면", "워", "져", "쳐",
];

const FUNCTION_WORDS: &[&str] = &[
    "그러나", "하지만", "그리고", "또한", "다시", "모두", "가장", "매우", "이미", "아직", "결국",
    "더욱", "특히", "바로", "함께", "과연", "역시", "무려", "겨우", "약간",
];

/// Rule-based analyzer for Korean headline text.
#[derive(Debug, Clone, Default)]
pub struct HangulAnalyzer {
    proper_nouns: HashSet<String>,
}

impl HangulAnalyzer {
    /// Words tagged as proper nouns and never split.
    pub fn with_proper_nouns<I, T>(words: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            proper_nouns: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    fn noun(&self, stem: &str) -> Morpheme {
        if self.proper_nouns.contains(stem) {
            Morpheme::new(stem, PartOfSpeech::ProperNoun)
        } else {
            Morpheme::new(stem, PartOfSpeech::CommonNoun)
        }
    }

    fn analyze_word(&self, word: &str, out: &mut Vec<Morpheme>) {
        if self.proper_nouns.contains(word) {
            out.push(Morpheme::new(word, PartOfSpeech::ProperNoun));
            return;
        }
        if FUNCTION_WORDS.contains(&word) {
            out.push(Morpheme::new(word, PartOfSpeech::Other));
            return;
        }
        if KNOWN_NOUNS.contains(&word) {
            out.push(Morpheme::new(word, PartOfSpeech::CommonNoun));
            return;
        }

        for ending in PREDICATE_ENDINGS {
            if let Some(stem) = word.strip_suffix(ending) {
                if stem.chars().count() >= 2 {
                    out.push(self.noun(stem));
                    out.push(Morpheme::new(*ending, PartOfSpeech::Verb));
                    return;
                }
            }
        }

        // Up to two postpositions, e.g. 기업들의 -> 기업 + 들 + 의.
        let mut stem = word;
        let mut particles = Vec::new();
        for _ in 0..2 {
            if self.proper_nouns.contains(stem) || KNOWN_NOUNS.contains(&stem) {
                break;
            }
            match strip_particle(stem) {
                Some((rest, particle)) => {
                    particles.push(particle);
                    stem = rest;
                }
                None => break,
            }
        }
        if !particles.is_empty() {
            out.push(self.noun(stem));
            out.extend(
                particles
                    .into_iter()
                    .rev()
                    .map(|p| Morpheme::new(p, PartOfSpeech::Particle)),
            );
            return;
        }

        if is_verb_form(word) {
            out.push(Morpheme::new(word, PartOfSpeech::Verb));
        } else {
            out.push(self.noun(word));
        }
    }
}

impl MorphAnalyzer for HangulAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>, TokenizeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TokenizeError::EmptyInput);
        }

        let mut morphemes = Vec::new();
        let mut has_content = false;
        for (script, run) in script_runs(text) {
            match script {
                Script::Hangul => {
                    has_content = true;
                    self.analyze_word(run, &mut morphemes);
                }
                Script::Latin => {
                    has_content = true;
                    morphemes.push(Morpheme::new(run, PartOfSpeech::Foreign));
                }
                Script::Digit => {
                    has_content = true;
                    morphemes.push(Morpheme::new(run, PartOfSpeech::Number));
                }
                Script::Symbol => morphemes.push(Morpheme::new(run, PartOfSpeech::Punctuation)),
                Script::Space => {}
            }
        }

        if !has_content {
            return Err(TokenizeError::NoSegments(text.to_string()));
        }
        Ok(morphemes)
    }
}

fn strip_particle(word: &str) -> Option<(&str, &'static str)> {
    for (particle, attach) in PARTICLES {
        let Some(stem) = word.strip_suffix(particle) else {
            continue;
        };
        // One-syllable stems are split too; the length floor drops them.
        let Some(last) = stem.chars().last() else {
            continue;
        };
        if !attaches(last, *attach) {
            continue;
        }
        if particle.chars().count() == 1 && ends_with_noun_tail(word) {
            continue;
        }
        return Some((stem, *particle));
    }
    None
}

fn ends_with_noun_tail(word: &str) -> bool {
    NOUN_TAILS.iter().any(|tail| word.ends_with(tail))
}

/// Conjugated forms left over once predicate endings and postpositions
/// have been tried: 늘었다, 놀란, 있는, 풀어, 떨어진.
fn is_verb_form(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    let &[.., before, last] = chars.as_slice() else {
        return false;
    };
    if KNOWN_NOUNS.iter().any(|noun| word.ends_with(noun)) {
        return false;
    }
    if last == '다' || ADNOMINAL_FINALS.contains(&last) {
        return true;
    }
    if VERB_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
        return true;
    }
    // 잡아, 풀어: a connective 아/어 follows a closed syllable. Loanwords
    // such as 아시아 or 미디어 put it after an open one.
    matches!(last, '아' | '어') && final_consonant(before).is_some_and(|f| f != 0)
}

/// Final consonant index of a precomposed Hangul syllable (0 = none).
fn final_consonant(c: char) -> Option<u32> {
    let code = c as u32;
    (0xAC00..=0xD7A3)
        .contains(&code)
        .then(|| (code - 0xAC00) % 28)
}

fn attaches(last: char, attach: Attach) -> bool {
    const RIEUL: u32 = 8;
    match (attach, final_consonant(last)) {
        (Attach::Any, _) => true,
        (_, None) => false,
        (Attach::Consonant, Some(f)) => f != 0,
        (Attach::Vowel, Some(f)) => f == 0,
        (Attach::VowelOrRieul, Some(f)) => f == 0 || f == RIEUL,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hangul,
    Latin,
    Digit,
    Symbol,
    Space,
}

fn script_of(c: char) -> Script {
    if final_consonant(c).is_some() {
        Script::Hangul
    } else if c.is_whitespace() {
        Script::Space
    } else if c.is_ascii_digit() {
        Script::Digit
    } else if c.is_alphabetic() {
        Script::Latin
    } else {
        Script::Symbol
    }
}

/// Split text into maximal runs of one script.
fn script_runs(text: &str) -> Vec<(Script, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<Script> = None;
    for (idx, c) in text.char_indices() {
        let script = script_of(c);
        match current {
            Some(s) if s == script => {}
            Some(s) => {
                runs.push((s, &text[start..idx]));
                start = idx;
                current = Some(script);
            }
            None => current = Some(script),
        }
    }
    if let Some(s) = current {
        runs.push((s, &text[start..]));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nouns(text: &str) -> Vec<String> {
        Tokenizer::new(HangulAnalyzer::default(), 2)
            .tokenize(text)
            .unwrap()
            .iter()
            .map(|t| t.term)
            .collect()
    }

    #[test]
    fn test_plain_nouns_pass_through() {
        assert_eq!(nouns("한국 경제 성장률 상승"), vec!["한국", "경제", "성장률", "상승"]);
        assert_eq!(nouns("경제 성장률 둔화 우려"), vec!["경제", "성장률", "둔화", "우려"]);
    }

    #[test]
    fn test_particles_follow_batchim_agreement() {
        assert_eq!(
            nouns("삼성전자가 반도체 수출을 늘렸다"),
            vec!["삼성전자", "반도체", "수출"]
        );
        assert_eq!(nouns("트럼프의 관세 전쟁"), vec!["트럼프", "관세", "전쟁"]);
        // 가 only follows an open syllable, so 전문가 is kept whole.
        assert_eq!(nouns("전문가 전망"), vec!["전문가", "전망"]);
        assert_eq!(nouns("역효과 우려"), vec!["역효과", "우려"]);
    }

    #[test]
    fn test_predicate_endings_leave_noun_stem() {
        assert_eq!(
            nouns("금리 인하로 대출 수요가 증가했다"),
            vec!["금리", "인하", "대출", "수요", "증가"]
        );
    }

    #[test]
    fn test_stacked_postpositions() {
        assert_eq!(nouns("기업들의 실적"), vec!["기업", "실적"]);
    }

    #[test]
    fn test_noun_tails_are_not_split() {
        assert_eq!(nouns("민주주의 위기"), vec!["민주주의", "위기"]);
        assert_eq!(nouns("반도체회로 수출"), vec!["반도체회로", "수출"]);
    }

    #[test]
    fn test_single_character_nouns_dropped() {
        assert_eq!(nouns("금 값 급등"), vec!["급등"]);
    }

    #[test]
    fn test_mixed_scripts_keep_only_hangul_nouns() {
        let tokens = Tokenizer::new(HangulAnalyzer::default(), 2)
            .tokenize("'AI반도체' 3% 급등")
            .unwrap();
        let terms: Vec<_> = tokens.iter().map(|t| t.term).collect();
        assert_eq!(terms, vec!["반도체", "급등"]);
    }

    #[test]
    fn test_proper_noun_dictionary() {
        let analyzer = HangulAnalyzer::with_proper_nouns(["하이닉스", "고려아연"]);
        let tokens = Tokenizer::new(analyzer, 2)
            .tokenize("고려아연이 하이닉스를 추월")
            .unwrap();
        let tagged: Vec<_> = tokens.iter().map(|t| (t.term, t.pos)).collect();
        assert_eq!(
            tagged,
            vec![
                ("고려아연".to_string(), PartOfSpeech::ProperNoun),
                ("하이닉스".to_string(), PartOfSpeech::ProperNoun),
                ("추월".to_string(), PartOfSpeech::CommonNoun),
            ]
        );
    }

    #[test]
    fn test_tokens_are_restartable() {
        let tokens = Tokenizer::new(HangulAnalyzer::default(), 2)
            .tokenize("환율 급등 환율")
            .unwrap();
        let first: Vec<_> = tokens.iter().collect();
        let second: Vec<_> = tokens.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_empty_and_symbol_only_input_fail() {
        let analyzer = HangulAnalyzer::default();
        assert_eq!(analyzer.analyze("   "), Err(TokenizeError::EmptyInput));
        assert!(matches!(
            analyzer.analyze("…!?"),
            Err(TokenizeError::NoSegments(_))
        ));
    }

    #[test]
    fn test_function_words_and_verbs_are_not_nouns() {
        assert_eq!(nouns("그러나 물가 있다"), vec!["물가"]);
    }

    #[test]
    fn test_hada_conjugations_leave_noun_stem() {
        assert_eq!(
            nouns("금리 인상해 증가해서 상승하자"),
            vec!["금리", "인상", "증가", "상승"]
        );
        assert_eq!(nouns("급등한 환율에 놀란 기업들"), vec!["급등", "환율", "기업"]);
    }

    #[test]
    fn test_adnominal_and_connective_forms_are_verbs() {
        assert_eq!(
            nouns("수출 늘어난 반도체 기업 있는 곳"),
            vec!["수출", "반도체", "기업"]
        );
        assert_eq!(nouns("집값 떨어진 지역 어려워 금리 커져"), vec!["집값", "지역", "금리"]);
    }

    #[test]
    fn test_verb_like_nouns_survive() {
        assert_eq!(
            nouns("관세 논란 러시아 비난 한은 아시아 용어"),
            vec!["관세", "논란", "러시아", "비난", "한은", "아시아", "용어"]
        );
        assert_eq!(nouns("지난해 수출 실적 부진"), vec!["지난해", "수출", "실적", "부진"]);
    }

    #[test]
    fn test_particles_after_single_syllable_nouns() {
        assert_eq!(
            nouns("빚이 늘었다 돈을 풀어 집값 안정"),
            vec!["집값", "안정"]
        );
        assert_eq!(nouns("국제유가 급등 휴가 나이 아이"), vec!["국제유가", "급등", "휴가", "나이", "아이"]);
        assert_eq!(nouns("유가가 유로로"), vec!["유가", "유로"]);
    }
}
