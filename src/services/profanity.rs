use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

const BLOCKED_WORDS: &[&str] = &[
    "anal", "anus", "arse", "arsehole", "ass", "asses", "asshole", "assholes", "bastard", "bastards", "bitch",
    "bitches", "bitchy", "blowjob", "bollocks", "boner", "bullshit", "clit", "cock", "cocks", "cocksucker", "coon",
    "crap", "cum", "cunt", "cunts", "damn", "dick", "dickhead", "dicks", "dildo", "douche", "douchebag", "dyke", "fag",
    "faggot", "fags", "fuck", "fucked", "fucker", "fuckers", "fuckin", "fucking", "fucks", "goddamn", "handjob",
    "jackass", "jizz", "kike", "motherfucker", "motherfuckers", "motherfucking", "nigga", "nigger", "niggers",
    "penis", "piss", "pissed", "porn", "prick", "pussy", "queef", "retard", "scrotum", "shit", "shits", "shitty",
    "slut", "sluts", "spic", "tit", "tits", "twat", "vagina", "wank", "wanker", "whore", "whores", "fuk", "fuks",
    "fck", "fcuk", "fuq", "phuck", "biatch", "wtf", "stfu", "gtfo", "dumbass", "smartass", "asshat", "asswipe",
    "assface", "dumbasses", "fatass",
];

/// Profane wherever they appear inside a word.
const PROFANE_STEMS: &[&str] = &[
    "fuck", "phuck", "shit", "cunt", "dick", "bitch", "biatch", "cock", "twat", "wank", "piss", "whore", "slut",
    "nigg", "fagg", "jizz", "bastard", "asshole", "dildo", "pussy",
];

/// Ordinary words that happen to contain a stem.
const SAFE_WORDS: &[&str] = &[
    "scunthorpe", "cockpit", "cocktail", "cockatoo", "cockatiel", "cockroach", "cockney", "cockerel", "cockle",
    "peacock", "hancock", "hitchcock", "shuttlecock", "woodcock", "gamecock", "babcock", "stopcock", "haycock",
    "dickens", "dickinson", "dickson", "niggl", "niggard", "snigger", "pissarro", "pussycat", "pussywillow", "swank",
];

/// One strategy for spotting profanity.
pub trait ProfanityDetector: Send + Sync + Debug {
    fn name(&self) -> &'static str;
    fn is_profane(&self, text: &str) -> bool;
}

/// Flags text when any of its detectors does.
#[derive(Clone, Debug)]
pub struct ProfanityFilter {
    detectors: Vec<Arc<dyn ProfanityDetector>>,
}

impl ProfanityFilter {
    #[must_use]
    pub fn new(detectors: Vec<Arc<dyn ProfanityDetector>>) -> Self {
        Self { detectors }
    }

    /// Word-list, obfuscation and stem detectors over the built-in list plus `extra_words`.
    #[must_use]
    pub fn standard(extra_words: &[String]) -> Self {
        let words = word_set(extra_words);
        Self::new(vec![
            Arc::new(WordListDetector { words: Arc::clone(&words) }),
            Arc::new(ObfuscationDetector { words }),
            Arc::new(StemDetector),
        ])
    }

    #[must_use]
    pub fn is_profane(&self, text: &str) -> bool {
        self.detectors.iter().any(|detector| {
            let flagged = detector.is_profane(text);
            if flagged {
                tracing::debug!(detector = detector.name(), "Profanity detected");
            }
            flagged
        })
    }
}

fn word_set(extra_words: &[String]) -> Arc<HashSet<String>> {
    let words = BLOCKED_WORDS
        .iter()
        .map(|w| (*w).to_string())
        .chain(extra_words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()))
        .collect();
    Arc::new(words)
}

/// Case-insensitive whole-word match.
#[derive(Debug)]
pub struct WordListDetector {
    words: Arc<HashSet<String>>,
}

impl ProfanityDetector for WordListDetector {
    fn name(&self) -> &'static str {
        "word_list"
    }

    fn is_profane(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .any(|token| self.words.contains(&token.to_lowercase()))
    }
}

/// Catches spellings such as `$h1t`, `f.u.c.k`, `f u c k` and `shiiit`.
#[derive(Debug)]
pub struct ObfuscationDetector {
    words: Arc<HashSet<String>>,
}

impl ObfuscationDetector {
    fn matches(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.words.contains(token)
            || self.words.contains(&collapse_runs(token, 2))
            || self.words.contains(&collapse_runs(token, 1))
    }
}

impl ProfanityDetector for ObfuscationDetector {
    fn name(&self) -> &'static str {
        "obfuscation"
    }

    fn is_profane(&self, text: &str) -> bool {
        let tokens: Vec<String> = text.split_whitespace().map(normalize).collect();

        if tokens.iter().any(|token| self.matches(token)) {
            return true;
        }

        // Letters spelled out one by one ("f u c k") are judged as a single word.
        let mut spelled = String::new();
        for token in &tokens {
            if token.chars().count() == 1 {
                spelled.push_str(token);
                continue;
            }
            if self.matches(&spelled) {
                return true;
            }
            spelled.clear();
        }
        self.matches(&spelled)
    }
}

/// Flags compounds such as `dipshit` or `fuckface`. Short stems that occur in
/// ordinary words (`ass`, `tit`) are left to the whole-word detectors.
#[derive(Debug, Default)]
pub struct StemDetector;

impl StemDetector {
    fn contains_stem(token: &str) -> bool {
        let mut token = token.to_string();
        for safe in SAFE_WORDS {
            if token.contains(safe) {
                token = token.replace(safe, " ");
            }
        }

        let short_runs = collapse_runs(&token, 2);
        let single_runs = collapse_runs(&token, 1);
        PROFANE_STEMS.iter().any(|stem| {
            token.contains(stem)
                || short_runs.contains(stem)
                || (collapse_runs(stem, 1) == *stem && single_runs.contains(stem))
        })
    }
}

impl ProfanityDetector for StemDetector {
    fn name(&self) -> &'static str {
        "stem"
    }

    fn is_profane(&self, text: &str) -> bool {
        text.split_whitespace().map(normalize).any(|token| Self::contains_stem(&token))
    }
}

fn normalize(token: &str) -> String {
    token
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '@' | '4' => 'a',
            '$' | '5' => 's',
            '0' => 'o',
            '1' | '!' | '|' => 'i',
            '3' => 'e',
            '7' | '+' => 't',
            other => other,
        })
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Shortens every run of a repeated character to at most `max` characters.
fn collapse_runs(token: &str, max: usize) -> String {
    let mut out = String::with_capacity(token.len());
    let mut last = None;
    let mut run = 0;
    for c in token.chars() {
        if Some(c) == last {
            run += 1;
        } else {
            last = Some(c);
            run = 1;
        }
        if run <= max {
            out.push(c);
        }
    }
    out
}
