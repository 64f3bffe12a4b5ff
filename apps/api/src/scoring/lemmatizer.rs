//! Lookup-and-rule English lemmatizer.
//!
//! Resolution order for a lowercase alphabetic word:
//! 1. irregular lookup table (`built` → `build`, `children` → `child`)
//! 2. invariant words that look inflected but are not (`kubernetes`, `analytics`)
//! 3. inflection rules for plural / third person `-s`, past `-ed`, progressive `-ing`
//!
//! The rules undo consonant doubling (`planned` → `plan`) and restore a silent
//! `e` where the stem shape calls for one (`managed` → `manage`).

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

const IRREGULAR: &[(&str, &str)] = &[
    // irregular verbs
    ("ran", "run"),
    ("led", "lead"),
    ("built", "build"),
    ("wrote", "write"),
    ("written", "write"),
    ("writing", "write"),
    ("taught", "teach"),
    ("thought", "think"),
    ("brought", "bring"),
    ("bought", "buy"),
    ("sought", "seek"),
    ("caught", "catch"),
    ("held", "hold"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("began", "begin"),
    ("begun", "begin"),
    ("knew", "know"),
    ("known", "know"),
    ("spent", "spend"),
    ("sent", "send"),
    ("won", "win"),
    ("met", "meet"),
    ("paid", "pay"),
    ("laid", "lay"),
    ("told", "tell"),
    ("sold", "sell"),
    ("felt", "feel"),
    ("found", "find"),
    ("understood", "understand"),
    ("stood", "stand"),
    ("took", "take"),
    ("saw", "see"),
    ("seen", "see"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("drew", "draw"),
    ("drawn", "draw"),
    ("broke", "break"),
    ("broken", "break"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("struck", "strike"),
    ("lost", "lose"),
    ("dealt", "deal"),
    ("meant", "mean"),
    ("goes", "go"),
    ("went", "go"),
    // irregular plurals
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("criteria", "criterion"),
    ("analyses", "analysis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("caches", "cache"),
    ("niches", "niche"),
    // regular forms the suffix rules get wrong
    ("added", "add"),
    ("adding", "add"),
    ("created", "create"),
    ("creating", "create"),
    ("negotiated", "negotiate"),
    ("negotiating", "negotiate"),
    ("initiated", "initiate"),
    ("initiating", "initiate"),
    ("evaluated", "evaluate"),
    ("evaluating", "evaluate"),
    ("guided", "guide"),
    ("guiding", "guide"),
    ("changed", "change"),
    ("changing", "change"),
    ("arranged", "arrange"),
    ("challenged", "challenge"),
    ("caused", "cause"),
    ("explored", "explore"),
    ("exploring", "explore"),
    ("restored", "restore"),
    ("restoring", "restore"),
    ("compiled", "compile"),
    ("compiling", "compile"),
    ("scaled", "scale"),
    ("scaling", "scale"),
    ("scheduled", "schedule"),
    ("excelled", "excel"),
    ("excelling", "excel"),
    ("modelled", "model"),
    ("labelled", "label"),
    ("labelling", "label"),
    ("promoted", "promote"),
    ("promoting", "promote"),
    ("quoted", "quote"),
    ("shaped", "shape"),
    ("shaping", "shape"),
    ("scoped", "scope"),
    ("scoping", "scope"),
    ("typed", "type"),
    ("typing", "type"),
    ("piped", "pipe"),
    ("hoped", "hope"),
];

const INVARIANT: &[&str] = &[
    // technology names
    "kubernetes", "devops", "pandas", "jenkins", "postgres", "windows", "rails", "macos",
    "keras", "saas", "paas", "iaas", "https", "nodejs", "nextjs", "reactjs", "vuejs", "canvas",
    // nouns that only look plural
    "series", "species", "news", "bias", "alias", "atlas", "chaos", "lens", "texas",
    // fields of study
    "analytics", "physics", "mathematics", "statistics", "economics", "graphics", "electronics",
    "robotics", "logistics", "ethics", "genomics", "linguistics", "dynamics", "mechanics",
    "semantics", "optics", "ergonomics", "informatics", "bioinformatics", "politics",
    "forensics", "diagnostics",
    // gerunds used as nouns
    "engineering", "marketing", "accounting", "banking", "learning", "training",
    "manufacturing", "consulting", "networking", "computing", "programming", "scripting",
    "testing", "modeling", "scheduling", "budgeting", "forecasting", "branding", "planning",
    "hosting", "logging", "clustering", "pricing", "recruiting", "nursing", "auditing",
    "onboarding", "troubleshooting",
];

/// English lemmatizer backed by static lookup tables.
pub struct Lemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Lemmatizer {
    pub fn english() -> Self {
        Self {
            irregular: IRREGULAR.iter().copied().collect(),
            invariant: INVARIANT.iter().copied().collect(),
        }
    }

    /// Returns the dictionary base form of `word`.
    ///
    /// `word` must already be lowercase and alphabetic.
    pub fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if let Some(lemma) = self.irregular.get(word) {
            return Cow::Borrowed(lemma);
        }
        if word.len() <= 3 || !word.is_ascii() || self.invariant.contains(word) {
            return Cow::Borrowed(word);
        }

        strip_progressive(word)
            .or_else(|| strip_past(word))
            .or_else(|| strip_plural(word))
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(word))
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(s: &str) -> bool {
    s.bytes().any(|c| is_vowel(c) || c == b'y')
}

fn strip_plural(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        return (word.len() > 4).then(|| format!("{stem}y"));
    }
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if ["ss", "us", "is", "ous"].iter().any(|s| word.ends_with(s)) {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

fn strip_past(word: &str) -> Option<String> {
    if word.len() <= 4 || word.ends_with("eed") {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ied") {
        return Some(format!("{stem}y"));
    }
    let stem = word.strip_suffix("ed")?;
    has_vowel(stem).then(|| restore_stem(stem))
}

fn strip_progressive(word: &str) -> Option<String> {
    if word.len() <= 5 {
        return None;
    }
    let stem = word.strip_suffix("ing")?;
    (stem.len() >= 3 && has_vowel(stem)).then(|| restore_stem(stem))
}

/// Rebuilds the base form from a stem whose inflectional suffix was removed.
fn restore_stem(stem: &str) -> String {
    let b = stem.as_bytes();
    let n = b.len();

    if n >= 3 && b[n - 1] == b[n - 2] && !is_vowel(b[n - 1]) {
        match b[n - 1] {
            // controlled -> control, but installed -> install
            b'l' if n >= 7 && matches!(b[n - 3], b'o' | b'e') => {
                return stem[..n - 1].to_string();
            }
            b'l' | b's' | b'f' | b'z' => return stem.to_string(),
            _ => return stem[..n - 1].to_string(),
        }
    }

    if needs_silent_e(b) {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

fn needs_silent_e(b: &[u8]) -> bool {
    let n = b.len();
    if n < 3 {
        return false;
    }
    let last = b[n - 1];
    let prev = b[n - 2];
    let before = b[n - 3];

    match last {
        b'v' | b'z' | b'c' | b'u' => true,
        b'g' => prev != b'n',
        b's' => matches!(prev, b'a' | b'i' | b'o' | b'y'),
        b'r' => match prev {
            b'i' => !matches!(before, b'a' | b'e'),
            b'u' => before != b'o',
            b'a' => !is_vowel(before),
            b'o' => n <= 5 && !is_vowel(before),
            _ => false,
        },
        b't' => matches!(prev, b'a' | b'u') && !is_vowel(before),
        b'd' => matches!(prev, b'i' | b'u' | b'o') && !is_vowel(before),
        b'k' => is_vowel(prev) && !is_vowel(before),
        b'n' => prev == b'i' && !is_vowel(before),
        b'l' => !is_vowel(prev) && !matches!(prev, b'l' | b'r'),
        b'm' => matches!(prev, b'a' | b'u') && !is_vowel(before),
        b'b' => prev == b'i' && !is_vowel(before),
        _ => false,
    }
}
