//! How alike two countries look on a quiz card.
//!
//! Pairs are unordered: `flags_confusable("td", "ro")` and
//! `flags_confusable("ro", "td")` agree.

use flagquiz_protocol::{CountryCode, Difficulty};

/// Flags that are easy to mistake for one another.
#[rustfmt::skip]
const CONFUSABLE_FLAGS: &[(&str, &str)] = &[
    ("td", "ro"), ("ad", "ro"), ("ad", "td"), ("md", "ro"), ("md", "ad"),
    ("id", "mc"), ("id", "pl"), ("mc", "pl"), ("sg", "id"),
    ("au", "nz"),
    ("nl", "lu"), ("fr", "nl"), ("fr", "ru"),
    ("ie", "ci"), ("it", "ie"), ("it", "ci"), ("it", "mx"),
    ("co", "ec"), ("co", "ve"), ("ec", "ve"),
    ("sn", "ml"), ("ml", "gn"), ("sn", "cm"), ("cm", "gn"),
    ("no", "is"), ("dk", "no"), ("se", "fi"),
    ("sk", "si"), ("si", "ru"), ("ru", "rs"), ("sk", "ru"),
    ("ni", "sv"), ("hn", "sv"), ("hn", "ni"), ("gt", "sv"),
    ("cr", "th"),
    ("jo", "sd"), ("ae", "kw"), ("ae", "jo"), ("kw", "jo"),
    ("ye", "eg"), ("eg", "iq"), ("iq", "sy"), ("sy", "ye"), ("eg", "sy"),
    ("at", "lv"), ("at", "lb"),
    ("gh", "bo"), ("gh", "et"), ("bo", "lt"),
    ("be", "de"),
    ("bh", "qa"),
    ("us", "lr"), ("my", "us"), ("my", "lr"),
    ("cz", "ph"),
    ("jp", "bd"), ("jp", "pw"), ("bd", "pw"),
    ("tr", "tn"),
    ("ne", "in"),
    ("pe", "ca"),
];

/// Country names that are easy to mix up.
#[rustfmt::skip]
const CONFUSABLE_NAMES: &[(&str, &str)] = &[
    ("at", "au"), ("sk", "si"), ("ne", "ng"),
    ("gn", "gw"), ("gn", "gq"), ("gn", "pg"), ("gw", "gq"),
    ("cg", "cd"), ("dm", "do"), ("ir", "iq"), ("is", "ie"),
    ("ml", "mw"), ("ml", "mt"), ("sd", "ss"), ("lv", "lt"),
    ("mr", "mu"),
];

/// Flags so recognisable that they make a question trivial.
const DISTINCTIVE_FLAGS: &[&str] = &[
    "np", "ch", "va", "ca", "jp", "br", "gb", "us", "kr", "za", "cy", "bt", "lb", "ki",
];

fn pair_listed(table: &[(&str, &str)], a: &CountryCode, b: &CountryCode) -> bool {
    let (a, b) = (a.as_str(), b.as_str());
    table
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// `true` if the two flags are commonly confused.
pub fn flags_confusable(a: &CountryCode, b: &CountryCode) -> bool {
    pair_listed(CONFUSABLE_FLAGS, a, b)
}

/// `true` if the two names are commonly confused.
pub fn names_confusable(a: &CountryCode, b: &CountryCode) -> bool {
    pair_listed(CONFUSABLE_NAMES, a, b)
}

/// `true` if the flag is distinctive enough to give the answer away.
pub fn is_distinctive(code: &CountryCode) -> bool {
    DISTINCTIVE_FLAGS.contains(&code.as_str())
}

/// Per-difficulty weights for scoring a decoy candidate.
///
/// Harder tiers push decoys toward the target's region and look-alike
/// flags, and use less randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWeights {
    /// Bonus when candidate and target share a region.
    pub same_region: u32,
    /// Bonus for a look-alike flag.
    pub confusable_flag: u32,
    /// Bonus for a look-alike name.
    pub confusable_name: u32,
    /// Penalty for a distinctive flag.
    pub distinctive_penalty: u32,
    /// Random jitter is drawn from `0..=jitter`.
    pub jitter: u32,
    /// Candidates scoring below this are dropped before sampling.
    pub threshold: u32,
}

impl TierWeights {
    /// Base score every candidate starts from.
    pub const BASE: u32 = 10;
    /// Lowest score a candidate can end up with.
    pub const FLOOR: u32 = 1;

    /// Weights for `difficulty`.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                same_region: 5,
                confusable_flag: 10,
                confusable_name: 5,
                distinctive_penalty: 30,
                jitter: 20,
                threshold: 1,
            },
            Difficulty::Medium => Self {
                same_region: 15,
                confusable_flag: 25,
                confusable_name: 10,
                distinctive_penalty: 30,
                jitter: 15,
                threshold: 10,
            },
            Difficulty::Hard => Self {
                same_region: 30,
                confusable_flag: 45,
                confusable_name: 15,
                distinctive_penalty: 15,
                jitter: 8,
                threshold: 25,
            },
            Difficulty::Expert => Self {
                same_region: 45,
                confusable_flag: 70,
                confusable_name: 20,
                distinctive_penalty: 15,
                jitter: 4,
                threshold: 40,
            },
        }
    }
}
