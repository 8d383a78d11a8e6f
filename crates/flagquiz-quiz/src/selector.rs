//! Question generation: pick a target, then three plausible decoys.

use std::collections::BTreeSet;

use flagquiz_protocol::{Country, CountryCode, Difficulty, GameQuestion};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, trace};

use crate::countries::{Catalog, CatalogEntry};
use crate::similarity::{TierWeights, flags_confusable, is_distinctive, names_confusable};
use crate::QuizError;

/// Number of decoys per question.
pub const DECOY_COUNT: usize = GameQuestion::OPTION_COUNT - 1;

/// A target country and its four shuffled options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub target: Country,
    pub options: [Country; GameQuestion::OPTION_COUNT],
}

impl GeneratedQuestion {
    /// Wraps the question in its wire shape with a timing window.
    pub fn into_game_question(
        self,
        question_number: u32,
        start_time: u64,
        duration_secs: u32,
    ) -> GameQuestion {
        GameQuestion {
            question_number,
            country: self.target,
            options: self.options.into(),
            start_time,
            end_time: start_time + u64::from(duration_secs) * 1000,
        }
    }

    /// `true` if `code` is one of the options.
    pub fn has_option(&self, code: &CountryCode) -> bool {
        self.options.iter().any(|c| &c.code == code)
    }
}

/// Builds multiple-choice questions with similarity-weighted decoys.
#[derive(Debug, Clone)]
pub struct DistractorSelector {
    catalog: Catalog,
}

impl DistractorSelector {
    /// Creates a selector over `catalog`.
    ///
    /// Fails if any difficulty pool is too small to fill four options.
    pub fn new(catalog: Catalog) -> Result<Self, QuizError> {
        for difficulty in Difficulty::ALL {
            let size = catalog.pool_size(difficulty);
            if size < GameQuestion::OPTION_COUNT {
                return Err(QuizError::PoolTooSmall { difficulty, size });
            }
        }
        Ok(Self { catalog })
    }

    /// The catalog questions are drawn from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates a question using the thread-local RNG.
    ///
    /// Returns `None` once every country in the pool has been used as a
    /// target.
    pub fn generate_question(
        &self,
        difficulty: Difficulty,
        used: &BTreeSet<CountryCode>,
    ) -> Option<GeneratedQuestion> {
        self.generate_question_with(&mut rand::rng(), difficulty, used)
    }

    /// Generates a question with a caller-supplied RNG.
    pub fn generate_question_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        difficulty: Difficulty,
        used: &BTreeSet<CountryCode>,
    ) -> Option<GeneratedQuestion> {
        let pool: Vec<&CatalogEntry> = self.catalog.pool(difficulty).collect();
        let fresh: Vec<&CatalogEntry> = pool
            .iter()
            .copied()
            .filter(|e| !used.contains(&e.country.code))
            .collect();

        let Some(target) = fresh.choose(rng).copied() else {
            debug!(%difficulty, used = used.len(), "country pool exhausted");
            return None;
        };

        let decoys = self.pick_decoys(rng, difficulty, target, &pool);
        let [a, b, c] = decoys;
        let mut options = [
            target.country.clone(),
            a.country.clone(),
            b.country.clone(),
            c.country.clone(),
        ];
        options.shuffle(rng);

        trace!(%difficulty, target = %target.country.code, "question generated");
        Some(GeneratedQuestion {
            target: target.country.clone(),
            options,
        })
    }

    fn pick_decoys<'a, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        difficulty: Difficulty,
        target: &CatalogEntry,
        pool: &[&'a CatalogEntry],
    ) -> [&'a CatalogEntry; DECOY_COUNT] {
        let weights = TierWeights::for_difficulty(difficulty);
        let scored: Vec<(&CatalogEntry, u32)> = pool
            .iter()
            .copied()
            .filter(|e| e.country.code != target.country.code)
            .map(|e| (e, score(rng, &weights, target, e)))
            .collect();

        let filtered: Vec<(&CatalogEntry, u32)> = scored
            .iter()
            .copied()
            .filter(|&(_, s)| s >= weights.threshold)
            .collect();
        let mut candidates = if filtered.len() >= DECOY_COUNT {
            filtered
        } else {
            scored.clone()
        };

        let mut picked: Vec<&CatalogEntry> = Vec::with_capacity(DECOY_COUNT);
        while picked.len() < DECOY_COUNT && !candidates.is_empty() {
            let total: u64 = candidates.iter().map(|&(_, s)| u64::from(s)).sum();
            let mut roll = rng.random_range(0..total);
            let index = candidates
                .iter()
                .position(|&(_, s)| {
                    if roll < u64::from(s) {
                        true
                    } else {
                        roll -= u64::from(s);
                        false
                    }
                })
                .unwrap_or(candidates.len() - 1);
            picked.push(candidates.swap_remove(index).0);
        }

        if picked.len() < DECOY_COUNT {
            let mut rest: Vec<&CatalogEntry> = scored
                .iter()
                .map(|&(e, _)| e)
                .filter(|e| !picked.iter().any(|p| p.country.code == e.country.code))
                .collect();
            rest.shuffle(rng);
            picked.extend(rest.into_iter().take(DECOY_COUNT - picked.len()));
        }

        // `new` guarantees at least four countries per pool, so three
        // decoys are always available.
        [picked[0], picked[1], picked[2]]
    }
}

impl Default for DistractorSelector {
    fn default() -> Self {
        Self {
            catalog: Catalog::builtin(),
        }
    }
}

/// Similarity score of `candidate` as a decoy for `target`.
fn score<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &TierWeights,
    target: &CatalogEntry,
    candidate: &CatalogEntry,
) -> u32 {
    let mut score = TierWeights::BASE;
    if target.region().is_some() && target.region() == candidate.region() {
        score += weights.same_region;
    }
    if flags_confusable(&target.country.code, &candidate.country.code) {
        score += weights.confusable_flag;
    }
    if names_confusable(&target.country.code, &candidate.country.code) {
        score += weights.confusable_name;
    }
    score += rng.random_range(0..=weights.jitter);
    if is_distinctive(&candidate.country.code) {
        score = score.saturating_sub(weights.distinctive_penalty);
    }
    score.max(TierWeights::FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_protocol::Region;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(code: &str, region: Region, tier: Difficulty) -> CatalogEntry {
        CatalogEntry {
            country: Country {
                code: CountryCode::from(code),
                name: code.to_uppercase(),
                region: Some(region),
            },
            tier,
        }
    }

    #[test]
    fn test_rejects_tiny_catalog() {
        let catalog = Catalog::new(vec![
            entry("aa", Region::Europe, Difficulty::Easy),
            entry("bb", Region::Europe, Difficulty::Easy),
        ]);
        let err = DistractorSelector::new(catalog).unwrap_err();
        assert!(matches!(err, QuizError::PoolTooSmall { size: 2, .. }));
    }

    #[test]
    fn test_score_never_below_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        let weights = TierWeights::for_difficulty(Difficulty::Easy);
        let target = entry("ro", Region::Europe, Difficulty::Easy);
        let swiss = entry("ch", Region::Asia, Difficulty::Easy);
        for _ in 0..100 {
            assert!(score(&mut rng, &weights, &target, &swiss) >= TierWeights::FLOOR);
        }
    }

    #[test]
    fn test_confusable_scores_higher_without_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let weights = TierWeights {
            jitter: 0,
            ..TierWeights::for_difficulty(Difficulty::Hard)
        };
        let chad = entry("td", Region::Africa, Difficulty::Hard);
        let romania = entry("ro", Region::Europe, Difficulty::Medium);
        let kenya = entry("ke", Region::Africa, Difficulty::Medium);
        let peru = entry("pe", Region::SouthAmerica, Difficulty::Medium);
        let lookalike = score(&mut rng, &weights, &chad, &romania);
        let neighbour = score(&mut rng, &weights, &chad, &kenya);
        let unrelated = score(&mut rng, &weights, &chad, &peru);
        assert!(lookalike > neighbour);
        assert!(neighbour > unrelated);
    }

    #[test]
    fn test_minimal_pool_uses_every_country() {
        let catalog = Catalog::new(vec![
            entry("aa", Region::Europe, Difficulty::Easy),
            entry("bb", Region::Asia, Difficulty::Easy),
            entry("cc", Region::Africa, Difficulty::Easy),
            entry("dd", Region::Oceania, Difficulty::Easy),
        ]);
        let selector = DistractorSelector::new(catalog).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let q = selector
            .generate_question_with(&mut rng, Difficulty::Expert, &BTreeSet::new())
            .unwrap();
        let codes: BTreeSet<_> = q.options.iter().map(|c| c.code.as_str().to_owned()).collect();
        assert_eq!(codes.len(), 4);
    }
}
