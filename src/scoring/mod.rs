use crate::models::{Release, Variant};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;

/// Weights for the similarity factors. The experimental variant differs from
/// control only in how heavily a genre match counts.
pub const GENRE_WEIGHT_CONTROL: f64 = 40.0;
pub const GENRE_WEIGHT_EXPERIMENTAL: f64 = 60.0;
pub const ARTIST_WEIGHT: f64 = 30.0;
pub const ERA_WEIGHT: f64 = 15.0;
pub const ERA_WINDOW_YEARS: i32 = 10;
/// Upper bound (exclusive) of the experimental diversity jitter.
pub const JITTER_MAX: f64 = 5.0;

/// Weights for the personalization factors.
pub const WISHED_GENRE_WEIGHT: f64 = 50.0;
pub const WISHED_ARTIST_WEIGHT: f64 = 40.0;
pub const RECENCY_BONUS_MAX: f64 = 10.0;
pub const RECENCY_WINDOW_DAYS: i64 = 30;
pub const RECENCY_STEP_DAYS: i64 = 3;

/// Source of the experimental variant's random perturbation. Injected so the
/// pipeline stays testable; production uses [`ThreadJitter`], tests pin the
/// value with [`FixedJitter`].
pub trait Jitter: Send + Sync {
    /// Returns a value in `[0, JITTER_MAX)`.
    fn sample(&self) -> f64;
}

#[derive(Debug, Default)]
pub struct ThreadJitter;

impl Jitter for ThreadJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..JITTER_MAX)
    }
}

#[derive(Debug)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

impl Variant {
    pub fn genre_weight(&self) -> f64 {
        match self {
            Variant::Control => GENRE_WEIGHT_CONTROL,
            Variant::Experimental => GENRE_WEIGHT_EXPERIMENTAL,
        }
    }

    pub fn has_jitter(&self) -> bool {
        matches!(self, Variant::Experimental)
    }
}

/// Point-additive similarity between a candidate release and the reference.
///
/// Missing genre/artist/year on either side contributes nothing for that
/// factor. Control is fully deterministic; experimental adds jitter in
/// `[0, JITTER_MAX)` for result diversity, so its output is only testable as
/// an envelope.
pub fn score_similarity(
    reference: &Release,
    candidate: &Release,
    variant: Variant,
    jitter: &dyn Jitter,
) -> f64 {
    let mut score = 0.0;

    if let (Some(ref_genre), Some(cand_genre)) = (&reference.genre, &candidate.genre) {
        if ref_genre == cand_genre {
            score += variant.genre_weight();
        }
    }

    if let (Some(ref_artist), Some(cand_artist)) = (&reference.artist, &candidate.artist) {
        if ref_artist == cand_artist {
            score += ARTIST_WEIGHT;
        }
    }

    if let (Some(ref_year), Some(cand_year)) = (reference.release_year, candidate.release_year) {
        if (ref_year - cand_year).abs() <= ERA_WINDOW_YEARS {
            score += ERA_WEIGHT;
        }
    }

    if variant.has_jitter() {
        score += jitter.sample();
    }

    score
}

/// Wishlist-driven score: genre/artist membership in the buyer's taste sets
/// plus a decaying bonus for recently created releases.
///
/// The recency bonus is `max(10 - floor(days_old / 3), 0)`, stepping down
/// every 3 days and reaching 0 at day 30. Releases without a creation
/// timestamp get no bonus.
pub fn score_personalization(
    release: &Release,
    wished_genres: &HashSet<String>,
    wished_artists: &HashSet<String>,
    now: DateTime<Utc>,
) -> f64 {
    let mut score = 0.0;

    if let Some(genre) = &release.genre {
        if wished_genres.contains(genre) {
            score += WISHED_GENRE_WEIGHT;
        }
    }

    if let Some(artist) = &release.artist {
        if wished_artists.contains(artist) {
            score += WISHED_ARTIST_WEIGHT;
        }
    }

    score += recency_bonus(release.created_at, now);

    score
}

fn recency_bonus(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return 0.0;
    };

    let days_old = (now - created_at).num_days();
    if days_old < 0 || days_old >= RECENCY_WINDOW_DAYS {
        return 0.0;
    }

    (RECENCY_BONUS_MAX - (days_old / RECENCY_STEP_DAYS) as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn jazz_reference() -> Release {
        Release::new(Uuid::new_v4(), "Kind of Blue")
            .with_genre("Jazz")
            .with_artist("Miles Davis")
            .with_year(1959)
    }

    #[test]
    fn test_control_scoring_is_deterministic() {
        let reference = jazz_reference();
        let candidate = Release::new(Uuid::new_v4(), "Maiden Voyage")
            .with_genre("Jazz")
            .with_artist("Unknown")
            .with_year(1965);

        for _ in 0..20 {
            let score = score_similarity(&reference, &candidate, Variant::Control, &ThreadJitter);
            assert_eq!(score, GENRE_WEIGHT_CONTROL + ERA_WEIGHT); // 55, exactly
        }
    }

    #[test]
    fn test_experimental_jitter_envelope() {
        let reference = jazz_reference();
        let candidate = Release::new(Uuid::new_v4(), "Maiden Voyage")
            .with_genre("Jazz")
            .with_artist("Unknown")
            .with_year(1965);

        let base = GENRE_WEIGHT_EXPERIMENTAL + ERA_WEIGHT;
        for _ in 0..50 {
            let score =
                score_similarity(&reference, &candidate, Variant::Experimental, &ThreadJitter);
            assert!(score >= base && score < base + JITTER_MAX, "score {score} outside envelope");
        }

        // Pinned jitter hits the envelope boundaries exactly.
        let low = score_similarity(&reference, &candidate, Variant::Experimental, &FixedJitter(0.0));
        assert_eq!(low, base);
        let high =
            score_similarity(&reference, &candidate, Variant::Experimental, &FixedJitter(4.999));
        assert!(high < base + JITTER_MAX);
    }

    #[test]
    fn test_artist_match_adds_thirty_for_all_variants() {
        let reference = jazz_reference();
        // 1970 is 11 years out from 1959, past the era window: artist only.
        let candidate = Release::new(Uuid::new_v4(), "Bitches Brew")
            .with_genre("Fusion")
            .with_artist("Miles Davis")
            .with_year(1970);

        let control = score_similarity(&reference, &candidate, Variant::Control, &ThreadJitter);
        assert_eq!(control, ARTIST_WEIGHT);

        let experimental =
            score_similarity(&reference, &candidate, Variant::Experimental, &FixedJitter(0.0));
        assert_eq!(experimental, ARTIST_WEIGHT);

        let in_era = Release::new(Uuid::new_v4(), "Sketches of Spain")
            .with_genre("Third Stream")
            .with_artist("Miles Davis")
            .with_year(1960);
        let with_era = score_similarity(&reference, &in_era, Variant::Control, &ThreadJitter);
        assert_eq!(with_era, ARTIST_WEIGHT + ERA_WEIGHT);
    }

    #[test]
    fn test_era_window_boundary() {
        let reference = jazz_reference();
        let inside = Release::new(Uuid::new_v4(), "A").with_year(1969);
        let outside = Release::new(Uuid::new_v4(), "B").with_year(1970);

        assert_eq!(
            score_similarity(&reference, &inside, Variant::Control, &ThreadJitter),
            ERA_WEIGHT
        );
        assert_eq!(
            score_similarity(&reference, &outside, Variant::Control, &ThreadJitter),
            0.0
        );
    }

    #[test]
    fn test_missing_fields_contribute_zero() {
        let reference = Release::new(Uuid::new_v4(), "Untitled");
        let candidate = jazz_reference();

        assert_eq!(
            score_similarity(&reference, &candidate, Variant::Control, &ThreadJitter),
            0.0
        );
        assert_eq!(
            score_similarity(&candidate, &reference, Variant::Control, &ThreadJitter),
            0.0
        );
    }

    #[test]
    fn test_max_deterministic_scores() {
        let reference = jazz_reference();
        let twin = jazz_reference();

        let control = score_similarity(&reference, &twin, Variant::Control, &ThreadJitter);
        assert_eq!(control, 85.0);

        let experimental =
            score_similarity(&reference, &twin, Variant::Experimental, &FixedJitter(0.0));
        assert_eq!(experimental, 105.0);
    }

    #[test]
    fn test_personalization_membership_weights() {
        let genres: HashSet<String> = ["Jazz".to_string()].into();
        let artists: HashSet<String> = ["Miles Davis".to_string()].into();
        let now = Utc::now();

        let both = jazz_reference();
        assert_eq!(
            score_personalization(&both, &genres, &artists, now),
            WISHED_GENRE_WEIGHT + WISHED_ARTIST_WEIGHT
        );

        let genre_only = Release::new(Uuid::new_v4(), "X").with_genre("Jazz");
        assert_eq!(
            score_personalization(&genre_only, &genres, &artists, now),
            WISHED_GENRE_WEIGHT
        );

        let neither = Release::new(Uuid::new_v4(), "Y").with_genre("Polka");
        assert_eq!(score_personalization(&neither, &genres, &artists, now), 0.0);
    }

    #[test]
    fn test_recency_bonus_decays_in_three_day_steps() {
        let now = Utc::now();
        let empty = HashSet::new();
        let at_age = |days: i64| {
            let release = Release::new(Uuid::new_v4(), "Fresh")
                .with_created_at(now - Duration::days(days));
            score_personalization(&release, &empty, &empty, now)
        };

        assert_eq!(at_age(0), 10.0);
        assert_eq!(at_age(2), 10.0);
        assert_eq!(at_age(3), 9.0);
        assert_eq!(at_age(15), 5.0);
        assert_eq!(at_age(29), 1.0);
        assert_eq!(at_age(30), 0.0);
        assert_eq!(at_age(45), 0.0);
    }

    #[test]
    fn test_no_created_at_means_no_bonus() {
        let empty = HashSet::new();
        let release = Release::new(Uuid::new_v4(), "Undated");
        assert_eq!(score_personalization(&release, &empty, &empty, Utc::now()), 0.0);
    }
}
