//! Demo data: random resident comments with plausible vote counts.

use anyhow::{bail, Result};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::common::AuthorId;
use crate::domains::comments::models::Comment;
use crate::domains::parcels::models::Parcel;

const PROGRESS_EVERY: usize = 50;

const TEMPLATES: &[&str] = &[
    "A small park with a few trees would make this block feel alive again.",
    "The kids on this street need a playground close by.",
    "A fenced dog run here would get a lot of use.",
    "Turn this lot into a community garden so neighbors can grow food together.",
    "A half-size basketball court would keep teenagers busy after school.",
    "We could use a community room for block meetings and events.",
    "A weekend farmers market would fit nicely on this corner.",
    "A corner cafe would give people somewhere to sit and talk.",
    "A food truck pad with some picnic tables would be great here.",
    "An outdoor fitness area with simple equipment would be perfect.",
    "A walking loop would encourage people to get outside more.",
    "Affordable housing is what this neighborhood needs most.",
    "Apartments over a few small shops would suit this street.",
    "Senior housing here would let older residents stay in the area.",
    "A small grocery store would save people a long bus ride.",
    "We need a pharmacy within walking distance.",
    "A laundromat would serve a lot of renters nearby.",
    "A gallery or mural wall would bring color to the block.",
    "An outdoor stage for local musicians would be fantastic.",
    "Better street lighting would make walking here at night feel safe.",
    "Parking is tight around here, a small lot would help local businesses.",
    "Public restrooms would help everyone who waits at the bus stop.",
    "A bike share station here would connect to the new bike lanes.",
    "Traffic speeds through this block, anything that slows cars down would help.",
    "This lot has been empty too long, anything positive would be welcome.",
];

const PREFIXES: &[&str] = &[
    "I think",
    "Honestly,",
    "In my opinion",
    "Maybe",
    "I really hope",
];

const SUFFIXES: &[&str] = &[
    "",
    " What do others think?",
    " Anyone else agree?",
    " Let's make it happen!",
];

/// One comment text built from a template, sometimes with a prefix
pub fn generate_comment(rng: &mut fastrand::Rng) -> String {
    let template = TEMPLATES[rng.usize(..TEMPLATES.len())];
    let suffix = SUFFIXES[rng.usize(..SUFFIXES.len())];

    if rng.bool() {
        let prefix = PREFIXES[rng.usize(..PREFIXES.len())];
        let mut chars = template.chars();
        let lowered = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} {}{}", prefix, lowered, suffix)
    } else {
        format!("{}{}", template, suffix)
    }
}

/// Mostly a handful of upvotes, occasionally many; downvotes stay below 70% of upvotes
pub fn random_votes(rng: &mut fastrand::Rng) -> (i32, i32) {
    let roll = rng.f64();
    let upvotes = if roll < 0.6 {
        rng.i32(0..6)
    } else if roll < 0.9 {
        rng.i32(5..20)
    } else {
        rng.i32(20..50)
    };
    let max_downvotes = (upvotes * 7 / 10).max(1);
    (upvotes, rng.i32(0..max_downvotes))
}

#[derive(Debug, Clone, Copy)]
pub struct SeedSettings {
    /// Exact number of comments; derived from the parcel count when unset
    pub comments: Option<usize>,
    /// Author ids are drawn from `1..=authors`
    pub authors: i64,
    pub seed: Option<u64>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            comments: None,
            authors: 25,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub parcels: usize,
    pub requested: usize,
    pub created: usize,
    pub failed: usize,
}

/// Scatter random comments over located parcels
///
/// Writes go straight to the table, so a running server's cached summaries
/// only notice through their fingerprint.
pub async fn seed_comments(settings: SeedSettings, pool: &PgPool) -> Result<SeedReport> {
    let parcels = Parcel::find_all_located(pool).await?;
    if parcels.is_empty() {
        bail!("No located parcels found; run import_parcels first");
    }

    let mut rng = match settings.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    // About three comments per parcel on 30-70% of parcels
    let requested = settings.comments.unwrap_or_else(|| {
        (parcels.len() as f64 * 3.0 * (0.3 + rng.f64() * 0.4)) as usize
    });
    let authors = settings.authors.max(1);

    let mut report = SeedReport {
        parcels: parcels.len(),
        requested,
        ..Default::default()
    };

    info!(parcels = report.parcels, requested, "Seeding comments");

    for _ in 0..requested {
        let parcel = &parcels[rng.usize(..parcels.len())];
        let author_id = AuthorId::from_i64(rng.i64(1..=authors));
        let content = generate_comment(&mut rng);
        let (upvotes, downvotes) = random_votes(&mut rng);

        match Comment::create_with_votes(parcel.id, author_id, &content, upvotes, downvotes, pool)
            .await
        {
            Ok(_) => {
                report.created += 1;
                if report.created % PROGRESS_EVERY == 0 {
                    info!(created = report.created, requested, "Seeding progress");
                }
            }
            Err(e) => {
                report.failed += 1;
                warn!(parcel_id = %parcel.id, error = %e, "Failed to insert seeded comment");
            }
        }
    }

    info!(
        created = report.created,
        failed = report.failed,
        "Comment seeding complete"
    );

    Ok(report)
}
