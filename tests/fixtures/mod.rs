//! Test fixtures shared by the integration tests

use glicko_engine::config::GlickoConfig;
use glicko_engine::rating::{InMemoryRatingStorage, Rating, RatingEntry, RatingStorage};

/// The player and opponents from the worked example in Glickman's Glicko-2 paper
pub struct PaperExample {
    pub config: GlickoConfig,
    pub player: Rating,
    pub opponents: [Rating; 3],
    pub scores: [f64; 3],
}

impl PaperExample {
    pub fn new() -> Self {
        let config = GlickoConfig::default();
        let rating = |r: f64, rd: f64| Rating::from_display(r, rd, 0.06, &config).unwrap();

        Self {
            player: rating(1500.0, 200.0),
            opponents: [rating(1400.0, 30.0), rating(1550.0, 100.0), rating(1700.0, 300.0)],
            scores: [1.0, 0.0, 0.0],
            config,
        }
    }
}

/// Storage preloaded with the paper's four players under ids p0 (subject) and p1..p3
pub fn paper_storage() -> InMemoryRatingStorage {
    let example = PaperExample::new();
    let storage = InMemoryRatingStorage::new();

    storage
        .store_rating(RatingEntry::new("p0".to_string(), example.player))
        .unwrap();
    for (i, opponent) in example.opponents.iter().enumerate() {
        storage
            .store_rating(RatingEntry::new(format!("p{}", i + 1), *opponent))
            .unwrap();
    }

    storage
}
