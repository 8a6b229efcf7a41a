mod seeded_random;

pub use seeded_random::SeededRandom;
