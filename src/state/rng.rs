//! Wrapper around a random number generator.
//!
//! A generator only exists when the `random` feature is enabled. The session always
//! owns an `EngineRng` so that selection code can be written once: without the
//! feature the wrapper is empty and asking it for an index yields nothing, which
//! makes the random selection policy fall back to the first outcome.

pub use feature_wrapper::EngineRng;

#[cfg(not(feature = "random"))]
mod feature_wrapper {
    #[cfg(feature = "serde_support")]
    use serde::{Deserialize, Serialize};

    #[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
    #[derive(Clone, Debug, Default, PartialEq)]
    /// Random number generator for a [`Session`][crate::session::Session].
    ///
    /// If you are reading this text, the `random` feature is **not** currently
    /// enabled and this is an empty placeholder.
    pub struct EngineRng;

    impl EngineRng {
        /// Whether this build can generate random numbers.
        pub const ENABLED: bool = false;

        pub fn with_seed(_: u64) -> Self {
            EngineRng
        }

        /// Always `None` without the `random` feature.
        pub fn index(&mut self, _: usize) -> Option<usize> {
            None
        }
    }
}

#[cfg(feature = "random")]
mod feature_wrapper {
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[cfg(feature = "serde_support")]
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug)]
    #[cfg_attr(
        feature = "serde_support",
        derive(Deserialize, Serialize),
        serde(from = "RngState", into = "RngState")
    )]
    /// Random number generator for a [`Session`][crate::session::Session].
    ///
    /// `ChaCha8Rng` is seedable and exposes its word position, which is all that is
    /// needed to store and restore the generator along with a save.
    pub struct EngineRng {
        gen: ChaCha8Rng,
        seed: u64,
    }

    #[cfg(feature = "serde_support")]
    #[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
    /// Persisted form of the generator.
    ///
    /// The word position is a u128 which `serde` cannot represent everywhere, so it
    /// is stored as a u64.
    struct RngState {
        seed: u64,
        position: u64,
    }

    #[cfg(feature = "serde_support")]
    impl From<RngState> for EngineRng {
        fn from(state: RngState) -> Self {
            let mut rng = EngineRng::with_seed(state.seed);
            rng.gen.set_word_pos(state.position as u128);
            rng
        }
    }

    #[cfg(feature = "serde_support")]
    impl From<EngineRng> for RngState {
        fn from(rng: EngineRng) -> Self {
            RngState {
                seed: rng.seed,
                position: rng.gen.get_word_pos() as u64,
            }
        }
    }

    impl Default for EngineRng {
        fn default() -> Self {
            let seed = ChaCha8Rng::from_entropy().next_u64();
            EngineRng::with_seed(seed)
        }
    }

    impl PartialEq for EngineRng {
        fn eq(&self, other: &Self) -> bool {
            self.seed == other.seed && self.gen.get_word_pos() == other.gen.get_word_pos()
        }
    }

    impl EngineRng {
        /// Whether this build can generate random numbers.
        pub const ENABLED: bool = true;

        /// Initiate the generator with a seed.
        pub fn with_seed(seed: u64) -> Self {
            let mut gen = ChaCha8Rng::seed_from_u64(seed);

            // `get_word_pos()` will panic unless we set the stream to 0
            gen.set_word_pos(0);

            EngineRng { gen, seed }
        }

        /// Draw a uniformly distributed index in `[0, len)`, or `None` if `len` is 0.
        pub fn index(&mut self, len: usize) -> Option<usize> {
            if len == 0 {
                None
            } else {
                Some(self.gen.gen_range(0, len))
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn generators_with_equal_seeds_draw_equal_indices() {
            let mut first = EngineRng::with_seed(7);
            let mut second = EngineRng::with_seed(7);

            let draws = (0..20).map(|_| first.index(5)).collect::<Vec<_>>();
            let other = (0..20).map(|_| second.index(5)).collect::<Vec<_>>();

            assert_eq!(draws, other);
            assert!(draws.iter().all(|i| i.unwrap() < 5));
        }

        #[test]
        fn drawing_from_nothing_yields_none() {
            let mut rng = EngineRng::with_seed(7);
            assert_eq!(rng.index(0), None);
        }

        #[cfg(feature = "serde_support")]
        #[test]
        fn generator_serializes_with_seed_and_word_position() {
            use serde_test::{assert_tokens, Token};

            let mut rng = EngineRng::with_seed(30);

            let mut buffer = vec![0; 64];
            rng.gen.fill_bytes(&mut buffer);

            let position = rng.gen.get_word_pos() as u64;
            assert!(position > 0);

            assert_tokens(
                &rng,
                &[
                    Token::Struct {
                        name: "RngState",
                        len: 2,
                    },
                    Token::Str("seed"),
                    Token::U64(30),
                    Token::Str("position"),
                    Token::U64(position),
                    Token::StructEnd,
                ],
            );
        }

        #[cfg(feature = "serde_support")]
        #[test]
        fn restored_generator_continues_the_same_sequence() {
            let mut rng = EngineRng::with_seed(11);
            rng.index(10);

            let json = serde_json::to_string(&rng).unwrap();
            let mut restored: EngineRng = serde_json::from_str(&json).unwrap();

            let expected = (0..10).map(|_| rng.index(100)).collect::<Vec<_>>();
            let found = (0..10).map(|_| restored.index(100)).collect::<Vec<_>>();

            assert_eq!(expected, found);
        }
    }
}
