//! Challenge items: what the respondent is asked.
//!
//! - [`pairing::Pairing`]: an unordered word pair with a justification
//! - [`item::ChallengeItem`]: tagged union over challenge kinds
//! - [`queue::ChallengeQueue`]: FIFO of items awaiting delivery

pub mod item;
pub mod pairing;
pub mod queue;

pub use item::{
    ChallengeItem, ChallengeKind, InferentialVocabularyChallenge, PhonemicChallenge,
    TripletChallenge,
};
pub use pairing::{PairKey, Pairing};
pub use queue::ChallengeQueue;
