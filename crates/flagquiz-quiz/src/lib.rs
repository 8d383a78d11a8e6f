//! Question generation for Flagquiz.
//!
//! The server normally generates questions, but the same logic drives
//! solo play and lets tests build realistic rooms without one.
//!
//! ```
//! use std::collections::BTreeSet;
//! use flagquiz_protocol::Difficulty;
//! use flagquiz_quiz::DistractorSelector;
//!
//! let selector = DistractorSelector::default();
//! let question = selector
//!     .generate_question(Difficulty::Medium, &BTreeSet::new())
//!     .expect("fresh pool");
//! assert_eq!(question.options.len(), 4);
//! assert!(question.has_option(&question.target.code));
//! ```

mod countries;
mod error;
mod history;
mod selector;
mod similarity;

pub use countries::{Catalog, CatalogEntry};
pub use error::QuizError;
pub use history::{GameHistory, GameSummary, QuestionResult, SoloGame};
pub use selector::{DECOY_COUNT, DistractorSelector, GeneratedQuestion};
pub use similarity::{TierWeights, flags_confusable, is_distinctive, names_confusable};
