pub mod catalog;
pub mod ledger;
pub mod predictor;
pub mod queries;
pub mod radio;
pub mod similarity;
pub mod suggester;

pub use catalog::{Catalog, SongCatalog};
pub use ledger::{RatingLedger, RatingSource};
pub use predictor::{Prediction, PredictionBasis, Predictor};
pub use radio::Radio;
pub use similarity::{Similarity, SimilarityEngine};
pub use suggester::{SuggestBudget, Suggester, Suggestion};
