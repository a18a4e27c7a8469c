pub mod draft;
pub mod record;
pub mod request;

pub use draft::{
    DEFAULT_DRAFT_UNITS, DraftRecommendation, DraftSource, HEURISTIC_CONFIDENCE, ModelDraft,
    PricedRecommendation, SizingBasis,
};
pub use record::{
    AiRecommendation, AiRecommendationStatus, LegacyRecommendation, LegacyStatus,
    RecommendationListing, ResolvedRecommendation, StoredRecommendation, is_uuid_like,
};
pub use request::{MIN_STOP_LOSS_PIPS, RecommendationRequest, RiskLevel, check_units};
