//! Brochure catalog: stored rows, the mapped domain model, and the read service.

pub mod domain;
pub mod record;
pub mod router;
pub mod service;

pub use domain::{
    Activity, Brochure, BrochureCategory, BrochureTags, ItineraryDay, PaymentTerms, Pricing,
    PricingTier,
};
pub use record::BrochureRow;
pub use router::brochure_router;
pub use service::{BrochureError, BrochureService, BrochureStore};
