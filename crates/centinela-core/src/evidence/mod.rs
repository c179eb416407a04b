//! Evidence form state: the closed set of evidence flags plus the selected
//! role and product type.

mod form;
mod model;

pub use form::EvidenceForm;
pub use model::{EvidenceKey, EvidenceSet};
