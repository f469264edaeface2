//! Media module for derivative enrichment, selection and content sniffing.

pub mod enrich;
pub mod select;
pub mod sniff;

pub use enrich::enrich_photos;
pub use select::{is_original_like, select_best_derivative, SelectedDerivative};
pub use sniff::{detect_mime_type, extension_for_content, extension_for_mime};
