pub use siteperm_types::error::{Error, SpResult};
pub use siteperm_types::types::{SiteId, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
