pub use crate::error::{Error, SpResult};
pub use crate::types::{SiteId, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
