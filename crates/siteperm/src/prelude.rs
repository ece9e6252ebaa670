pub use siteperm_types::prelude::*;

// vim: ts=4
