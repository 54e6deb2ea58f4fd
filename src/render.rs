//! Copy-on-write renderers. Each takes a base image and a face list and
//! returns a new image; the base is never written to.

pub mod overlay;
pub mod redact;

pub use overlay::{OverlayStyle, REFERENCE_WIDTH, render_overlay};
pub use redact::{RedactionStyle, render_redacted};
