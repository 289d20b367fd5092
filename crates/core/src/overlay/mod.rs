//! Per-occurrence overrides: the read-side resolver and the write path.

pub mod resolver;
pub mod types;
pub mod writer;


pub use resolver::EditOverlayResolver;
pub use types::{ConfirmationChange, EditInput, EditRecord, InstallmentKey};
pub use writer::EditWriter;
