//! Form workflows: stock-in, stock-out and profile editing.

pub mod inbound;
pub mod outbound;
pub mod profile;

pub use inbound::{InboundDraft, InboundReceipt, StagedInbound};
pub use outbound::{selectable_notes, OutboundDraft, OutboundReceipt};
pub use profile::ProfileUpdate;
