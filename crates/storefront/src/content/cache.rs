//! Cache value types for the CMS response cache.

use super::types::{Program, ProgramSummary, SessionOffering, StoreItem};

/// Values stored in the content cache.
///
/// Detail documents are boxed to keep the enum small.
#[derive(Clone)]
pub enum CacheValue {
    Programs(Vec<ProgramSummary>),
    Program(Box<Program>),
    Sessions(Vec<SessionOffering>),
    StoreItems(Vec<StoreItem>),
    StoreItem(Box<StoreItem>),
}
