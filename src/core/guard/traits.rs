/*!
 * Guard Traits
 *
 * Core abstractions for RAII lock guards
 */

use super::GuardMetadata;
use crate::core::errors::LockResult;

/// Core guard trait
///
/// All guards provide:
/// - Resource type identification
/// - Metadata access
/// - Manual release capability
pub trait Guard: Send {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if guard still holds its resource
    fn is_active(&self) -> bool;

    /// Manually release the resource
    ///
    /// A guard releases exactly once. Calling this again returns
    /// `LockError::DoubleRelease` and has no effect.
    fn release(&mut self) -> LockResult<()>;
}

/// Guards that can be dropped with custom cleanup
///
/// Separates Drop logic for better testability
pub trait GuardDrop: Guard {
    /// Perform cleanup on drop
    ///
    /// # Panics
    ///
    /// Should NOT panic. Log errors instead.
    fn on_drop(&mut self);
}
