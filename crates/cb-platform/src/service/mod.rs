//! Service Layer
//!
//! Business logic behind the API: account provisioning from identity
//! events, workspace invitations, and publishing dispatch.

pub mod invitations;
pub mod provisioning;
pub mod publishing;

pub use invitations::InvitationService;
pub use provisioning::{ProvisionOutcome, ProvisioningService};
pub use publishing::PublishingService;
