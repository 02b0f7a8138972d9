//! Resource tag constants for provisioned client infrastructure
//!
//! Every taggable resource created by the provisioner carries these tags so
//! that resources can be correlated with a client and discovered for cleanup.
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `provisioner:environment` | Deployment environment (dev/prod) |
//! | `provisioner:client-id` | Client the resource belongs to |
//! | `provisioner:managed-by` | Static identifier ("provisioner") |
//! | `provisioner:created-at` | RFC 3339 creation timestamp |

use chrono::{DateTime, Utc};

/// Tag key for the deployment environment
pub const TAG_ENVIRONMENT: &str = "provisioner:environment";

/// Tag key for the owning client id
pub const TAG_CLIENT_ID: &str = "provisioner:client-id";

/// Tag key identifying the managing tool
pub const TAG_MANAGED_BY: &str = "provisioner:managed-by";

/// Tag value identifying the managing tool
pub const TAG_MANAGED_BY_VALUE: &str = "provisioner";

/// Tag key for the creation timestamp (RFC 3339)
pub const TAG_CREATED_AT: &str = "provisioner:created-at";

/// Build the standard tag set for a resource being created now.
pub fn standard_tags(environment: &str, client_id: &str) -> Vec<(String, String)> {
    vec![
        (TAG_ENVIRONMENT.to_string(), environment.to_string()),
        (TAG_CLIENT_ID.to_string(), client_id.to_string()),
        (
            TAG_MANAGED_BY.to_string(),
            TAG_MANAGED_BY_VALUE.to_string(),
        ),
        (TAG_CREATED_AT.to_string(), format_created_at(Utc::now())),
    ]
}

/// Format a creation timestamp for tags.
pub fn format_created_at(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Parse a creation timestamp from a tag value.
pub fn parse_created_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
