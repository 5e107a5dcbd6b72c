//! Site URL resolution.

use crate::config::{DeploymentConfig, SiteHost};

/// Base URL of the site that hosts the app catalog.
///
/// A hostname is used verbatim (the caller supplies the scheme); a tenant
/// expands to `https://{tenant}.sharepoint.com`. The result is not checked
/// for well-formedness.
pub fn resolve_site_url(config: &DeploymentConfig) -> String {
    site_url(config.host(), config.site())
}

pub fn site_url(host: &SiteHost, site: &str) -> String {
    match host {
        SiteHost::Hostname(hostname) => format!("{}/{}", hostname, site),
        SiteHost::Tenant(tenant) => format!("https://{}.sharepoint.com/{}", tenant, site),
    }
}
