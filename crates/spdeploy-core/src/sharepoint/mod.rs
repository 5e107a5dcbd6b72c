//! SharePoint REST and CSOM calls made by a deployment run.

pub mod digest;
pub mod metadata;
pub mod process_query;

pub use digest::fetch_digest;
pub use metadata::{fetch_file_info, fetch_site_id, fetch_web_and_list_id, request_json};
pub use process_query::{invoke_deploy, is_solution_deployed};

/// Site collection, web and app catalog list GUIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    pub site_id: String,
    pub web_id: String,
    pub list_id: String,
}

/// App catalog web and list GUIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAndList {
    pub web_id: String,
    pub list_id: String,
}

/// The package's list item and its `owshiddenversion` at lookup time.
///
/// Not re-checked before deploying; a concurrent upload makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub item_id: u64,
    pub hidden_version: u64,
}

pub fn contextinfo_url(site_url: &str) -> String {
    format!("{}/_api/contextinfo?$select=FormDigestValue", site_url)
}

pub fn site_id_url(site_url: &str) -> String {
    format!("{}/_api/site?$select=Id", site_url)
}

pub fn app_catalog_list_url(site_url: &str, site: &str) -> String {
    format!(
        "{}/_api/web/getList('/{}/appcatalog')?$select=Id,ParentWeb/Id&$expand=ParentWeb",
        site_url, site
    )
}

pub fn file_info_url(site_url: &str, filename: &str) -> String {
    format!(
        "{}/_api/web/GetFolderByServerRelativeUrl('AppCatalog')/Files('{}')?$expand=ListItemAllFields&$select=ListItemAllFields/Id,ListItemAllFields/owshiddenversion",
        site_url, filename
    )
}

pub fn process_query_url(site_url: &str) -> String {
    format!("{}/_vti_bin/client.svc/ProcessQuery", site_url)
}
