//! API endpoint URL builders
//!
//! Datastore methods are addressed as `{server}/api/{method}`.

/// Method name for storing a batch of items
pub const BULK_PUT_METHOD: &str = "apps.datastore.bulkPut";

/// Method name for reading one page of items
pub const QUERY_METHOD: &str = "apps.datastore.query";

pub const PUT_METHOD: &str = "apps.datastore.put";
pub const UPDATE_METHOD: &str = "apps.datastore.update";
pub const GET_METHOD: &str = "apps.datastore.get";
pub const DELETE_METHOD: &str = "apps.datastore.delete";
pub const BULK_GET_METHOD: &str = "apps.datastore.bulkGet";
pub const BULK_DELETE_METHOD: &str = "apps.datastore.bulkDelete";
pub const COUNT_METHOD: &str = "apps.datastore.count";

/// Build the URL for an API method
pub fn method_url(base_url: &str, method: &str) -> String {
    format!("{}/api/{}", base_url.trim_end_matches('/'), method)
}

/// Build bulk-put endpoint URL
pub fn bulk_put_url(base_url: &str) -> String {
    method_url(base_url, BULK_PUT_METHOD)
}

/// Build query endpoint URL
pub fn query_url(base_url: &str) -> String {
    method_url(base_url, QUERY_METHOD)
}
