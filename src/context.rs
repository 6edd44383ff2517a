use std::convert::Infallible;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

pub const CLUSTER_ID_COOKIE: &str = "clusterId";
pub const REGION_COOKIE: &str = "region";

/// The cluster a request targets, taken from the `clusterId` and `region` cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterContext {
    pub cluster_id: Option<String>,
    pub region: Option<String>,
}

impl ClusterContext {
    pub fn new(cluster_id: Option<String>, region: Option<String>) -> Self {
        Self {
            cluster_id: cluster_id.filter(|v| !v.is_empty()),
            region: region.filter(|v| !v.is_empty()),
        }
    }

    pub fn from_cookies(jar: &CookieJar) -> Self {
        Self::new(
            jar.get(CLUSTER_ID_COOKIE).map(|c| c.value().to_string()),
            jar.get(REGION_COOKIE).map(|c| c.value().to_string()),
        )
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClusterContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_cookies(&jar))
    }
}
