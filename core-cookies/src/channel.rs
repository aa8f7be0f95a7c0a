//! Method channel binding for [`CookieManager`]
//!
//! Every failure becomes an in-band reply: `false` for writes and deletes,
//! an empty list for reads, [`MethodResponse::NotImplemented`] for unknown
//! methods. Only undecodable arguments produce an error envelope.

use async_trait::async_trait;
use bridge_traits::{MethodCall, MethodCallHandler, MethodResponse};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::arguments::{Arguments, DeleteCookieRequest, DeleteCookiesRequest, SetCookieRequest};
use crate::cookie::Cookie;
use crate::error::{CookieError, Result};
use crate::manager::CookieManager;

/// Methods understood on the cookie channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieMethod {
    SetCookie,
    GetCookies,
    GetAllCookies,
    DeleteCookie,
    DeleteCookies,
    DeleteAllCookies,
}

impl CookieMethod {
    pub const ALL: [CookieMethod; 6] = [
        Self::SetCookie,
        Self::GetCookies,
        Self::GetAllCookies,
        Self::DeleteCookie,
        Self::DeleteCookies,
        Self::DeleteAllCookies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetCookie => "setCookie",
            Self::GetCookies => "getCookies",
            Self::GetAllCookies => "getAllCookies",
            Self::DeleteCookie => "deleteCookie",
            Self::DeleteCookies => "deleteCookies",
            Self::DeleteAllCookies => "deleteAllCookies",
        }
    }
}

impl fmt::Display for CookieMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookieMethod {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| CookieError::UnsupportedMethod(s.to_string()))
    }
}

impl CookieManager {
    async fn dispatch(&self, method: CookieMethod, args: &Arguments<'_>) -> Result<MethodResponse> {
        let response = match method {
            CookieMethod::SetCookie => {
                let request = SetCookieRequest::decode(args)?;
                reply_bool(method, self.set_cookie(request).await)
            }
            CookieMethod::GetCookies => {
                let url = args.required_str("url")?;
                reply_list(method, self.get_cookies(&url).await)
            }
            CookieMethod::GetAllCookies => reply_list(method, self.get_all_cookies().await),
            CookieMethod::DeleteCookie => {
                let request = DeleteCookieRequest::decode(args)?;
                reply_bool(method, self.delete_cookie(request).await)
            }
            CookieMethod::DeleteCookies => {
                let request = DeleteCookiesRequest::decode(args)?;
                reply_bool(method, self.delete_cookies(request).await)
            }
            CookieMethod::DeleteAllCookies => reply_bool(method, self.delete_all_cookies().await),
        };
        Ok(response)
    }
}

fn reply_bool(method: CookieMethod, result: Result<()>) -> MethodResponse {
    match result {
        Ok(()) => MethodResponse::success(true),
        Err(e @ CookieError::NotFound { .. }) => {
            debug!(%method, error = %e, "Nothing to delete");
            MethodResponse::success(false)
        }
        Err(e) => {
            warn!(%method, code = e.code(), error = %e, "Cookie operation failed");
            MethodResponse::success(false)
        }
    }
}

fn reply_list(method: CookieMethod, result: Result<Vec<Cookie>>) -> MethodResponse {
    match result {
        Ok(cookies) => MethodResponse::success(cookies),
        Err(e) => {
            warn!(%method, code = e.code(), error = %e, "Cookie read failed");
            MethodResponse::success(Vec::<Cookie>::new())
        }
    }
}

#[async_trait]
impl MethodCallHandler for CookieManager {
    fn channel_name(&self) -> &str {
        self.channel()
    }

    async fn handle(&self, call: MethodCall) -> MethodResponse {
        let method = match call.method.parse::<CookieMethod>() {
            Ok(method) => method,
            Err(e) => {
                debug!(error = %e, "Unknown cookie method");
                return MethodResponse::NotImplemented;
            }
        };

        match self.dispatch(method, &Arguments::of(&call)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, error = %e, "Rejected cookie call");
                MethodResponse::error(e.code(), e.to_string())
            }
        }
    }

    async fn dispose(&self) {
        self.unbind().await;
    }
}
