//! Script injection for the client application bundle.
//!
//! Appending is not idempotent: running the rewriter on its own output
//! appends the script a second time. The router only selects it once per
//! upstream response.

use bytes::Bytes;

use super::{BodyRewriter, RewriteError, Substitution};

/// Watches the DOM for the login form and, when it shows up, sends the
/// browser to the same URL on the upstream's own host.
///
/// Must be kept byte-for-byte; the upstream client app is matched against it.
pub const LOGIN_REDIRECT_SCRIPT: &str = r##"
(function() {
  var body = document.querySelector("body");
  var observer = new MutationObserver(function(mutations) {
    var login = document.querySelector("#notion-app main div.notion-login");
    if (login) {
      console.log("Login detected.");
      var url = new URL(location.href);
      url.host = "www.notion.so";
      location.replace(url.href);
    }
  });
  observer.observe(body, { childList: true, subtree: true });
})();
"##;

/// Appends [`LOGIN_REDIRECT_SCRIPT`] to `app*.js` bundles.
#[derive(Debug, Clone)]
pub struct AssetRewriter {
    host_substitution: Option<Substitution>,
}

impl AssetRewriter {
    pub fn new() -> Self {
        Self {
            host_substitution: None,
        }
    }

    /// Also rewrite `/{upstream_host}` to `/{public_domain}` inside the bundle
    /// before appending the script.
    pub fn with_host_substitution(mut self, upstream_host: &str, public_domain: &str) -> Self {
        self.host_substitution = Some(Substitution::new(
            format!("/{upstream_host}"),
            format!("/{public_domain}"),
        ));
        self
    }
}

impl Default for AssetRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyRewriter for AssetRewriter {
    fn name(&self) -> &'static str {
        "asset"
    }

    fn rewrite(&self, body: Bytes) -> Result<Bytes, RewriteError> {
        let mut text = String::from_utf8(body.to_vec())?;
        if let Some(rewritten) = self
            .host_substitution
            .as_ref()
            .and_then(|sub| sub.apply(&text))
        {
            text = rewritten;
        }
        text.push_str(LOGIN_REDIRECT_SCRIPT);
        Ok(Bytes::from(text))
    }
}
