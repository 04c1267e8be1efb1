//! Page-lifetime installation of the client router.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::client::fetch::StackFetcher;
use crate::client::host::BrowserHost;
use crate::client::intercept::{intercept, ClickEvent};
use crate::client::navigator::{ClientRouter, NavigationOutcome};

/// Holds the one router of a page. Installing again returns the existing
/// router and leaves history untouched.
pub struct ClientRuntime<H, F> {
    router: OnceCell<Rc<ClientRouter<H, F>>>,
}

impl<H: BrowserHost, F: StackFetcher> ClientRuntime<H, F> {
    pub const fn new() -> Self {
        Self {
            router: OnceCell::new(),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.router.get().is_some()
    }

    pub fn router(&self) -> Option<Rc<ClientRouter<H, F>>> {
        self.router.get().cloned()
    }

    /// Create the router and snapshot the initial document, once.
    pub fn install(&self, host: H, fetcher: F) -> Rc<ClientRouter<H, F>> {
        if let Some(router) = self.router.get() {
            tracing::debug!("Client router already installed");
            return Rc::clone(router);
        }

        let router = Rc::new(ClientRouter::new(host, fetcher));
        router.record_initial_snapshot();
        let _ = self.router.set(Rc::clone(&router));
        router
    }

    /// Click handler. Returns `None` when the click was left to the browser
    /// (or nothing is installed); otherwise the caller has prevented the
    /// default action and receives the navigation result.
    pub async fn handle_click(&self, event: &ClickEvent) -> Option<NavigationOutcome> {
        let router = self.router()?;
        let (target, options) = intercept(event, &router.host().location())?;
        Some(router.navigate(&target, options).await)
    }

    /// Popstate handler.
    pub async fn handle_popstate(&self, state: Option<serde_json::Value>) -> Option<NavigationOutcome> {
        let router = self.router()?;
        Some(router.on_popstate(state).await)
    }
}

impl<H: BrowserHost, F: StackFetcher> Default for ClientRuntime<H, F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fetch::{FetchError, StackRequest};
    use crate::client::host::LiveBoundary;
    use crate::client::intercept::AnchorInfo;
    use crate::client::memory::MemoryHost;
    use crate::protocol::{FrameDescriptor, FrameId, StackPayload};
    use futures_util::future::{FutureExt, LocalBoxFuture};
    use url::Url;

    struct FixedFetcher(StackPayload);

    impl StackFetcher for FixedFetcher {
        fn fetch(&self, _request: StackRequest) -> LocalBoxFuture<'static, Result<StackPayload, FetchError>> {
            futures_util::future::ready(Ok(self.0.clone())).boxed_local()
        }
    }

    fn host() -> MemoryHost {
        MemoryHost::new(
            Url::parse("http://localhost/").unwrap(),
            vec![LiveBoundary::new(FrameId::route("/"), 0, "<h1>home</h1>")],
        )
    }

    fn shop() -> FixedFetcher {
        FixedFetcher(StackPayload {
            frames: vec![FrameDescriptor::fresh(FrameId::route("/shop"), 0, "<h1>shop</h1>".into())],
            route_path: "/shop".into(),
        })
    }

    #[test]
    fn test_install_once() {
        let runtime = ClientRuntime::new();
        assert!(!runtime.is_installed());

        let first = runtime.install(host(), shop());
        assert_eq!(first.host().history().len(), 1);
        assert!(first.host().history_state().is_some());

        let second = runtime.install(host(), shop());
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_click_routes_through_interceptor() {
        let runtime = ClientRuntime::new();
        assert!(runtime.handle_click(&ClickEvent::default()).await.is_none());

        let router = runtime.install(host(), shop());
        let click = ClickEvent::on(AnchorInfo {
            href: Some("/shop".into()),
            stack_link: true,
            ..AnchorInfo::default()
        });
        let outcome = runtime.handle_click(&click).await;
        assert_eq!(outcome, Some(NavigationOutcome::Applied));
        assert_eq!(router.host().boundaries()[0].id, FrameId::route("/shop"));

        let plain = ClickEvent::on(AnchorInfo {
            href: Some("/".into()),
            ..AnchorInfo::default()
        });
        assert!(runtime.handle_click(&plain).await.is_none());
    }
}
