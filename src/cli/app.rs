//! Application root
//!
//! Owns the configuration, the query client (and through it the only cache)
//! and the navigator. Every command enters its route through [`App::enter`]
//! before issuing requests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::api::error::ApiError;
use crate::api::{ApiClient, QueryClient, ReqwestTransport};
use crate::cli::GlobalOpts;
use crate::core::cache::{CacheEvent, QueryCache, QueryKey};
use crate::core::route::{AuthState, Guard, Navigator, Route};
use crate::core::session::Session;
use crate::core::storage::FileStore;
use crate::core::Config;

pub struct App {
    pub config: Config,
    pub client: QueryClient,
    pub navigator: Navigator,
    quiet: bool,
}

impl App {
    /// Wire config, session file, cache database and HTTP transport together
    pub fn bootstrap(global: &GlobalOpts) -> Result<Self> {
        let mut config = Config::load();
        if let Some(url) = &global.api_url {
            config.set_api_url(url).into_diagnostic()?;
        }

        let store = FileStore::open(config.session_path().into_diagnostic()?).into_diagnostic()?;
        let cache = QueryCache::open_for(&config.cache_path().into_diagnostic()?, &config.api_url)
            .into_diagnostic()?
            .with_ttl(config.cache_ttl());
        let transport = ReqwestTransport::new(config.timeout_secs.map(Duration::from_secs))
            .map_err(|e| miette::miette!("cannot start HTTP client: {}", e))?;
        let api = ApiClient::new(&config.api_url, transport, Session::new(store))?;

        let client = QueryClient::new(api, cache)
            .with_per_page(global.per_page.unwrap_or(config.per_page))
            .with_refresh(global.refresh);

        tracing::debug!(api_url = %config.api_url, "client ready");
        Ok(Self {
            config,
            client,
            navigator: Navigator::default(),
            quiet: global.quiet || global.output.is_machine(),
        })
    }

    /// Assemble an app from parts (tests use an in-memory cache and a stub transport)
    pub fn from_parts(config: Config, client: QueryClient, quiet: bool) -> Self {
        Self {
            config,
            client,
            navigator: Navigator::default(),
            quiet,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Navigate to a command's route through the guard
    pub fn enter(&mut self, route: Route) -> Result<()> {
        let state = AuthState::of(self.client.api().session());
        match self.navigator.visit(route, state) {
            Guard::Proceed => Ok(()),
            Guard::Redirect { to: Route::Login, from } => Err(miette::miette!(
                code = "cdesk::auth::required",
                help = "run `cdesk login`, then retry",
                "{} requires a signed-in session (redirected to {})",
                from,
                Route::Login
            )),
            Guard::Redirect { to, from } => {
                if !self.quiet {
                    eprintln!(
                        "{} already signed in; {} redirects to {}",
                        style("→").dim(),
                        from,
                        style(to).cyan()
                    );
                }
                Err(miette::miette!(
                    code = "cdesk::auth::signed_in",
                    help = "run `cdesk logout` first",
                    "already signed in"
                ))
            }
        }
    }

    fn follow_redirect(&mut self) {
        if let Some(route) = self.client.take_redirect() {
            self.navigator.replace(route);
            tracing::info!(location = %route, "forced navigation");
            if !self.quiet {
                eprintln!("{} {}", style("→").dim(), style(route).yellow());
            }
        }
    }

    /// Surface an API result, following any forced navigation it caused
    pub fn finish<T>(&mut self, result: std::result::Result<T, ApiError>) -> Result<T> {
        self.follow_redirect();
        result.map_err(miette::Report::new)
    }

    /// Run a write and report the cache keys it invalidated
    pub fn observe<T, E>(
        &mut self,
        op: impl FnOnce(&mut QueryClient) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let subscription = self
            .client
            .cache_mut()
            .subscribe(QueryKey::root(), move |event| {
                if let CacheEvent::Invalidated { prefix, .. } = event {
                    sink.borrow_mut().push(prefix.to_string());
                }
            });

        let result = op(&mut self.client);
        self.client.cache_mut().unsubscribe(subscription);

        if !self.quiet {
            let keys = seen.borrow();
            if !keys.is_empty() {
                eprintln!(
                    "   {} {}",
                    style("invalidated:").dim(),
                    style(keys.join(", ")).dim()
                );
            }
        }
        self.follow_redirect();
        result
    }

    pub fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut QueryClient) -> std::result::Result<T, ApiError>,
    ) -> Result<T> {
        self.observe(op).map_err(miette::Report::new)
    }
}
