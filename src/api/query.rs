//! Query client - read-through cache and pessimistic mutations
//!
//! Reads look up the [`QueryCache`] first and only hit the network when the
//! entry is missing or stale. Mutations run against the server first; only
//! when the server confirms do they mark their invalidation set stale. A
//! failed mutation leaves the cache untouched.
//!
//! A 401 on any request ends the session: the API client clears the stored
//! credentials and this client drops the whole cache.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::envelope::{unwrap_item, unwrap_page, Page};
use crate::api::error::ApiError;
use crate::core::cache::{Filters, QueryCache, QueryKey};
use crate::core::entity::{Record, Relation, Resource};
use crate::core::invalidation::Mutation;
use crate::core::route::Route;

pub struct QueryClient {
    api: ApiClient,
    cache: QueryCache,
    per_page: u32,
    refresh: bool,
}

impl QueryClient {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            per_page: crate::core::config::DEFAULT_PER_PAGE,
            refresh: false,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Ignore cached entries and always fetch
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut ApiClient {
        &mut self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut QueryCache {
        &mut self.cache
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    /// Forced navigation recorded by a failed request
    pub fn take_redirect(&mut self) -> Option<Route> {
        self.api.take_redirect()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Raw JSON for `key`, from cache when fresh, otherwise from `path`
    pub fn fetch(
        &mut self,
        key: &QueryKey,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Value, ApiError> {
        if !self.refresh {
            if let Some(data) = self.cache.fresh(key)? {
                tracing::debug!(key = %key, "cache hit");
                return Ok(data);
            }
        }

        tracing::debug!(key = %key, path, "fetching");
        let result = self.api.get(path, query);
        let data = self.settle(result)?;
        self.cache.set(key, &data)?;
        Ok(data)
    }

    /// Single value read through the cache
    pub fn query<T: DeserializeOwned>(
        &mut self,
        key: &QueryKey,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let data = self.fetch(key, path, query)?;
        Ok(serde_json::from_value(unwrap_item(data)?)?)
    }

    fn page_query(&self, page: u32, filters: &Filters) -> Vec<(String, String)> {
        let mut query = filters.pairs();
        query.push(("page".to_string(), page.max(1).to_string()));
        query.push(("per_page".to_string(), self.per_page.to_string()));
        query
    }

    /// One page of a resource's list, keyed by `(resource, page, per_page, filters)`
    pub fn query_page<T: DeserializeOwned>(
        &mut self,
        resource: Resource,
        page: u32,
        filters: &Filters,
    ) -> Result<Page<T>, ApiError> {
        let key = QueryKey::list(resource, page.max(1), self.per_page, filters);
        let query = self.page_query(page, filters);
        let data = self.fetch(&key, resource.path(), &query)?;
        unwrap_page(data)?.decode()
    }

    /// Typed list read for a record type
    pub fn list<T: Record>(&mut self, page: u32, filters: &Filters) -> Result<Page<T>, ApiError> {
        self.query_page(T::RESOURCE, page, filters)
    }

    /// A single record; id 0 means "nothing selected" and issues no request
    pub fn query_detail<T: Record>(&mut self, id: u64) -> Result<Option<T>, ApiError> {
        if id == 0 {
            return Ok(None);
        }
        let key = QueryKey::detail(T::RESOURCE, id);
        let path = T::RESOURCE.item_path(id);
        self.query(&key, &path, &[]).map(Some)
    }

    /// Child collection under a parent record; parent 0 issues no request
    pub fn query_related<T: DeserializeOwned>(
        &mut self,
        relation: Relation,
        parent_id: u64,
        page: u32,
        filters: &Filters,
    ) -> Result<Page<T>, ApiError> {
        if parent_id == 0 {
            return Ok(Page::empty());
        }
        let key = QueryKey::related(relation, parent_id, page.max(1), self.per_page, filters);
        let query = self.page_query(page, filters);
        let data = self.fetch(&key, &relation.path(parent_id), &query)?;
        unwrap_page(data)?.decode()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Run a server write, then invalidate what it touched
    pub fn mutate<R, F>(&mut self, mutation: &Mutation, op: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut ApiClient) -> Result<R, ApiError>,
    {
        let result = op(&mut self.api);
        let output = self.settle(result)?;
        for prefix in mutation.invalidates() {
            self.cache.invalidate(&prefix)?;
        }
        Ok(output)
    }

    /// Store a value the client already holds (e.g. the user returned by login)
    pub fn seed<T: Serialize>(&mut self, key: &QueryKey, value: &T) -> Result<(), ApiError> {
        let data = serde_json::to_value(value)?;
        self.cache.set(key, &data)?;
        Ok(())
    }

    /// Drop every cached query
    pub fn reset(&mut self) -> Result<(), ApiError> {
        self.cache.clear()?;
        Ok(())
    }

    /// Apply session-wide consequences of a failed request
    fn settle<R>(&mut self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(ApiError::SessionExpired) = &result {
            self.cache.clear()?;
        }
        result
    }
}
