//! Fluent document query builder.

use serde_json::Value;

use crate::codec::RequestOptions;
use crate::error::DoclifyError;
use crate::gateway::CachingGateway;
use crate::query::{Operator, OrderKey, Predicate, QueryParams, QuerySpec, SortDirection};

pub const SEARCH_ENDPOINT: &str = "documents/search";
pub const PAGINATED_ENDPOINT: &str = "documents/paginated";
pub const SINGLE_ENDPOINT: &str = "documents/single";

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Query over the documents of a repository.
///
/// Obtained from [`Client::documents`](crate::Client::documents). Mutators
/// consume and return the builder; terminal operations borrow it, so the same
/// query can be sent more than once.
///
/// ```rust,ignore
/// let page = client
///     .documents()
///     .content_type("article")
///     .is_in("data.tags", vec!["rust", "http"])
///     .include(["data.author"])
///     .order_by_desc("sys.publishedAt")
///     .paginate(2, 10)
///     .await?;
/// ```
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until fetch, paginate or first is awaited"]
pub struct Documents {
    gateway: CachingGateway,
    spec: QuerySpec,
}

impl Documents {
    pub(crate) fn new(gateway: CachingGateway) -> Self {
        Self {
            gateway,
            spec: QuerySpec::new(),
        }
    }

    /// Adds a `[field, operator, value]` predicate; `None` means [`Operator::Eq`].
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: impl Into<Option<Operator>>,
        value: impl Into<Value>,
    ) -> Self {
        let operator = operator.into().unwrap_or_default();
        self.spec
            .predicates
            .push(Predicate::new(field, operator, value));
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Eq, value)
    }

    pub fn not(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Not, value)
    }

    /// `in`: the field matches any of `values`.
    pub fn is_in(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.filter(field, Operator::In, values)
    }

    /// `nin`: the field matches none of `values`.
    pub fn not_in(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.filter(field, Operator::Nin, values)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Lte, value)
    }

    pub fn fulltext(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Fulltext, value)
    }

    /// `match` operator.
    pub fn matches(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::Match, value)
    }

    pub fn collection(self, value: impl Into<Value>) -> Self {
        self.eq("sys.collection", value)
    }

    pub fn content_type(self, value: impl Into<Value>) -> Self {
        self.eq("sys.contentType", value)
    }

    pub fn id(self, value: impl Into<Value>) -> Self {
        self.eq("sys.id", value)
    }

    pub fn uid(self, value: impl Into<Value>) -> Self {
        self.eq("sys.uid", value)
    }

    /// Appends related fields to resolve, in order. Duplicates are kept.
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.include.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn include_one(self, field: impl Into<String>) -> Self {
        self.include([field])
    }

    /// Appends fields to project, in order. Duplicates are kept.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn select_one(self, field: impl Into<String>) -> Self {
        self.select([field])
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.spec.order.push(OrderKey {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn order_by_asc(self, field: impl Into<String>) -> Self {
        self.order_by(field, SortDirection::Asc)
    }

    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, SortDirection::Desc)
    }

    /// Sets the content language.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.spec.lang = Some(lang.into());
        self
    }

    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Wire parameters for this query with `extras` merged last.
    #[must_use]
    pub fn compile(&self, extras: QueryParams) -> QueryParams {
        self.spec.compile(extras)
    }

    /// Up to `limit` matching documents (`None` means 20).
    ///
    /// # Errors
    /// See [`CachingGateway::request_with_cache`].
    pub async fn fetch(&self, limit: impl Into<Option<u32>>) -> Result<Value, DoclifyError> {
        let limit = limit.into().unwrap_or(DEFAULT_LIMIT);
        let extras = QueryParams::new().with("limit", limit.to_string());
        self.send(SEARCH_ENDPOINT, extras).await
    }

    /// One page of matching documents (`None` means page 1, 20 per page).
    ///
    /// # Errors
    /// See [`CachingGateway::request_with_cache`].
    pub async fn paginate(
        &self,
        page: impl Into<Option<u32>>,
        per_page: impl Into<Option<u32>>,
    ) -> Result<Value, DoclifyError> {
        let page = page.into().unwrap_or(DEFAULT_PAGE);
        let per_page = per_page.into().unwrap_or(DEFAULT_PER_PAGE);
        let extras = QueryParams::new()
            .with("page", page.to_string())
            .with("perPage", per_page.to_string());
        self.send(PAGINATED_ENDPOINT, extras).await
    }

    /// The first matching document.
    ///
    /// # Errors
    /// See [`CachingGateway::request_with_cache`].
    pub async fn first(&self) -> Result<Value, DoclifyError> {
        self.send(SINGLE_ENDPOINT, QueryParams::new()).await
    }

    async fn send(&self, endpoint: &str, extras: QueryParams) -> Result<Value, DoclifyError> {
        let options = RequestOptions::new().with_query(self.compile(extras));
        self.gateway.request_with_cache(endpoint, &options).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::gateway::RequestGateway;
    use crate::test_support::{CountingCache, MockTransport, test_codec};
    use serde_json::json;
    use std::sync::Arc;

    fn documents(transport: &Arc<MockTransport>) -> Documents {
        Documents::new(CachingGateway::new(RequestGateway::new(
            test_codec(),
            transport.clone(),
        )))
    }

    fn offline() -> Documents {
        documents(&Arc::new(MockTransport::json(&json!([]))))
    }

    #[test]
    fn test_two_and_three_argument_filters_are_equivalent() {
        let two = offline().filter("data.slug", None, "hello").compile(QueryParams::new());
        let three = offline()
            .filter("data.slug", Operator::Eq, "hello")
            .compile(QueryParams::new());
        let eq = offline().eq("data.slug", "hello").compile(QueryParams::new());

        assert_eq!(two, three);
        assert_eq!(two, eq);
        assert_eq!(two.get("q"), Some(r#"[["data.slug","eq","hello"]]"#));
    }

    #[test]
    fn test_operator_shorthands() {
        let params = offline()
            .not("a", 1)
            .is_in("b", json!([1, 2]))
            .not_in("c", json!(["x"]))
            .gt("d", 1)
            .gte("e", 2)
            .lt("f", 3)
            .lte("g", 4)
            .fulltext("h", "term")
            .matches("i", "^re")
            .compile(QueryParams::new());

        assert_eq!(
            params.get("q"),
            Some(
                r#"[["a","not",1],["b","in",[1,2]],["c","nin",["x"]],["d","gt",1],["e","gte",2],["f","lt",3],["g","lte",4],["h","fulltext","term"],["i","match","^re"]]"#
            )
        );
    }

    #[test]
    fn test_system_field_shorthands() {
        let params = offline()
            .collection("posts")
            .content_type("article")
            .id("abc")
            .uid("home")
            .compile(QueryParams::new());

        assert_eq!(
            params.get("q"),
            Some(
                r#"[["sys.collection","eq","posts"],["sys.contentType","eq","article"],["sys.id","eq","abc"],["sys.uid","eq","home"]]"#
            )
        );
    }

    #[test]
    fn test_include_and_select_accept_lists_and_single_fields() {
        let params = offline()
            .include(["data.author", "data.tags"])
            .include_one("data.author")
            .select(vec!["data.title".to_owned()])
            .select_one("sys.id")
            .compile(QueryParams::new());

        assert_eq!(
            params.get("include"),
            Some(r#"["data.author","data.tags","data.author"]"#)
        );
        assert_eq!(params.get("select"), Some(r#"["data.title","sys.id"]"#));
    }

    #[test]
    fn test_order_and_lang() {
        let params = offline()
            .order_by("title", SortDirection::default())
            .order_by_desc("sys.publishedAt")
            .order_by_asc("data.rank")
            .lang("nl")
            .compile(QueryParams::new());

        assert_eq!(
            params.get("order"),
            Some(r#"[["title","asc"],["sys.publishedAt","desc"],["data.rank","asc"]]"#)
        );
        assert_eq!(params.get("lang"), Some("nl"));
    }

    #[test]
    fn test_identical_builders_compile_identically() {
        let build = || {
            offline()
                .collection("posts")
                .gte("data.views", 100)
                .include(["data.author"])
                .order_by_asc("title")
                .lang("en")
        };
        assert_eq!(
            build().compile(QueryParams::new()).to_canonical_json(),
            build().compile(QueryParams::new()).to_canonical_json()
        );
    }

    #[test]
    fn test_predicate_order_is_preserved() {
        let ab = offline().eq("a", 1).eq("b", 2).compile(QueryParams::new());
        let ba = offline().eq("b", 2).eq("a", 1).compile(QueryParams::new());
        assert_ne!(ab, ba);
    }

    #[tokio::test]
    async fn test_fetch_search_scenario() {
        let transport = Arc::new(MockTransport::json(&json!([{"sys": {"id": "1"}}])));
        let result = documents(&transport)
            .eq("sys.collection", "posts")
            .order_by("title", SortDirection::Asc)
            .fetch(10)
            .await
            .unwrap();

        assert_eq!(result, json!([{"sys": {"id": "1"}}]));
        assert_eq!(
            transport.last_request().uri,
            "https://acme.cdn.doclify.io/api/v2/documents/search\
             ?q=%5B%5B%22sys.collection%22%2C%22eq%22%2C%22posts%22%5D%5D\
             &order=%5B%5B%22title%22%2C%22asc%22%5D%5D\
             &limit=10"
        );
    }

    #[tokio::test]
    async fn test_fetch_default_limit() {
        let transport = Arc::new(MockTransport::json(&json!([])));
        documents(&transport).fetch(None).await.unwrap();
        assert!(transport.last_request().uri.ends_with("?q=%5B%5D&limit=20"));
    }

    #[tokio::test]
    async fn test_paginate_endpoint_and_params() {
        let transport = Arc::new(MockTransport::json(&json!({"data": [], "total": 0})));
        let docs = documents(&transport).collection("posts");

        docs.paginate(None, None).await.unwrap();
        assert!(
            transport
                .last_request()
                .uri
                .contains("/documents/paginated?q=")
        );
        assert!(transport.last_request().uri.ends_with("&page=1&perPage=20"));

        docs.paginate(3, 5).await.unwrap();
        assert!(transport.last_request().uri.ends_with("&page=3&perPage=5"));
    }

    #[tokio::test]
    async fn test_first_sends_no_extras() {
        let transport = Arc::new(MockTransport::json(&json!({"sys": {"uid": "home"}})));
        documents(&transport).uid("home").first().await.unwrap();

        assert_eq!(
            transport.last_request().uri,
            "https://acme.cdn.doclify.io/api/v2/documents/single\
             ?q=%5B%5B%22sys.uid%22%2C%22eq%22%2C%22home%22%5D%5D"
        );
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_served_from_cache() {
        let transport = Arc::new(MockTransport::json(&json!([1, 2, 3])));
        let gateway = CachingGateway::new(RequestGateway::new(test_codec(), transport.clone()))
            .with_cache(Arc::new(CountingCache::default()), CacheConfig::default());
        let docs = Documents::new(gateway).collection("posts");

        let first = docs.fetch(5).await.unwrap();
        let second = docs.fetch(5).await.unwrap();
        let other = docs.fetch(6).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, other);
        assert_eq!(transport.calls(), 2);
    }
}
