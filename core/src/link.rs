//! Link resource: local link building and remote create/update.
//!
//! # Design
//! `build` never touches the network: it merges the filtered parameters into
//! the query of `https://{branch_domain}/a/{api_key}`. The link API is only
//! called by `create`/`update`, and the `*_safely` entry points reach for it
//! only when the local link would be longer than `LINK_LENGTH_LIMIT`.
//!
//! A non-2xx reply is reported to the optional `ErrorReporter` and mapped to
//! a fallback (`link_to_homepage` for `create`, `false` for `update`). Only
//! transport failures and undecodable 2xx bodies surface as `Err`.

use url::Url;

use crate::config::Config;
use crate::error::{ApiResponseError, BranchError};
use crate::http::{HttpClient, HttpResponse, Transport, UreqTransport};
use crate::query::{escape, to_query};
use crate::report::ErrorReporter;
use crate::types::{LinkParams, LinkRequest, LinkResponse};

/// Longest link, in characters, that `build` will return.
pub const LINK_LENGTH_LIMIT: usize = 2000;

const URL_RESOURCE: &str = "v1/url";

/// Outcome of building a link locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltLink {
    /// The link fits within the limit.
    Url(String),
    /// The link would be `length` characters long.
    TooLong { length: usize },
}

/// Outcome of `update_safely`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The parameters fit into a locally built link.
    Built(String),
    /// The existing link was updated through the API; `false` on a non-2xx reply.
    Updated(bool),
}

/// Builds, creates and updates deep links for one configuration.
pub struct LinkResource<T = UreqTransport> {
    config: Config,
    http: HttpClient<T>,
    reporter: Option<Box<dyn ErrorReporter>>,
}

impl LinkResource<UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> LinkResource<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        let http = HttpClient::new(&config.api_endpoint, transport);
        Self {
            config,
            http,
            reporter: None,
        }
    }

    /// Send every non-2xx API reply to `reporter`.
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply `f` to the configuration. The HTTP client keeps its connection
    /// but follows a changed `api_endpoint`.
    pub fn configure(&mut self, f: impl FnOnce(&mut Config)) {
        f(&mut self.config);
        self.http.set_base_url(&self.config.api_endpoint);
    }

    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    /// Build the link locally and report whether it fits the length limit.
    ///
    /// The host goes through `url::Url` parsing, so `branch_domain` is
    /// normalized: ASCII letters are lowercased and internationalized names
    /// become punycode (`Bücher.Example` yields `xn--bcher-kva.example`). The
    /// length check applies to the normalized link.
    pub fn compose(&self, params: &LinkParams) -> Result<BuiltLink, BranchError> {
        let domain = &self.config.branch_domain;
        let mut url = Url::parse(&format!("https://{domain}"))
            .map_err(|e| BranchError::InvalidDomain(format!("{domain}: {e}")))?;
        url.set_path(&format!("/a/{}", self.config.api_key));

        let query = to_query(&params.merged());
        if !query.is_empty() {
            url.set_query(Some(&query));
        }

        let link = String::from(url);
        let length = link.chars().count();
        if length > LINK_LENGTH_LIMIT {
            return Ok(BuiltLink::TooLong { length });
        }
        Ok(BuiltLink::Url(link))
    }

    /// Build the link locally, failing with `LinkLengthExceeded` when it is
    /// longer than `LINK_LENGTH_LIMIT`.
    pub fn build(&self, params: &LinkParams) -> Result<String, BranchError> {
        match self.compose(params)? {
            BuiltLink::Url(link) => {
                tracing::debug!(length = link.len(), "built link locally");
                Ok(link)
            }
            BuiltLink::TooLong { length } => Err(BranchError::LinkLengthExceeded {
                length,
                limit: LINK_LENGTH_LIMIT,
            }),
        }
    }

    /// Register a new link with the API and return its URL.
    ///
    /// On a non-2xx reply this returns `link_to_homepage`, which is `None`
    /// when no fallback is configured.
    pub fn create(&self, params: &LinkParams) -> Result<Option<String>, BranchError> {
        let body = self.encode_body(params)?;
        tracing::debug!(endpoint = self.http.base_url(), "creating link through the API");
        let response = self.http.post(URL_RESOURCE, Some(body))?;
        self.parse_create_response(response)
    }

    /// Replace the parameters of the existing link `url`.
    pub fn update(&self, url: &str, params: &LinkParams) -> Result<bool, BranchError> {
        let body = self.encode_body(params)?;
        let resource = format!("{URL_RESOURCE}?url={}", escape(url));
        tracing::debug!(endpoint = self.http.base_url(), url, "updating link through the API");
        let response = self.http.put(&resource, Some(body))?;
        Ok(self.parse_update_response(response))
    }

    /// Build locally when the link fits, otherwise create it through the API.
    pub fn create_safely(&self, params: &LinkParams) -> Result<Option<String>, BranchError> {
        match self.compose(params)? {
            BuiltLink::Url(link) => Ok(Some(link)),
            BuiltLink::TooLong { length } => {
                tracing::warn!(length, limit = LINK_LENGTH_LIMIT, "link too long, creating through the API");
                self.create(params)
            }
        }
    }

    /// Build locally when the link fits, otherwise update `url` through the API.
    pub fn update_safely(&self, url: &str, params: &LinkParams) -> Result<UpdateOutcome, BranchError> {
        match self.compose(params)? {
            BuiltLink::Url(link) => Ok(UpdateOutcome::Built(link)),
            BuiltLink::TooLong { length } => {
                tracing::warn!(length, limit = LINK_LENGTH_LIMIT, "link too long, updating through the API");
                self.update(url, params).map(UpdateOutcome::Updated)
            }
        }
    }

    /// The JSON body `create` and `update` send.
    pub fn request_body(&self, params: &LinkParams) -> LinkRequest {
        LinkRequest {
            branch_key: self.config.api_key.clone(),
            branch_secret: self.config.secret_key.clone(),
            analytics: params.filtered_analytics(),
            settings: params.filtered_settings(),
            data: params.data.clone(),
        }
    }

    pub fn parse_create_response(&self, response: HttpResponse) -> Result<Option<String>, BranchError> {
        if response.is_success() {
            let reply: LinkResponse = response.json_as()?;
            return Ok(reply.url);
        }
        self.report_failure(response);
        Ok(self.config.link_to_homepage.clone())
    }

    pub fn parse_update_response(&self, response: HttpResponse) -> bool {
        if response.is_success() {
            return true;
        }
        self.report_failure(response);
        false
    }

    fn encode_body(&self, params: &LinkParams) -> Result<String, BranchError> {
        serde_json::to_string(&self.request_body(params))
            .map_err(|e| BranchError::Serialization(e.to_string()))
    }

    fn report_failure(&self, response: HttpResponse) {
        let error = ApiResponseError {
            status: response.status,
            body: response.body,
        };
        tracing::warn!(status = error.status, "link API returned an error status");
        if let Some(reporter) = &self.reporter {
            reporter.report(&error);
        }
    }
}
