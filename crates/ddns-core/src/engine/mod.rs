//! Core DDNS engine
//!
//! The DdnsEngine handles one update request from start to finish:
//! - Resolving the caller IP via IpResolver
//! - Validating the request and the domain's configuration
//! - Dispatching to the configured DnsProvider
//! - Creating or updating the domain's A record
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ HTTP handler │─── UpdateRequest ───┐
//! └──────────────┘                     │
//!                                      ▼
//!                             ┌──────────────┐
//!                             │  DdnsEngine  │
//!                             └──────────────┘
//!                                      │
//!         ┌──────────────────┬─────────┴────────┬──────────────────┐
//!         ▼                  ▼                  ▼                  ▼
//! ┌──────────────┐  ┌────────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  IpResolver  │  │ ConfigResolver │  │   Registry   │  │ DnsProvider  │
//! │  (caller IP) │  │ (domain entry) │  │  (by name)   │  │ (list/write) │
//! └──────────────┘  └────────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! ## Request Flow
//!
//! 1. Resolve the caller IP
//! 2. Validate token and domain, split the domain
//! 3. Look up and validate the domain's configuration, check the token
//! 4. List the domain's A records
//! 5. Add a record, update the first record, or do nothing
//!
//! Every rejection short-circuits with a status and is logged at error level.
//! Vendor and transport failures always end in [`RejectStatus::InternalError`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::DomainConfig;
use crate::domain::SplitDomain;
use crate::registry::ProviderRegistry;
use crate::resolver::DomainConfigResolver;
use crate::traits::{DnsProvider, IpResolver, Record, RecordRequest, RequestPeer};

/// Longest accepted domain name
pub const MAX_DOMAIN_LEN: usize = 100;

/// Longest accepted access token
pub const MAX_TOKEN_LEN: usize = 32;

/// An update request as received by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Domain from the path
    pub domain: Option<String>,
    /// Access token from the query string
    pub token: Option<String>,
    /// What is known about the caller
    pub peer: RequestPeer,
    /// Request path, for log messages; keep the token out of it
    pub url: String,
}

impl UpdateRequest {
    /// Create a request
    pub fn new(
        domain: impl Into<String>,
        token: impl Into<String>,
        peer: RequestPeer,
    ) -> Self {
        let domain = domain.into();
        Self {
            url: format!("/domains/{}", domain),
            domain: Some(domain),
            token: Some(token.into()),
            peer,
        }
    }

    /// Set the URL used in log messages
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Result of a successful update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record already had the caller's IP (no-op)
    Unchanged {
        /// The current IP address
        ip: String,
    },
    /// No record existed; one was created
    Created {
        /// The created IP address
        ip: String,
    },
    /// The existing record was pointed at the caller's IP
    Updated {
        /// Provider id of the updated record
        record_id: String,
        /// The previous value
        previous: String,
        /// The new IP address
        ip: String,
    },
}

/// Status class of a rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectStatus {
    /// Malformed or missing input
    BadRequest,
    /// Missing or wrong token, unknown domain
    Forbidden,
    /// Incomplete configuration, unresolved IP, provider failure
    InternalError,
}

impl RejectStatus {
    /// HTTP status code of this class
    pub fn status_code(&self) -> u16 {
        match self {
            RejectStatus::BadRequest => 400,
            RejectStatus::Forbidden => 403,
            RejectStatus::InternalError => 500,
        }
    }
}

impl std::fmt::Display for RejectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// A rejected update request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {reason}")]
pub struct Rejection {
    /// Status class
    pub status: RejectStatus,
    /// What went wrong
    pub reason: String,
}

impl Rejection {
    fn new(status: RejectStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    /// HTTP status code of the rejection
    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }
}

/// Core DDNS engine
///
/// One engine serves all requests; it holds no per-request state.
///
/// ## Lifecycle
///
/// 1. Register providers in a [`ProviderRegistry`]
/// 2. Create with [`DdnsEngine::new()`]
/// 3. Call [`DdnsEngine::handle()`] for each request, concurrently if needed
pub struct DdnsEngine {
    /// Source of the caller IP
    ip_resolver: Arc<dyn IpResolver>,

    /// Domain configuration lookup
    config_resolver: DomainConfigResolver,

    /// Provider factories by name
    registry: Arc<ProviderRegistry>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    pub fn new(
        ip_resolver: Arc<dyn IpResolver>,
        config_resolver: DomainConfigResolver,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            ip_resolver,
            config_resolver,
            registry,
        }
    }

    /// Handle one update request
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: the record matches the caller IP now
    /// - `Err(Rejection)`: the request was refused or failed
    pub async fn handle(&self, request: &UpdateRequest) -> Result<UpdateOutcome, Rejection> {
        let url = request.url.as_str();

        let ip = match self.ip_resolver.resolve(&request.peer).await {
            Ok(ip) if !ip.trim().is_empty() => ip,
            Ok(_) => return Err(reject(url, RejectStatus::InternalError, "IP is null or empty")),
            Err(e) => {
                return Err(reject(
                    url,
                    RejectStatus::InternalError,
                    format!("IP could not be resolved via {}: {}", self.ip_resolver.name(), e),
                ));
            }
        };
        debug!("{}, caller IP is {}", url, ip);

        let token = match request.token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(reject(url, RejectStatus::Forbidden, "access token not found")),
        };
        if token.chars().count() > MAX_TOKEN_LEN {
            return Err(reject(url, RejectStatus::BadRequest, "access token is too long"));
        }

        let domain = match request.domain.as_deref() {
            Some(domain) if !domain.trim().is_empty() => domain,
            _ => return Err(reject(url, RejectStatus::BadRequest, "domain not found")),
        };
        if domain.chars().count() > MAX_DOMAIN_LEN {
            return Err(reject(url, RejectStatus::BadRequest, "domain is too long"));
        }

        let split = SplitDomain::parse(domain)
            .map_err(|_| reject(url, RejectStatus::BadRequest, "domain is invalid"))?;

        let config = self
            .config_resolver
            .resolve(domain)
            .await
            .ok_or_else(|| reject(url, RejectStatus::Forbidden, "domain not exists"))?;

        if let Some(field) = config.missing_field() {
            return Err(reject(
                url,
                RejectStatus::InternalError,
                format!("domain {} is missing {}", domain, field),
            ));
        }

        if config.access_token != token {
            return Err(reject(url, RejectStatus::Forbidden, "access token is invalid"));
        }

        let provider = self.registry.create_provider(&config.provider).map_err(|e| {
            reject(
                url,
                RejectStatus::InternalError,
                format!("dns provider '{}' unavailable: {}", config.provider, e),
            )
        })?;

        let records = provider
            .list_records(&config, domain, RecordRequest::A)
            .await
            .map_err(|e| {
                reject(
                    url,
                    RejectStatus::InternalError,
                    format!("request records failed: {}", e),
                )
            })?;

        self.sync_record(provider.as_ref(), &config, &split, records.first(), ip, url)
            .await
    }

    /// Bring the domain's A record in line with the caller IP
    async fn sync_record(
        &self,
        provider: &dyn DnsProvider,
        config: &DomainConfig,
        split: &SplitDomain,
        existing: Option<&Record>,
        ip: String,
        url: &str,
    ) -> Result<UpdateOutcome, Rejection> {
        let request = RecordRequest::a_record(&split.rr, &ip);

        match existing {
            None => {
                let added = provider.add_record(config, &request, &split.domain).await;
                match added {
                    Ok(true) => {
                        info!("{}, add record {} -> {} success", url, split, ip);
                        Ok(UpdateOutcome::Created { ip })
                    }
                    Ok(false) => Err(reject(url, RejectStatus::InternalError, "add record failed")),
                    Err(e) => Err(reject(
                        url,
                        RejectStatus::InternalError,
                        format!("add record failed: {}", e),
                    )),
                }
            }
            Some(record) if record.value == ip => {
                info!("{}, there is nothing to change ({} is {})", url, split, ip);
                Ok(UpdateOutcome::Unchanged { ip })
            }
            Some(record) => {
                let updated = provider.update_record(config, &request, &record.id).await;
                match updated {
                    Ok(true) => {
                        info!(
                            "{}, update record {} {} -> {} success",
                            url, split, record.value, ip
                        );
                        Ok(UpdateOutcome::Updated {
                            record_id: record.id.clone(),
                            previous: record.value.clone(),
                            ip,
                        })
                    }
                    Ok(false) => Err(reject(
                        url,
                        RejectStatus::InternalError,
                        "update record failed",
                    )),
                    Err(e) => Err(reject(
                        url,
                        RejectStatus::InternalError,
                        format!("update record failed: {}", e),
                    )),
                }
            }
        }
    }
}

/// Log and build a rejection
fn reject(url: &str, status: RejectStatus, reason: impl Into<String>) -> Rejection {
    let rejection = Rejection::new(status, reason);
    error!("{}, {}", url, rejection.reason);
    rejection
}
