//! Domain types and flows for the bookkeeping portal.
//!
//! Purpose: model what the portal shows and how visitors move through it,
//! independent of actix or the HTTP client used to reach the backend.
//!
//! Public surface:
//! - Error / ErrorCode: the portal's own error payload.
//! - SessionToken / CachedUser: what the visitor's session holds.
//! - RoutePolicy / GateDecision: which paths need a session.
//! - Client, Task, AuditLog and friends: lenient backend payloads.
//! - LoginService / PortalService: the flows the HTTP adapter drives.
//! - ports: traits implemented by outbound adapters.

pub mod audit;
pub mod auth;
pub mod client_detail;
pub mod clients;
pub mod error;
pub mod login;
pub mod ports;
pub mod record_id;
pub mod route_policy;
pub mod service;
pub mod session;
pub mod tasks;
pub mod trace_id;
pub mod view_state;

pub use self::audit::{ActionTone, AuditLog, AuditParams, AuditQuery, ENTITY_TYPES, NOT_AVAILABLE};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::client_detail::{
    CLIENT_NOT_FOUND, ClientDetailState, DetailAction, DetailForm, FormError,
};
pub use self::clients::{
    Account, Client, ClientFilter, Contact, Group, GroupMember, GroupMembership, MissingField,
    NewAccount, NewContact, NewGroup, RelatedClient,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::login::{
    INVALID_CREDENTIALS_MESSAGE, LOGIN_FAILED_MESSAGE, LoginOutcome, LoginService,
};
pub use self::record_id::RecordId;
pub use self::route_policy::{GateDecision, NEXT_PARAM, RequestKind, RoutePolicy};
pub use self::service::PortalService;
pub use self::session::{CachedUser, SessionToken, SessionTokenError, UserRole};
pub use self::tasks::{Task, TaskBoard, TaskBucket};
pub use self::trace_id::TraceId;
pub use self::view_state::{LoadState, RequestGeneration, Ticket};

/// HTTP header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient result alias for handlers that fail with [`Error`].
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
