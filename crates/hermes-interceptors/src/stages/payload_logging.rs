//! Payload logging interceptor.
//!
//! Logs the JSON form of request and response payloads for selected
//! procedures. Requests and responses are filtered independently, each with
//! the `""` / `"*"` / comma-list grammar of [`MethodFilter`].
//!
//! In compact mode each payload becomes one `request object` or
//! `response object` event with the JSON in the `object` field. Pretty mode
//! skips the structured logger and prints indented JSON to the console, which
//! is only meant for local debugging.
//!
//! A payload that fails to marshal is reported and skipped; the call itself
//! is never affected. Streaming calls pass through unchanged.

use crate::filter::MethodFilter;
use crate::interceptor::Interceptor;
use hermes_codec::{JsonCodec, MarshalOptions};
use hermes_core::{Logger, Message, UnaryFunc};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

const REQUEST_OBJECT: &str = "request object";
const RESPONSE_OBJECT: &str = "response object";

/// Configuration for [`PayloadLoggingInterceptor`].
#[derive(Debug, Clone, Default)]
pub struct PayloadLoggingConfig {
    /// Logger to use instead of the one found in the call context.
    pub logger: Option<Logger>,
    /// Procedures whose requests are logged.
    pub request_methods: String,
    /// Procedures whose responses are logged.
    pub response_methods: String,
    /// Print indented JSON to the console instead of logging it.
    pub pretty: bool,
}

type Console = Arc<Mutex<Box<dyn Write + Send>>>;

/// Interceptor that logs marshaled payloads.
///
/// # Example
///
/// ```
/// use hermes_interceptors::{PayloadLoggingConfig, PayloadLoggingInterceptor};
///
/// let interceptor = PayloadLoggingInterceptor::new(PayloadLoggingConfig {
///     request_methods: "*".to_string(),
///     response_methods: "/acme.v1.Users/Get".to_string(),
///     ..Default::default()
/// });
/// ```
#[derive(Clone)]
pub struct PayloadLoggingInterceptor {
    inner: Arc<Inner>,
}

struct Inner {
    logger: Option<Logger>,
    requests: MethodFilter,
    responses: MethodFilter,
    pretty: bool,
    codec: JsonCodec,
    console: Console,
}

impl PayloadLoggingInterceptor {
    /// Creates the interceptor, printing pretty output to stdout.
    #[must_use]
    pub fn new(config: PayloadLoggingConfig) -> Self {
        Self::with_console(config, io::stdout())
    }

    /// Creates the interceptor, printing pretty output to `console`.
    #[must_use]
    pub fn with_console<W: Write + Send + 'static>(config: PayloadLoggingConfig, console: W) -> Self {
        let options = if config.pretty {
            MarshalOptions::pretty()
        } else {
            MarshalOptions::compact()
        };
        Self {
            inner: Arc::new(Inner {
                logger: config.logger,
                requests: MethodFilter::from_list(&config.request_methods),
                responses: MethodFilter::from_list(&config.response_methods),
                pretty: config.pretty,
                codec: JsonCodec::new(options),
                console: Arc::new(Mutex::new(Box::new(console))),
            }),
        }
    }
}

impl Inner {
    fn maybe_log(
        &self,
        log: &Logger,
        filter: &MethodFilter,
        procedure: &str,
        message: &dyn Message,
        kind: &str,
    ) {
        if !filter.matches(procedure) {
            return;
        }

        let encoded = match self.codec.marshal(message) {
            Ok(encoded) => encoded,
            Err(err) => {
                log.error(&err, &format!("unable to marshal {kind}, cannot log"));
                return;
            }
        };
        let text = String::from_utf8_lossy(&encoded);

        if self.pretty {
            if let Err(err) = writeln!(self.console.lock(), "\n{text}") {
                log.error(&err, &format!("unable to print {kind}"));
            }
        } else {
            log.in_scope(|| tracing::info!(object = %text, "{kind}"));
        }
    }
}

impl Interceptor for PayloadLoggingInterceptor {
    fn name(&self) -> &'static str {
        "payload_logging"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let inner = Arc::clone(&self.inner);
        UnaryFunc::new(move |ctx, request| {
            let inner = Arc::clone(&inner);
            let next = next.clone();
            async move {
                let log = Logger::resolve(inner.logger.as_ref(), &ctx);
                let procedure = request.procedure().to_owned();
                let requests = &inner.requests;
                inner.maybe_log(&log, requests, &procedure, request.message(), REQUEST_OBJECT);

                let result = next.call(ctx, request).await;
                if let Ok(response) = &result {
                    let responses = &inner.responses;
                    inner.maybe_log(&log, responses, &procedure, response.message(), RESPONSE_OBJECT);
                }
                result
            }
        })
    }
}

impl fmt::Debug for PayloadLoggingInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadLoggingInterceptor")
            .field("requests", &self.inner.requests)
            .field("responses", &self.inner.responses)
            .field("pretty", &self.inner.pretty)
            .finish_non_exhaustive()
    }
}
