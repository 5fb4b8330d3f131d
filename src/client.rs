//! HTTP client for the `CallTrack` billing API.
//!
//! Provides both async and blocking client variants behind feature
//! flags. Both implement the collection's record-source traits, so a
//! [`TransactionCollection`](crate::collection::TransactionCollection)
//! can load straight from either.

use crate::models::ClientId;

/// Base URL for the `CallTrack` API.
const DEFAULT_BASE_URL: &str = "https://api.calltrack.ru";

/// Calls listing endpoint path.
const CALLS_PATH: &str = "/api/v1/calls";

/// Debtors listing endpoint path.
const DEBTS_PATH: &str = "/api/v1/clients/debts";

/// Call registration endpoint path.
const REGISTER_CALL_PATH: &str = "/api/v1/reg/call";

/// Recent-payments endpoint path for one client.
fn payments_path(client: ClientId) -> String {
    format!("/api/v1/clients/{client}/payments/recent")
}

/// Generates a `CallTrack` client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
        $(send_bound: $send_bound:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Access token for API authentication.
            token: Option<SecretString>,
            /// Base URL override (for testing).
            base_url: Option<String>,
            /// Client account whose payments are fetched.
            client_id: Option<ClientId>,
        }

        impl $builder {
            /// Sets the access token for API authentication.
            #[inline]
            #[must_use]
            pub fn token<T: Into<String>>(mut self, token: T) -> Self {
                self.token = Some(SecretString::from(token.into()));
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the client account for payment-report fetches.
            #[inline]
            #[must_use]
            pub const fn client_id(mut self, id: ClientId) -> Self {
                self.client_id = Some(id);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`CallTrackError::MissingToken`] if no token was provided.
            /// Returns [`CallTrackError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let token = self.token.ok_or(CallTrackError::MissingToken)?;
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
                tracing::debug!(base_url = %base_url, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    token,
                    base_url,
                    client_id: self.client_id,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Bearer access token.
            token: SecretString,
            /// API base URL.
            base_url: String,
            /// Client account whose payments are fetched, if configured.
            client_id: Option<ClientId>,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    token: None,
                    base_url: None,
                    client_id: None,
                }
            }

            /// Fetches all call records.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn calls(&self) -> Result<Vec<RawRecord>> {
                let envelope: Envelope = self.get_json(CALLS_PATH) $( .$await_ext )? ?;
                Ok(envelope.into_records())
            }

            /// Fetches recent payment records for the given client account.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(client = %client))]
            pub $($async_kw)? fn recent_payments(
                &self,
                client: ClientId,
            ) -> Result<Vec<RawRecord>> {
                let envelope: Envelope =
                    self.get_json(&payments_path(client)) $( .$await_ext )? ?;
                Ok(envelope.into_records())
            }

            /// Fetches all debtor records.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn debtors(&self) -> Result<Vec<RawRecord>> {
                let envelope: Envelope = self.get_json(DEBTS_PATH) $( .$await_ext )? ?;
                Ok(envelope.into_records())
            }

            /// Registers a manually-entered call and returns the created
            /// record as the backend echoed it.
            ///
            /// Registration does not touch any local collection; pair it
            /// with
            /// [`TransactionCollection::append`](crate::collection::TransactionCollection::append).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn register_call(&self, call: &NewCall) -> Result<RawRecord> {
                self.post_json(REGISTER_CALL_PATH, call) $( .$await_ext )?
            }

            /// Dispatches to the endpoint backing the given report kind.
            $($async_kw)? fn fetch_records(&self, kind: ReportKind) -> Result<Vec<RawRecord>> {
                match kind {
                    ReportKind::Call => self.calls() $( .$await_ext )?,
                    ReportKind::Payment => {
                        let client = self.client_id.ok_or(CallTrackError::MissingClientId)?;
                        self.recent_payments(client) $( .$await_ext )?
                    }
                    ReportKind::Debtor => self.debtors() $( .$await_ext )?,
                }
            }

            /// Sends an authenticated GET request and deserializes the
            /// response.
            #[tracing::instrument(skip_all, fields(path = %path))]
            $($async_kw)? fn get_json<Resp: serde::de::DeserializeOwned>(
                &self,
                path: &str,
            ) -> Result<Resp> {
                let url = format!("{}{path}", self.base_url);
                tracing::trace!(url = %url, "sending GET request");
                let response: $resp_type = self
                    .http
                    .get(&url)
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", self.token.expose_secret()),
                    )
                    .send()
                    $( .$await_ext )?
                    ?;

                Self::read_json(response) $( .$await_ext )?
            }

            /// Sends an authenticated JSON POST request and deserializes the
            /// response.
            #[tracing::instrument(skip_all, fields(path = %path))]
            $($async_kw)? fn post_json<
                Req: serde::Serialize $(+ $send_bound)?,
                Resp: serde::de::DeserializeOwned,
            >(
                &self,
                path: &str,
                request: &Req,
            ) -> Result<Resp> {
                let url = format!("{}{path}", self.base_url);
                tracing::trace!(url = %url, "sending POST request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", self.token.expose_secret()),
                    )
                    .header(CONTENT_TYPE, "application/json")
                    .json(request)
                    .send()
                    $( .$await_ext )?
                    ?;

                Self::read_json(response) $( .$await_ext )?
            }

            /// Checks the response status and deserializes the body.
            $($async_kw)? fn read_json<Resp: serde::de::DeserializeOwned>(
                response: $resp_type,
            ) -> Result<Resp> {
                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    serde_json::from_str(&body).map_err(CallTrackError::from)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "API error");
                    Err(CallTrackError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

        #[cfg(test)]
        mod tests {
            use super::*;
            use crate::error::CallTrackError;

            #[test]
            fn builder_requires_token() {
                let result = $client::builder().build();
                assert!(matches!(result, Err(CallTrackError::MissingToken)));
            }

            #[test]
            fn builder_with_token_succeeds() {
                let client = $client::builder()
                    .token("test-token")
                    .build()
                    .unwrap();
                assert_eq!(client.base_url, DEFAULT_BASE_URL);
                assert!(client.client_id.is_none());
            }

            #[test]
            fn builder_custom_base_url() {
                let client = $client::builder()
                    .token("test-token")
                    .base_url("http://localhost:8080")
                    .client_id(ClientId::new(17))
                    .build()
                    .unwrap();
                assert_eq!(client.base_url, "http://localhost:8080");
                assert_eq!(client.client_id, Some(ClientId::new(17)));
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the `CallTrack` API.

    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use secrecy::{ExposeSecret, SecretString};

    use super::{CALLS_PATH, DEBTS_PATH, DEFAULT_BASE_URL, REGISTER_CALL_PATH, payments_path};
    use crate::collection::RecordSource;
    use crate::error::{CallTrackError, Result};
    use crate::models::{ClientId, Envelope, NewCall, RawRecord, ReportKind};

    define_client! {
        client_name: CallTrackClient,
        builder_name: CallTrackClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the CallTrack API.\n\nUse [`CallTrackClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`CallTrackClient`].",
        async_kw: async,
        await_kw: await,
        send_bound: Sync,
    }

    impl RecordSource for CallTrackClient {
        async fn fetch(&self, kind: ReportKind) -> Result<Vec<RawRecord>> {
            self.fetch_records(kind).await
        }
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the `CallTrack` API.

    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use secrecy::{ExposeSecret, SecretString};

    use super::{CALLS_PATH, DEBTS_PATH, DEFAULT_BASE_URL, REGISTER_CALL_PATH, payments_path};
    use crate::collection::BlockingRecordSource;
    use crate::error::{CallTrackError, Result};
    use crate::models::{ClientId, Envelope, NewCall, RawRecord, ReportKind};

    define_client! {
        client_name: CallTrackBlockingClient,
        builder_name: CallTrackBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the CallTrack API.\n\nUse [`CallTrackBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`CallTrackBlockingClient`].",
    }

    impl BlockingRecordSource for CallTrackBlockingClient {
        fn fetch(&self, kind: ReportKind) -> Result<Vec<RawRecord>> {
            self.fetch_records(kind)
        }
    }
}

#[cfg(feature = "async")]
pub use async_client::{CallTrackClient, CallTrackClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{CallTrackBlockingClient, CallTrackBlockingClientBuilder};
