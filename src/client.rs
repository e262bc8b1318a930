//! HTTP client for the hosted discounts data service.
//!
//! The service exposes a PostgREST-style API: one endpoint per table,
//! filters as query parameters, inserts as JSON `POST` bodies. This
//! module translates the backend-agnostic [`DiscountQuery`] into that
//! parameter syntax and provides both async and blocking client
//! variants behind feature flags.

use crate::query::DiscountQuery;

/// Path prefix for the service's table endpoints.
const REST_PATH: &str = "/rest/v1";

/// Published discounts table.
const DISCOUNTS_TABLE: &str = "discounts";

/// Moderation queue for recommended discounts.
const RECOMMENDATIONS_TABLE: &str = "recommended_discounts";

/// Error-report table (deployed with Spanish naming).
const REPORTS_TABLE: &str = "errores_reportados";

/// Explicit request timeout; a hung call surfaces as a transport error
/// instead of leaving the caller waiting forever.
const REQUEST_TIMEOUT: core::time::Duration = core::time::Duration::from_secs(30);

/// Backend message fragment identifying a duplicate-report rejection.
///
/// The service signals the condition only through its message text;
/// the string match is confined to [`classify_api_error`] so the rest
/// of the crate sees the structured
/// [`SurtidorError::DuplicateReport`](crate::error::SurtidorError::DuplicateReport)
/// instead.
const DUPLICATE_REPORT_FRAGMENT: &str = "ya existe un reporte pendiente";

/// Error body returned by the data service.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    /// Human-readable message.
    message: String,
}

/// Maps a non-success response to an error, remapping the
/// duplicate-report message to its structured variant.
fn classify_api_error(status: u16, body: &str) -> crate::error::SurtidorError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_owned());
    if message.contains(DUPLICATE_REPORT_FRAGMENT) {
        crate::error::SurtidorError::DuplicateReport
    } else {
        crate::error::SurtidorError::Api { status, message }
    }
}

/// Translates a [`DiscountQuery`] into PostgREST query parameters.
///
/// - Brand selections become a `fuel_brand=in.(...)` membership filter.
/// - Day selections become one `or=(day.ilike.*…*,…)` clause group
///   (substring matches — a record's day field may be composite).
/// - A search term becomes a single `or=(…)` clause group over
///   `card_method` and `frequency`, widened to `fuel_brand` and `day`
///   while those dimensions are unfiltered. A record matches if any
///   eligible column contains the term.
/// - The sort spec becomes `order=<column>.<direction>`.
///
/// Parameter groups repeat the `or` key; the service combines repeated
/// keys with AND, which preserves the filter-AND-search semantics.
#[must_use]
pub fn query_params(query: &DiscountQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), "*".to_owned())];

    if !query.brands.is_empty() {
        let list = query
            .brands
            .iter()
            .map(|brand| format!("\"{brand}\""))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("fuel_brand".to_owned(), format!("in.({list})")));
    }

    if !query.days.is_empty() {
        let clauses = query
            .days
            .iter()
            .map(|day| format!("day.ilike.*{day}*"))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("or".to_owned(), format!("({clauses})")));
    }

    if !query.search.is_empty() {
        let term = query.search.to_lowercase();
        let mut clauses = vec![
            format!("card_method.ilike.*{term}*"),
            format!("frequency.ilike.*{term}*"),
        ];
        if query.brands.is_empty() {
            clauses.push(format!("fuel_brand.ilike.*{term}*"));
        }
        if query.days.is_empty() {
            clauses.push(format!("day.ilike.*{term}*"));
        }
        params.push(("or".to_owned(), format!("({})", clauses.join(","))));
    }

    if let Some(spec) = query.sort {
        params.push((
            "order".to_owned(),
            format!("{}.{}", spec.field.column(), spec.direction.as_str()),
        ));
    }

    params
}

/// Generates a data-service client (async or blocking) with builder,
/// methods, and tests.
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
            /// Service API key (anon key).
            api_key: Option<SecretString>,
            /// Service base URL.
            base_url: Option<String>,
        }

        impl $builder {
            /// Sets the service API key.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Sets the service base URL (e.g. the project URL, or a
            /// mock server when testing).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`SurtidorError::MissingApiKey`] /
            /// [`SurtidorError::MissingBaseUrl`] when a required
            /// setting is absent, or [`SurtidorError::Http`] if the
            /// HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let api_key = self.api_key.ok_or(SurtidorError::MissingApiKey)?;
                let base_url = self.base_url.ok_or(SurtidorError::MissingBaseUrl)?;
                tracing::debug!(base_url = %base_url, "building client");
                let http = <$http_type>::builder().timeout(REQUEST_TIMEOUT).build()?;

                Ok($client {
                    http,
                    api_key,
                    base_url,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Service API key.
            api_key: SecretString,
            /// Service base URL.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    api_key: None,
                    base_url: None,
                }
            }

            /// Fetches the discounts matching the given query.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the service
            /// returns a non-success status, or the response cannot be
            /// deserialized.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn discounts(
                &self,
                query: &DiscountQuery,
            ) -> Result<Vec<Discount>> {
                let url = format!("{}{REST_PATH}/{DISCOUNTS_TABLE}", self.base_url);
                let params = query_params(query);
                tracing::debug!(url = %url, params = params.len(), "fetching discounts");
                let response: $resp_type = self
                    .http
                    .get(&url)
                    .header("apikey", self.api_key.expose_secret())
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", self.api_key.expose_secret()),
                    )
                    .query(&params)
                    .send()
                    $( .$await_ext )?
                    ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    serde_json::from_str(&body).map_err(SurtidorError::from)
                } else {
                    let body = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), "API error");
                    Err(classify_api_error(status.as_u16(), &body))
                }
            }

            /// Inserts a new recommendation into the moderation queue.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the
            /// service rejects the row.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn insert_recommendation(
                &self,
                recommendation: &NewRecommendation,
            ) -> Result<()> {
                tracing::debug!("submitting recommendation");
                self.insert(RECOMMENDATIONS_TABLE, recommendation) $( .$await_ext )?
            }

            /// Inserts a new error report.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the
            /// service rejects the row; a duplicate-report rejection
            /// surfaces as [`SurtidorError::DuplicateReport`].
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn insert_report(
                &self,
                report: &NewErrorReport,
            ) -> Result<()> {
                tracing::debug!("submitting error report");
                self.insert(REPORTS_TABLE, report) $( .$await_ext )?
            }

            /// Sends an authenticated JSON insert and checks the
            /// response status.
            #[tracing::instrument(skip_all, fields(table = %table))]
            $($async_kw)? fn insert<Req: serde::Serialize $(+ $send_bound)?>(
                &self,
                table: &str,
                payload: &Req,
            ) -> Result<()> {
                let url = format!("{}{REST_PATH}/{table}", self.base_url);
                tracing::trace!(url = %url, "sending POST request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header("apikey", self.api_key.expose_secret())
                    .header(
                        AUTHORIZATION,
                        format!("Bearer {}", self.api_key.expose_secret()),
                    )
                    .header("Prefer", "return=minimal")
                    .json(payload)
                    .send()
                    $( .$await_ext )?
                    ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    Ok(())
                } else {
                    let body = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    Err(classify_api_error(status.as_u16(), &body))
                }
            }
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn builder_requires_api_key() {
                let result = $client::builder().base_url("http://localhost").build();
                assert!(matches!(result, Err(SurtidorError::MissingApiKey)));
            }

            #[test]
            fn builder_requires_base_url() {
                let result = $client::builder().api_key("anon").build();
                assert!(matches!(result, Err(SurtidorError::MissingBaseUrl)));
            }

            #[test]
            fn builder_with_both_succeeds() {
                let client = $client::builder()
                    .api_key("anon")
                    .base_url("http://localhost:8080")
                    .build()
                    .unwrap();
                assert_eq!(client.base_url, "http://localhost:8080");
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async data-service client.

    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{
        DISCOUNTS_TABLE, REPORTS_TABLE, REQUEST_TIMEOUT, RECOMMENDATIONS_TABLE, REST_PATH,
        classify_api_error, query_params,
    };
    use crate::error::{Result, SurtidorError};
    use crate::models::{Discount, NewErrorReport, NewRecommendation};
    use crate::query::DiscountQuery;

    define_client! {
        client_name: PromoClient,
        builder_name: PromoClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the discounts data service.\n\nUse [`PromoClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`PromoClient`].",
        async_kw: async,
        await_kw: await,
        send_bound: Sync,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) data-service client.

    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{
        DISCOUNTS_TABLE, REPORTS_TABLE, REQUEST_TIMEOUT, RECOMMENDATIONS_TABLE, REST_PATH,
        classify_api_error, query_params,
    };
    use crate::error::{Result, SurtidorError};
    use crate::models::{Discount, NewErrorReport, NewRecommendation};
    use crate::query::DiscountQuery;

    define_client! {
        client_name: PromoBlockingClient,
        builder_name: PromoBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the discounts data service.\n\nUse [`PromoBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`PromoBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{PromoClient, PromoClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{PromoBlockingClient, PromoBlockingClientBuilder};

#[cfg(test)]
mod param_tests {
    use super::*;
    use crate::query::SortField;

    /// Extracts the values for one parameter key.
    fn values_for<'p>(params: &'p [(String, String)], key: &str) -> Vec<&'p str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn empty_query_selects_everything() {
        let params = query_params(&DiscountQuery::new());
        assert_eq!(params, [("select".to_owned(), "*".to_owned())]);
    }

    #[test]
    fn brand_filter_becomes_in_list() {
        let params = query_params(&DiscountQuery::new().brand("YPF").brand("SHELL"));
        assert_eq!(
            values_for(&params, "fuel_brand"),
            ["in.(\"YPF\",\"SHELL\")"]
        );
        assert!(values_for(&params, "or").is_empty());
    }

    #[test]
    fn day_filter_becomes_ilike_group() {
        let params = query_params(&DiscountQuery::new().day("Lunes").day("Martes"));
        assert_eq!(
            values_for(&params, "or"),
            ["(day.ilike.*Lunes*,day.ilike.*Martes*)"]
        );
    }

    #[test]
    fn search_targets_mandatory_columns() {
        let query = DiscountQuery::new().brand("YPF").day("Lunes").search("Visa");
        let ors = query_params(&query)
            .iter()
            .filter(|(k, _)| k == "or")
            .map(|(_, v)| v.clone())
            .collect::<Vec<_>>();
        // One group for days, one for the search term.
        assert_eq!(ors.len(), 2);
        let search_group = ors.last().cloned().unwrap_or_default();
        assert_eq!(
            search_group,
            "(card_method.ilike.*visa*,frequency.ilike.*visa*)"
        );
    }

    #[test]
    fn search_widens_to_unfiltered_dimensions() {
        let params = query_params(&DiscountQuery::new().search("visa"));
        assert_eq!(
            values_for(&params, "or"),
            ["(card_method.ilike.*visa*,frequency.ilike.*visa*,fuel_brand.ilike.*visa*,day.ilike.*visa*)"]
        );
    }

    #[test]
    fn sort_becomes_order_param() {
        let params = query_params(&DiscountQuery::new().sorted_by(SortField::Discount));
        assert_eq!(values_for(&params, "order"), ["discount.desc"]);

        let params = query_params(
            &DiscountQuery::new()
                .sorted_by(SortField::Discount)
                .sorted_by(SortField::Discount),
        );
        assert_eq!(values_for(&params, "order"), ["discount.asc"]);
    }

    #[test]
    fn scenario_single_brand_no_other_clauses() {
        // brands = {"YPF"}, no days, no search, no sort.
        let params = query_params(&DiscountQuery::new().brand("YPF"));
        assert_eq!(values_for(&params, "fuel_brand"), ["in.(\"YPF\")"]);
        assert!(values_for(&params, "or").is_empty());
        assert!(values_for(&params, "order").is_empty());
    }

    #[test]
    fn classify_plain_error_keeps_message() {
        let err = classify_api_error(400, r#"{"message":"invalid input"}"#);
        assert!(matches!(
            err,
            crate::error::SurtidorError::Api { status: 400, ref message } if message == "invalid input"
        ));
    }

    #[test]
    fn classify_unparseable_body_is_passed_through() {
        let err = classify_api_error(502, "Bad Gateway\n");
        assert!(matches!(
            err,
            crate::error::SurtidorError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn classify_duplicate_report_is_structured() {
        let body = r#"{"message":"ya existe un reporte pendiente de revisión para este descuento"}"#;
        let err = classify_api_error(409, body);
        assert!(matches!(err, crate::error::SurtidorError::DuplicateReport));
    }
}

#[cfg(all(test, feature = "async"))]
mod http_tests {
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::PromoClient;
    use crate::error::SurtidorError;
    use crate::models::{DiscountId, ErrorReportDraft, RecommendationDraft};
    use crate::models::{Frequency, FuelBrand};
    use crate::query::{DiscountQuery, SortField};

    /// Builds a client pointed at the mock server.
    fn client_for(server: &MockServer) -> PromoClient {
        PromoClient::builder()
            .api_key("anon-key")
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    /// One discount row as the service would return it.
    fn discount_row() -> serde_json::Value {
        serde_json::json!({
            "id": "d-1",
            "fuel_brand": "YPF",
            "day": "Lunes",
            "card_method": "Visa crédito",
            "discount": 15,
            "reimbursement_limit": 6000,
            "frequency": "weekly"
        })
    }

    #[tokio::test]
    async fn fetch_sends_translated_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/discounts"))
            .and(query_param("select", "*"))
            .and(query_param("fuel_brand", "in.(\"YPF\")"))
            .and(query_param("order", "discount.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![discount_row()]))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let query = DiscountQuery::new().brand("YPF").sorted_by(SortField::Discount);
        let discounts = client.discounts(&query).await.unwrap();
        assert_eq!(discounts.len(), 1);
        assert_eq!(
            discounts.first().map(|d| d.fuel_brand),
            Some(FuelBrand::Ypf)
        );
    }

    #[tokio::test]
    async fn fetch_surfaces_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/discounts"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "malformed filter"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.discounts(&DiscountQuery::new()).await.unwrap_err();
        assert!(matches!(
            err,
            SurtidorError::Api { status: 400, ref message } if message == "malformed filter"
        ));
    }

    #[tokio::test]
    async fn insert_recommendation_posts_payload() {
        let server = MockServer::start().await;

        let mut draft = RecommendationDraft::new();
        draft.toggle_brand(FuelBrand::Shell);
        draft.toggle_day("Viernes");
        draft.set_card_method("Modo");
        draft.set_discount("20");
        draft.set_reimbursement("8000");
        draft.set_frequency(Frequency::Monthly);
        let payload = draft.validate().unwrap();

        Mock::given(method("POST"))
            .and(path("/rest/v1/recommended_discounts"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.insert_recommendation(&payload).await.unwrap();
    }

    #[tokio::test]
    async fn insert_report_remaps_duplicate_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/errores_reportados"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "ya existe un reporte pendiente de revisión para este descuento"
            })))
            .mount(&server)
            .await;

        let mut draft = ErrorReportDraft::new(DiscountId::new("d-1".to_owned()));
        draft.set_discount_error(true);
        draft.set_evidence_url("example.com/proof");
        let payload = draft.validate().unwrap();

        let client = client_for(&server);
        let err = client.insert_report(&payload).await.unwrap_err();
        assert!(matches!(err, SurtidorError::DuplicateReport));
    }
}
