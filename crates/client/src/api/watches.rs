//! Marketplace catalog, purchase and server-side favorite endpoints.

use luxtime_core::{FavoriteToggle, NewWatch, Purchase, PurchaseRequest, Watch, WatchFilter, WatchId};
use tracing::instrument;
use url::form_urlencoded;

use super::{ApiClient, ApiError, ApiRequest};

/// Filter names the API spells differently from [`WatchFilter`].
const PARAM_ALIASES: &[(&str, &str)] = &[("price_min", "min_price"), ("price_max", "max_price")];

fn api_param_name(name: &str) -> &str {
    PARAM_ALIASES
        .iter()
        .find_map(|(ours, theirs)| (*ours == name).then_some(*theirs))
        .unwrap_or(name)
}

/// Marketplace listing path for `filter`.
///
/// Unset filters are omitted; with no filters there is no `?` at all.
#[must_use]
pub fn marketplace_path(filter: &WatchFilter) -> String {
    if filter.is_empty() {
        return "/watches/marketplace".to_string();
    }
    let params = filter.params();

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(
            params
                .iter()
                .map(|(name, value)| (api_param_name(name), value.as_str())),
        )
        .finish();
    format!("/watches/marketplace?{query}")
}

impl ApiClient {
    /// Search the marketplace (`GET /watches/marketplace`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn watches(&self, filter: &WatchFilter) -> Result<Vec<Watch>, ApiError> {
        self.get(&marketplace_path(filter)).await
    }

    /// One listing (`GET /watches/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (404) if the watch does not exist.
    #[instrument(skip(self))]
    pub async fn watch(&self, id: WatchId) -> Result<Watch, ApiError> {
        self.get(&format!("/watches/{id}")).await
    }

    /// List a new watch for sale (`POST /watches`). Store accounts only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (403) for accounts that are not stores.
    #[instrument(skip(self, watch), fields(brand = %watch.brand, model = %watch.model))]
    pub async fn create_watch(&self, watch: &NewWatch) -> Result<Watch, ApiError> {
        self.send(ApiRequest::post("/watches").json(watch)?).await
    }

    /// Buy a watch (`POST /watches/{id}/purchase`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the watch is sold or payment is refused.
    #[instrument(skip(self, request), fields(payment_method = ?request.payment_method))]
    pub async fn purchase_watch(
        &self,
        id: WatchId,
        request: &PurchaseRequest,
    ) -> Result<Purchase, ApiError> {
        self.send(ApiRequest::post(format!("/watches/{id}/purchase")).json(request)?)
            .await
    }

    /// Flip the server-side favorite flag (`POST /watches/{id}/favorite`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn toggle_favorite(&self, id: WatchId) -> Result<FavoriteToggle, ApiError> {
        self.send(ApiRequest::post(format!("/watches/{id}/favorite")))
            .await
    }

    /// Watches favorited server-side (`GET /watches/favorites`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn favorites(&self) -> Result<Vec<Watch>, ApiError> {
        self.get("/watches/favorites").await
    }
}
