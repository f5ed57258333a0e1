use crate::api::ApiError;
use crate::booking::model::{
    Booking, BookingBody, BookingsBody, Property, PropertyBody, Provider, ProvidersBody, Spot,
    SpotsBody,
};
use crate::forms::BookingForm;
use crate::http::{Endpoint, HttpMethod, ReqParam};
use crate::query::QueryClient;
use crate::view::{StaleKeys, ViewState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const PROPERTY_PATH: &str = "/api/staging/properties/:id";
pub const BOOKINGS_PATH: &str = "/api/staging/bookings";

/// Booking waiting for the user to confirm its cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelDialog {
    pub booking_id: String,
}

/// Property detail page: the property, its spots and providers, and the
/// guest's bookings there.
pub struct PropertyBookingView {
    client: QueryClient,
    token: CancellationToken,
    stale: StaleKeys,
    property_id: String,
    property: ViewState<Property>,
    spots: ViewState<Vec<Spot>>,
    providers: ViewState<Vec<Provider>>,
    bookings: ViewState<Vec<Booking>>,
    cancel_dialog: Option<CancelDialog>,
}

impl PropertyBookingView {
    pub fn new(client: QueryClient, property_id: &str) -> Self {
        let stale = StaleKeys::new(client.cache().clone());
        Self {
            client,
            token: CancellationToken::new(),
            stale,
            property_id: property_id.to_string(),
            property: ViewState::Idle,
            spots: ViewState::Idle,
            providers: ViewState::Idle,
            bookings: ViewState::Idle,
            cancel_dialog: None,
        }
    }

    fn property_url(&self) -> String {
        let id = ReqParam::new(":id", self.property_id.as_str());
        Endpoint::new(PROPERTY_PATH, vec![id]).to_url()
    }

    fn spots_url(&self) -> String {
        format!("{}/spots", self.property_url())
    }

    fn providers_url(&self) -> String {
        format!("{}/providers", self.property_url())
    }

    fn bookings_url(&self) -> String {
        Endpoint::new(BOOKINGS_PATH, vec![])
            .with_query("propertyId", Some(self.property_id.as_str()))
            .to_url()
    }

    pub async fn load(&mut self) {
        self.property.begin_loading();
        self.spots.begin_loading();
        self.providers.begin_loading();
        self.bookings.begin_loading();
        let (property_url, spots_url, providers_url, bookings_url) = (
            self.property_url(),
            self.spots_url(),
            self.providers_url(),
            self.bookings_url(),
        );
        self.stale.watch(&spots_url);
        self.stale.watch(&bookings_url);
        let (property, spots, providers, bookings) = futures::join!(
            self.client.fetch::<PropertyBody>(&property_url, &self.token),
            self.client.fetch::<SpotsBody>(&spots_url, &self.token),
            self.client.fetch::<ProvidersBody>(&providers_url, &self.token),
            self.client.fetch::<BookingsBody>(&bookings_url, &self.token),
        );
        self.property.resolve(property.map(|body| body.property));
        self.spots.resolve(spots.map(|body| body.spots));
        self.providers.resolve(providers.map(|body| body.providers));
        self.bookings.resolve(bookings.map(|body| body.bookings));
    }

    async fn load_spots(&mut self) {
        self.spots.begin_loading();
        let spots = self.client.fetch::<SpotsBody>(&self.spots_url(), &self.token).await;
        self.spots.resolve(spots.map(|body| body.spots));
    }

    async fn load_bookings(&mut self) {
        self.bookings.begin_loading();
        let bookings = self
            .client
            .fetch::<BookingsBody>(&self.bookings_url(), &self.token)
            .await;
        self.bookings.resolve(bookings.map(|body| body.bookings));
    }

    pub async fn retry(&mut self) {
        let any_failed = self.property.can_retry()
            || self.spots.can_retry()
            || self.providers.can_retry()
            || self.bookings.can_retry();
        if any_failed {
            self.load().await;
        }
    }

    pub async fn refresh_stale(&mut self) {
        if self.stale.take(&self.spots_url()) {
            self.load_spots().await;
        }
        if self.stale.take(&self.bookings_url()) {
            self.load_bookings().await;
        }
    }

    /// Rejects an invalid form without a request.
    pub async fn create_booking(&mut self, form: &BookingForm) -> Result<Booking, ApiError> {
        let payload = form.to_payload().map_err(ApiError::Validation)?;
        let spots_url = self.spots_url();
        let body = self
            .client
            .mutate::<BookingBody>(
                HttpMethod::POST,
                BOOKINGS_PATH,
                Some(payload),
                &[BOOKINGS_PATH, spots_url.as_str()],
                &self.token,
            )
            .await?;
        info!("booking {} created", body.booking.id);
        self.refresh_stale().await;
        Ok(body.booking)
    }

    /// Opens the dialog for a loaded booking that can still be cancelled.
    /// Returns whether the dialog opened.
    pub fn open_cancel_dialog(&mut self, booking_id: &str) -> bool {
        let cancellable = self
            .bookings
            .data()
            .and_then(|bookings| bookings.iter().find(|booking| booking.id == booking_id))
            .is_some_and(Booking::is_cancellable);
        if !cancellable {
            debug!("booking {} cannot be cancelled", booking_id);
            return false;
        }
        self.cancel_dialog = Some(CancelDialog {
            booking_id: booking_id.to_string(),
        });
        true
    }

    pub fn cancel_dialog(&self) -> Option<&CancelDialog> {
        self.cancel_dialog.as_ref()
    }

    /// Closes the dialog without touching the network.
    pub fn dismiss_cancel(&mut self) {
        self.cancel_dialog = None;
    }

    /// Cancels the booking in the open dialog, then refreshes the list once.
    /// The dialog stays open when the server refuses.
    pub async fn confirm_cancel(&mut self) -> Result<Option<Booking>, ApiError> {
        let Some(dialog) = self.cancel_dialog.clone() else {
            return Ok(None);
        };
        let url = Endpoint::new(
            &format!("{}/:id/cancel", BOOKINGS_PATH),
            vec![ReqParam::new(":id", dialog.booking_id.as_str())],
        )
        .to_url();
        let body = self
            .client
            .mutate::<BookingBody>(HttpMethod::POST, &url, None, &[BOOKINGS_PATH], &self.token)
            .await?;
        self.cancel_dialog = None;
        self.refresh_stale().await;
        Ok(Some(body.booking))
    }

    pub fn property(&self) -> &ViewState<Property> {
        &self.property
    }

    pub fn spots(&self) -> &ViewState<Vec<Spot>> {
        &self.spots
    }

    pub fn available_spots(&self) -> Vec<&Spot> {
        self.spots
            .data()
            .map(|spots| spots.iter().filter(|spot| spot.available).collect())
            .unwrap_or_default()
    }

    pub fn providers(&self) -> &ViewState<Vec<Provider>> {
        &self.providers
    }

    pub fn bookings(&self) -> &ViewState<Vec<Booking>> {
        &self.bookings
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}
