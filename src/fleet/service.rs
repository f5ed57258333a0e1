use crate::api::ApiError;
use crate::fleet::model::{FleetStats, Trailer, Vehicle, VehicleStatusUpdate};
use crate::forms::TrailerForm;
use crate::http::{Endpoint, HttpMethod, ReqParam};
use crate::query::QueryClient;
use crate::view::{StaleKeys, ViewState};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const FLEET_PATH: &str = "/api/v1/fleet";
pub const STATS_PATH: &str = "/api/v1/fleet/stats";
pub const VEHICLES_PATH: &str = "/api/v1/fleet/vehicles";
pub const TRAILERS_PATH: &str = "/api/v1/fleet/trailers";

fn member_url(collection: &str, id: &str) -> String {
    Endpoint::new(&format!("{}/:id", collection), vec![ReqParam::new(":id", id)]).to_url()
}

pub struct FleetDashboard {
    client: QueryClient,
    token: CancellationToken,
    stale: StaleKeys,
    status_filter: Option<String>,
    stats: ViewState<FleetStats>,
    vehicles: ViewState<Vec<Vehicle>>,
    trailers: ViewState<Vec<Trailer>>,
}

impl FleetDashboard {
    pub fn new(client: QueryClient) -> Self {
        let stale = StaleKeys::new(client.cache().clone());
        Self {
            client,
            token: CancellationToken::new(),
            stale,
            status_filter: None,
            stats: ViewState::Idle,
            vehicles: ViewState::Idle,
            trailers: ViewState::Idle,
        }
    }

    fn vehicles_url(&self) -> String {
        Endpoint::new(VEHICLES_PATH, vec![])
            .with_query("status", self.status_filter.as_deref())
            .to_url()
    }

    fn trailers_url(&self) -> String {
        Endpoint::new(TRAILERS_PATH, vec![])
            .with_query("status", self.status_filter.as_deref())
            .to_url()
    }

    fn watch_current(&mut self) {
        let (vehicles_url, trailers_url) = (self.vehicles_url(), self.trailers_url());
        self.stale.watch(STATS_PATH);
        self.stale.watch(&vehicles_url);
        self.stale.watch(&trailers_url);
    }

    /// Issues the three reads concurrently.
    pub async fn load(&mut self) {
        self.stats.begin_loading();
        self.vehicles.begin_loading();
        self.trailers.begin_loading();
        self.watch_current();
        let (vehicles_url, trailers_url) = (self.vehicles_url(), self.trailers_url());
        let (stats, vehicles, trailers) = futures::join!(
            self.client.fetch::<FleetStats>(STATS_PATH, &self.token),
            self.client.fetch::<Vec<Vehicle>>(&vehicles_url, &self.token),
            self.client.fetch::<Vec<Trailer>>(&trailers_url, &self.token),
        );
        self.stats.resolve(stats);
        self.vehicles.resolve(vehicles);
        self.trailers.resolve(trailers);
    }

    async fn load_stats(&mut self) {
        self.stats.begin_loading();
        let stats = self.client.fetch::<FleetStats>(STATS_PATH, &self.token).await;
        self.stats.resolve(stats);
    }

    async fn load_lists(&mut self) {
        self.vehicles.begin_loading();
        self.trailers.begin_loading();
        let (vehicles_url, trailers_url) = (self.vehicles_url(), self.trailers_url());
        let (vehicles, trailers) = futures::join!(
            self.client.fetch::<Vec<Vehicle>>(&vehicles_url, &self.token),
            self.client.fetch::<Vec<Trailer>>(&trailers_url, &self.token),
        );
        self.vehicles.resolve(vehicles);
        self.trailers.resolve(trailers);
    }

    /// Refetches vehicles and trailers under the new filter; stats are
    /// unfiltered and stay as they are.
    pub async fn set_status_filter(&mut self, status: Option<&str>) {
        let status = status.filter(|s| !s.is_empty()).map(str::to_string);
        if status == self.status_filter {
            return;
        }
        let (old_vehicles, old_trailers) = (self.vehicles_url(), self.trailers_url());
        self.stale.unwatch(&old_vehicles);
        self.stale.unwatch(&old_trailers);
        self.status_filter = status;
        info!("fleet filter changed to {:?}", self.status_filter);
        self.watch_current();
        self.load_lists().await;
    }

    pub async fn retry(&mut self) {
        if self.stats.can_retry() {
            self.load_stats().await;
        }
        if self.vehicles.can_retry() || self.trailers.can_retry() {
            self.load_lists().await;
        }
    }

    pub async fn refresh_stale(&mut self) {
        if self.stale.take(STATS_PATH) {
            self.load_stats().await;
        }
        let vehicles_stale = self.stale.take(&self.vehicles_url());
        let trailers_stale = self.stale.take(&self.trailers_url());
        if vehicles_stale || trailers_stale {
            self.load_lists().await;
        }
    }

    pub async fn set_vehicle_status(
        &mut self,
        vehicle_id: &str,
        fleet_status: &str,
    ) -> Result<Vehicle, ApiError> {
        let url = member_url(VEHICLES_PATH, vehicle_id);
        let body = serde_json::to_value(VehicleStatusUpdate { fleet_status })
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let vehicle = self
            .client
            .mutate::<Vehicle>(HttpMethod::PATCH, &url, Some(body), &[FLEET_PATH], &self.token)
            .await?;
        self.refresh_stale().await;
        Ok(vehicle)
    }

    pub async fn unhitch_trailer(&mut self, trailer_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/unhitch", member_url(TRAILERS_PATH, trailer_id));
        self.client
            .mutate::<Value>(HttpMethod::POST, &url, None, &[FLEET_PATH], &self.token)
            .await?;
        self.refresh_stale().await;
        Ok(())
    }

    /// Creates a trailer when `trailer_id` is `None`, otherwise updates it.
    /// An invalid form is rejected before any request is made.
    pub async fn save_trailer(
        &mut self,
        trailer_id: Option<&str>,
        form: &TrailerForm,
    ) -> Result<Trailer, ApiError> {
        let payload = form.to_payload().map_err(ApiError::Validation)?;
        let (method, url) = match trailer_id {
            Some(id) => (HttpMethod::PATCH, member_url(TRAILERS_PATH, id)),
            None => (HttpMethod::POST, TRAILERS_PATH.to_string()),
        };
        let trailer = self
            .client
            .mutate::<Trailer>(method, &url, Some(payload), &[FLEET_PATH], &self.token)
            .await?;
        self.refresh_stale().await;
        Ok(trailer)
    }

    pub fn stats(&self) -> &ViewState<FleetStats> {
        &self.stats
    }

    pub fn vehicles(&self) -> &ViewState<Vec<Vehicle>> {
        &self.vehicles
    }

    pub fn trailers(&self) -> &ViewState<Vec<Trailer>> {
        &self.trailers
    }

    pub fn status_filter(&self) -> Option<&str> {
        self.status_filter.as_deref()
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}
