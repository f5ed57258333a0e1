use crate::http::{Endpoint, ReqParam};
use crate::query::QueryClient;
use crate::run::aggregate::{compute_stats, run_progress, RunStats, SlotProgress};
use crate::run::model::{Bid, CoopRun, CoopRunDetail, CoopRunList, Run, RunDetail, RunList, Slot};
use crate::status::RunAction;
use crate::view::{StaleKeys, ViewState};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const RUNS_PATH: &str = "/api/service-runs/runs";
pub const COOP_RUNS_PATH: &str = "/api/coop-runs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardTab {
    #[default]
    Bidding,
    Coop,
}

/// Service-run list screen: bidding runs and coop runs side by side.
pub struct ServiceRunBoard {
    client: QueryClient,
    token: CancellationToken,
    stale: StaleKeys,
    status_filter: Option<String>,
    tab: BoardTab,
    runs: ViewState<Vec<Run>>,
    coop_runs: ViewState<Vec<CoopRun>>,
}

impl ServiceRunBoard {
    pub fn new(client: QueryClient) -> Self {
        let stale = StaleKeys::new(client.cache().clone());
        Self {
            client,
            token: CancellationToken::new(),
            stale,
            status_filter: None,
            tab: BoardTab::default(),
            runs: ViewState::Idle,
            coop_runs: ViewState::Idle,
        }
    }

    fn runs_url(&self) -> String {
        Endpoint::new(RUNS_PATH, vec![])
            .with_query("status", self.status_filter.as_deref())
            .to_url()
    }

    pub async fn load(&mut self) {
        self.runs.begin_loading();
        self.coop_runs.begin_loading();
        let runs_url = self.runs_url();
        self.stale.watch(&runs_url);
        self.stale.watch(COOP_RUNS_PATH);
        let (runs, coop_runs) = futures::join!(
            self.client.fetch::<RunList>(&runs_url, &self.token),
            self.client.fetch::<CoopRunList>(COOP_RUNS_PATH, &self.token),
        );
        self.runs.resolve(runs.map(|list| list.runs));
        self.coop_runs.resolve(coop_runs.map(|list| list.coop_runs));
    }

    async fn load_runs(&mut self) {
        self.runs.begin_loading();
        let runs_url = self.runs_url();
        self.stale.watch(&runs_url);
        let runs = self.client.fetch::<RunList>(&runs_url, &self.token).await;
        self.runs.resolve(runs.map(|list| list.runs));
    }

    async fn load_coop_runs(&mut self) {
        self.coop_runs.begin_loading();
        let coop_runs = self
            .client
            .fetch::<CoopRunList>(COOP_RUNS_PATH, &self.token)
            .await;
        self.coop_runs.resolve(coop_runs.map(|list| list.coop_runs));
    }

    /// Only the bidding list is filtered; coop runs are left alone.
    pub async fn set_status_filter(&mut self, status: Option<&str>) {
        let status = status.filter(|s| !s.is_empty()).map(str::to_string);
        if status == self.status_filter {
            return;
        }
        let previous = self.runs_url();
        self.status_filter = status;
        self.stale.unwatch(&previous);
        info!("service-run filter changed to {:?}", self.status_filter);
        self.load_runs().await;
    }

    pub async fn retry(&mut self) {
        if self.runs.can_retry() {
            self.load_runs().await;
        }
        if self.coop_runs.can_retry() {
            self.load_coop_runs().await;
        }
    }

    /// Reloads whichever list was invalidated by a mutation elsewhere.
    pub async fn refresh_stale(&mut self) {
        if self.stale.take(&self.runs_url()) {
            self.load_runs().await;
        }
        if self.stale.take(COOP_RUNS_PATH) {
            self.load_coop_runs().await;
        }
    }

    pub fn select_tab(&mut self, tab: BoardTab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> BoardTab {
        self.tab
    }

    pub fn status_filter(&self) -> Option<&str> {
        self.status_filter.as_deref()
    }

    pub fn runs(&self) -> &ViewState<Vec<Run>> {
        &self.runs
    }

    pub fn coop_runs(&self) -> &ViewState<Vec<CoopRun>> {
        &self.coop_runs
    }

    /// Computed over whatever has loaded so far.
    pub fn stats(&self) -> RunStats {
        compute_stats(
            self.runs.data().map(Vec::as_slice).unwrap_or(&[]),
            self.coop_runs.data().map(Vec::as_slice).unwrap_or(&[]),
        )
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}

/// Detail page of one bidding run with its slots and bids.
pub struct RunDetailView {
    client: QueryClient,
    token: CancellationToken,
    slug: String,
    detail: ViewState<RunDetail>,
    selected_slot: Option<String>,
}

impl RunDetailView {
    pub fn new(client: QueryClient, slug: &str) -> Self {
        Self {
            client,
            token: CancellationToken::new(),
            slug: slug.to_string(),
            detail: ViewState::Idle,
            selected_slot: None,
        }
    }

    fn url(&self) -> String {
        let slug = ReqParam::new(":slug", self.slug.as_str());
        Endpoint::new(&format!("{}/:slug", RUNS_PATH), vec![slug]).to_url()
    }

    pub async fn load(&mut self) {
        self.detail.begin_loading();
        let detail = self.client.fetch::<RunDetail>(&self.url(), &self.token).await;
        self.detail.resolve(detail);
    }

    pub async fn retry(&mut self) {
        if self.detail.can_retry() {
            self.load().await;
        }
    }

    pub fn detail(&self) -> &ViewState<RunDetail> {
        &self.detail
    }

    pub fn progress(&self) -> Option<SlotProgress> {
        self.detail.data().map(|detail| run_progress(&detail.run))
    }

    pub fn offered_action(&self) -> Option<RunAction> {
        self.detail
            .data()
            .and_then(|detail| RunAction::for_status(&detail.run.status))
    }

    /// Local selection only; unknown ids clear the selection.
    pub fn select_slot(&mut self, slot_id: Option<&str>) {
        self.selected_slot = slot_id
            .filter(|id| {
                self.detail
                    .data()
                    .is_some_and(|detail| detail.slots.iter().any(|slot| slot.id == *id))
            })
            .map(str::to_string);
    }

    pub fn selected_slot(&self) -> Option<&Slot> {
        let id = self.selected_slot.as_deref()?;
        self.detail.data()?.slots.iter().find(|slot| slot.id == id)
    }

    pub fn bids(&self) -> &[Bid] {
        self.detail
            .data()
            .map(|detail| detail.bids.as_slice())
            .unwrap_or(&[])
    }

    /// Lowest mobilization quote among bids still in play.
    pub fn best_bid(&self) -> Option<&Bid> {
        self.bids()
            .iter()
            .filter(|bid| bid.status != "rejected")
            .min_by(|a, b| a.mobilization_cost.total_cmp(&b.mobilization_cost))
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}

/// Read-through view of one coop run; share and threshold come from the server.
pub struct CoopRunDetailView {
    client: QueryClient,
    token: CancellationToken,
    id: String,
    coop_run: ViewState<CoopRun>,
}

impl CoopRunDetailView {
    pub fn new(client: QueryClient, id: &str) -> Self {
        Self {
            client,
            token: CancellationToken::new(),
            id: id.to_string(),
            coop_run: ViewState::Idle,
        }
    }

    pub async fn load(&mut self) {
        self.coop_run.begin_loading();
        let id = ReqParam::new(":id", self.id.as_str());
        let url = Endpoint::new(&format!("{}/:id", COOP_RUNS_PATH), vec![id]).to_url();
        let detail = self.client.fetch::<CoopRunDetail>(&url, &self.token).await;
        self.coop_run.resolve(detail.map(|detail| detail.coop_run));
    }

    pub fn coop_run(&self) -> &ViewState<CoopRun> {
        &self.coop_run
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GENERIC_LOAD_ERROR;
    use crate::http::HttpMethod;
    use crate::testing::ScriptedTransport;
    use serde_json::{json, Value};

    fn run_json(slug: &str, status: &str, current: u32, revenue: f64) -> Value {
        json!({
            "id": format!("id-{slug}"),
            "slug": slug,
            "title": format!("Run {slug}"),
            "minSlots": 5,
            "maxSlots": 10,
            "currentSlots": current,
            "status": status,
            "totalEstimatedRevenue": revenue
        })
    }

    fn script_board(transport: &ScriptedTransport) {
        transport.reply(
            HttpMethod::GET,
            RUNS_PATH,
            200,
            json!({"runs": [
                run_json("a", "collecting", 3, 1200.0),
                run_json("b", "bidding", 6, 800.0),
                run_json("c", "bid_review", 8, 500.0),
            ]}),
        );
        transport.reply(
            HttpMethod::GET,
            COOP_RUNS_PATH,
            200,
            json!({"coop_runs": [{
                "id": "c-1",
                "trade_category": "chimney",
                "status": "forming",
                "current_member_count": 4,
                "mobilization_share": 75.0,
                "threshold_met": true
            }]}),
        );
    }

    #[tokio::test]
    async fn board_loads_both_tracks_and_rolls_up() {
        let transport = ScriptedTransport::new();
        script_board(&transport);
        let mut board = ServiceRunBoard::new(transport.client());
        board.load().await;

        let stats = board.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.collecting, 1);
        assert_eq!(stats.bidding, 2);
        assert_eq!(stats.total_revenue, 2500.0);
        assert_eq!(stats.total_slots, 3 + 6 + 8 + 4);
    }

    #[tokio::test]
    async fn filter_change_refetches_runs_only() {
        let transport = ScriptedTransport::new();
        script_board(&transport);
        transport.reply(
            HttpMethod::GET,
            "/api/service-runs/runs?status=bidding",
            200,
            json!({"runs": [run_json("b", "bidding", 6, 800.0)]}),
        );
        let mut board = ServiceRunBoard::new(transport.client());
        board.load().await;
        board.set_status_filter(Some("bidding")).await;

        assert_eq!(board.runs().data().map(Vec::len), Some(1));
        assert_eq!(transport.count(HttpMethod::GET, "/api/service-runs/runs?status=bidding"), 1);
        assert_eq!(transport.count(HttpMethod::GET, COOP_RUNS_PATH), 1);

        board.set_status_filter(Some("bidding")).await;
        assert_eq!(transport.total(), 3);
    }

    #[tokio::test]
    async fn failed_list_offers_retry() {
        let transport = ScriptedTransport::new();
        script_board(&transport);
        transport.fail(RUNS_PATH, "connection reset");
        let mut board = ServiceRunBoard::new(transport.client());
        board.load().await;

        assert_eq!(board.runs().error(), Some(GENERIC_LOAD_ERROR));
        assert!(board.coop_runs().data().is_some());

        transport.heal(RUNS_PATH);
        board.retry().await;
        assert_eq!(board.runs().data().map(Vec::len), Some(3));
        assert_eq!(transport.count(HttpMethod::GET, COOP_RUNS_PATH), 1);
    }

    #[tokio::test]
    async fn empty_board_is_not_an_error() {
        let transport = ScriptedTransport::new();
        transport.reply(HttpMethod::GET, RUNS_PATH, 200, json!({"runs": []}));
        transport.reply(HttpMethod::GET, COOP_RUNS_PATH, 200, json!({"coop_runs": []}));
        let mut board = ServiceRunBoard::new(transport.client());
        board.load().await;
        assert!(board.runs().is_empty_state());
        assert_eq!(board.stats(), RunStats::default());
    }

    #[tokio::test]
    async fn invalidated_list_is_reloaded_on_refresh() {
        let transport = ScriptedTransport::new();
        script_board(&transport);
        let client = transport.client();
        let mut board = ServiceRunBoard::new(client.clone());
        board.load().await;

        board.refresh_stale().await;
        assert_eq!(transport.count(HttpMethod::GET, COOP_RUNS_PATH), 1);

        client.cache().invalidate_prefix(COOP_RUNS_PATH);
        board.refresh_stale().await;
        assert_eq!(transport.count(HttpMethod::GET, COOP_RUNS_PATH), 2);
        assert_eq!(transport.count(HttpMethod::GET, RUNS_PATH), 1);
    }

    #[tokio::test]
    async fn detail_selects_slots_and_offers_action() {
        let transport = ScriptedTransport::new();
        transport.reply(
            HttpMethod::GET,
            "/api/service-runs/runs/septic-north",
            200,
            json!({
                "run": run_json("septic-north", "bidding", 6, 3000.0),
                "slots": [{
                    "id": "s-1",
                    "customerName": "Ari",
                    "propertyAccessType": "water_only",
                    "servicesRequested": ["pump-out"],
                    "status": "confirmed"
                }],
                "bids": [
                    {"id": "b-1", "contractorName": "North Shore", "mobilizationCost": 2100.0, "crewSize": 3, "status": "submitted"},
                    {"id": "b-2", "contractorName": "Islands Septic", "mobilizationCost": 1500.0, "crewSize": 2, "status": "rejected"},
                    {"id": "b-3", "contractorName": "Ferry Pumpers", "mobilizationCost": 1750.0, "crewSize": 2, "status": "shortlisted"}
                ]
            }),
        );
        let mut view = RunDetailView::new(transport.client(), "septic-north");
        view.load().await;

        assert_eq!(view.offered_action(), Some(RunAction::CloseBidding));
        assert_eq!(view.progress().map(|p| p.percent), Some(60.0));
        assert_eq!(view.best_bid().map(|bid| bid.id.as_str()), Some("b-3"));

        view.select_slot(Some("s-1"));
        assert_eq!(view.selected_slot().map(|slot| slot.customer_name.as_str()), Some("Ari"));
        view.select_slot(Some("missing"));
        assert!(view.selected_slot().is_none());
        assert_eq!(transport.total(), 1);
    }

    #[tokio::test]
    async fn missing_run_surfaces_server_message() {
        let transport = ScriptedTransport::new();
        transport.reply(
            HttpMethod::GET,
            "/api/service-runs/runs/gone",
            404,
            json!({"message": "Run not found"}),
        );
        let mut view = RunDetailView::new(transport.client(), "gone");
        view.load().await;
        assert_eq!(view.detail().error(), Some("Run not found"));
    }

    #[tokio::test]
    async fn coop_detail_is_read_through() {
        let transport = ScriptedTransport::new();
        transport.reply(
            HttpMethod::GET,
            "/api/coop-runs/c-7",
            200,
            json!({"coop_run": {
                "id": "c-7",
                "trade_category": "well",
                "status": "contractor_claimed",
                "current_member_count": 6,
                "mobilization_fee_total": 1200.0,
                "mobilization_share": 200.0,
                "threshold_met": true
            }}),
        );
        let mut view = CoopRunDetailView::new(transport.client(), "c-7");
        view.load().await;
        let coop = view.coop_run().data().unwrap();
        assert_eq!(coop.mobilization_share, Some(200.0));
        assert!(coop.threshold_met);
    }

    #[tokio::test]
    async fn teardown_drops_late_responses() {
        let transport = ScriptedTransport::new();
        script_board(&transport);
        let mut board = ServiceRunBoard::new(transport.client());
        board.teardown();
        board.load().await;
        assert!(board.runs().is_loading());
        assert!(board.coop_runs().is_loading());
    }
}
