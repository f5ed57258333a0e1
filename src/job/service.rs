use crate::api::ApiError;
use crate::forms::{FieldError, FieldErrors};
use crate::http::{Endpoint, HttpMethod, ReqParam};
use crate::job::model::{Conversation, Message, NewMessage, SentMessage};
use crate::query::QueryClient;
use crate::view::ViewState;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const CONVERSATION_PATH: &str = "/api/jobs/:jobId/applications/:applicationId/conversation";

/// Chat between a job poster and one applicant.
///
/// A sent message is shown as soon as the server echoes it. The full
/// conversation is then refetched in the background and, once
/// [`ConversationPanel::reconcile`] applies it, the server's list replaces
/// the local one.
pub struct ConversationPanel {
    client: QueryClient,
    token: CancellationToken,
    url: String,
    conversation: ViewState<Conversation>,
    sync: Option<JoinHandle<Result<Conversation, ApiError>>>,
}

impl ConversationPanel {
    pub fn new(client: QueryClient, job_id: &str, application_id: &str) -> Self {
        let url = Endpoint::new(
            CONVERSATION_PATH,
            vec![
                ReqParam::new(":jobId", job_id),
                ReqParam::new(":applicationId", application_id),
            ],
        )
        .to_url();
        Self {
            client,
            token: CancellationToken::new(),
            url,
            conversation: ViewState::Idle,
            sync: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn load(&mut self) {
        self.conversation.begin_loading();
        let conversation = self.client.fetch::<Conversation>(&self.url, &self.token).await;
        self.conversation.resolve(conversation);
    }

    pub async fn retry(&mut self) {
        if self.conversation.can_retry() {
            self.load().await;
        }
    }

    pub async fn send(&mut self, body: &str) -> Result<Message, ApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ApiError::Validation(FieldErrors(vec![FieldError {
                field: "body",
                message: "Message cannot be empty".to_string(),
            }])));
        }
        let payload = serde_json::to_value(NewMessage { body })
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let sent = self
            .client
            .mutate::<SentMessage>(
                HttpMethod::POST,
                &format!("{}/messages", self.url),
                Some(payload),
                &[self.url.as_str()],
                &self.token,
            )
            .await?;

        if let Some(conversation) = self.conversation.data_mut() {
            conversation.append(sent.message.clone());
        }
        self.start_sync();
        Ok(sent.message)
    }

    fn start_sync(&mut self) {
        if let Some(previous) = self.sync.take() {
            previous.abort();
        }
        let client = self.client.clone();
        let token = self.token.clone();
        let url = self.url.clone();
        self.sync = Some(tokio::spawn(async move {
            client.refetch::<Conversation>(&url, &token).await
        }));
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Applies the background refetch. A failed refetch keeps what is shown.
    pub async fn reconcile(&mut self) {
        let Some(handle) = self.sync.take() else {
            return;
        };
        match handle.await {
            Ok(Ok(conversation)) => {
                debug!("conversation {} reconciled with server", conversation.id);
                self.conversation = ViewState::Success(conversation);
            }
            Ok(Err(err)) if err.is_cancelled() => {}
            Ok(Err(err)) => warn!("background refetch of {} failed: {}", self.url, err),
            Err(err) => warn!("background refetch of {} did not finish: {}", self.url, err),
        }
    }

    pub async fn mark_read(&mut self) -> Result<(), ApiError> {
        self.client
            .mutate::<Value>(
                HttpMethod::POST,
                &format!("{}/mark-read", self.url),
                None,
                &[self.url.as_str()],
                &self.token,
            )
            .await?;
        let conversation = self.client.fetch::<Conversation>(&self.url, &self.token).await;
        self.conversation.resolve(conversation);
        Ok(())
    }

    pub fn conversation(&self) -> &ViewState<Conversation> {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation
            .data()
            .map(|conversation| conversation.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn teardown(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.sync.take() {
            handle.abort();
        }
    }
}
