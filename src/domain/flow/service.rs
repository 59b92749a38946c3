use super::error::FlowServiceError;
use super::{AppStep, Flow, FlowView, Interstitial};
use crate::domain::replies::{ChatImage, ReplyServiceApi, ReplyServiceError, UserConfig};
use crate::domain::user::UserSession;
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

const MAX_FLOWS: u64 = 10_000;

type SharedFlow = Arc<Mutex<Flow>>;

#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub interstitial_seconds: i64,
    pub max_image_bytes: usize,
    pub idle_timeout: Duration,
}

impl From<&Config> for FlowSettings {
    fn from(config: &Config) -> Self {
        Self {
            interstitial_seconds: config.interstitial_seconds,
            max_image_bytes: config.max_image_bytes,
            idle_timeout: Duration::from_secs(config.flow_idle_minutes * 60),
        }
    }
}

/// Screenshot as it arrived over HTTP
#[derive(Debug, Clone)]
pub enum ImageUpload {
    DataUrl(String),
    File {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

pub struct FlowService {
    replies: Arc<dyn ReplyServiceApi>,
    flows: Cache<Uuid, SharedFlow>,
    settings: FlowSettings,
}

impl FlowService {
    pub fn new(replies: Arc<dyn ReplyServiceApi>, settings: FlowSettings) -> Self {
        let flows = Cache::builder()
            .max_capacity(MAX_FLOWS)
            .time_to_idle(settings.idle_timeout)
            .build();

        Self {
            replies,
            flows,
            settings,
        }
    }

    async fn load(&self, flow_id: Uuid) -> Result<SharedFlow, FlowServiceError> {
        self.flows
            .get(&flow_id)
            .await
            .ok_or(FlowServiceError::NotFound)
    }

    fn commit(flow: &mut Flow) -> FlowView {
        flow.revision += 1;
        flow.updated_at = Utc::now();
        flow.view()
    }

    /// Record the failure on the flow and hand it back to the caller
    fn fail(flow: &mut Flow, err: FlowServiceError) -> FlowServiceError {
        flow.error = Some(err.user_message());
        flow.updated_at = Utc::now();
        err
    }

    fn require_step(
        flow: &Flow,
        action: &'static str,
        allowed: &[AppStep],
    ) -> Result<(), FlowServiceError> {
        if allowed.contains(&flow.step) {
            Ok(())
        } else {
            Err(FlowServiceError::InvalidStep {
                action,
                step: flow.step,
            })
        }
    }
}

#[async_trait]
pub trait FlowServiceApi: Send + Sync {
    async fn create(&self) -> FlowView;

    async fn get(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError>;

    /// Extract the transcript from a screenshot and move on to editing
    async fn submit_image(
        &self,
        flow_id: Uuid,
        upload: ImageUpload,
    ) -> Result<FlowView, FlowServiceError>;

    async fn update_transcript(
        &self,
        flow_id: Uuid,
        transcript: String,
    ) -> Result<FlowView, FlowServiceError>;

    async fn advance(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError>;

    async fn update_config(
        &self,
        flow_id: Uuid,
        config: UserConfig,
    ) -> Result<FlowView, FlowServiceError>;

    /// Generate replies; free sessions get a countdown before results unlock
    async fn generate(
        &self,
        flow_id: Uuid,
        session: &UserSession,
    ) -> Result<FlowView, FlowServiceError>;

    async fn complete_gate(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError>;

    async fn back(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError>;

    async fn reset(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError>;
}

#[async_trait]
impl FlowServiceApi for FlowService {
    async fn create(&self) -> FlowView {
        let flow = Flow::new();
        let (id, view) = (flow.id, flow.view());
        self.flows.insert(id, Arc::new(Mutex::new(flow))).await;
        tracing::debug!(flow_id = %id, "Flow created");
        view
    }

    async fn get(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let flow = entry.lock().await;
        Ok(flow.view())
    }

    async fn submit_image(
        &self,
        flow_id: Uuid,
        upload: ImageUpload,
    ) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;

        // The model call runs unlocked; the revision tells us if anyone moved the flow meanwhile
        let (image, revision) = {
            let mut flow = entry.lock().await;
            if let Err(e) = Self::require_step(&flow, "upload an image", &[AppStep::Upload]) {
                return Err(Self::fail(&mut flow, e));
            }

            let max_bytes = self.settings.max_image_bytes;
            let parsed = match upload {
                ImageUpload::DataUrl(url) => ChatImage::from_data_url(&url, max_bytes),
                ImageUpload::File {
                    bytes,
                    content_type,
                } => ChatImage::from_bytes(&bytes, content_type.as_deref(), max_bytes),
            };

            flow.image = None;
            match parsed {
                Ok(image) => (image, flow.revision),
                Err(e) => {
                    tracing::warn!(flow_id = %flow_id, error = %e, "Rejected screenshot");
                    return Err(Self::fail(&mut flow, e.into()));
                }
            }
        };

        let outcome = self.replies.extract_text(&image).await;

        let mut flow = entry.lock().await;
        if flow.revision != revision {
            tracing::warn!(flow_id = %flow_id, "Flow changed during extraction, transcript dropped");
            return Err(FlowServiceError::Superseded);
        }

        match outcome {
            Ok(text) => {
                flow.image = Some(image.to_data_url());
                flow.transcript = text;
                flow.step = AppStep::EditText;
                flow.error = None;
                tracing::info!(
                    flow_id = %flow_id,
                    transcript_length = flow.transcript.len(),
                    "Screenshot extracted"
                );
                Ok(Self::commit(&mut flow))
            }
            Err(e) => Err(Self::fail(&mut flow, e.into())),
        }
    }

    async fn update_transcript(
        &self,
        flow_id: Uuid,
        transcript: String,
    ) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;
        if let Err(e) = Self::require_step(
            &flow,
            "edit the transcript",
            &[AppStep::EditText, AppStep::Configure],
        ) {
            return Err(Self::fail(&mut flow, e));
        }

        flow.transcript = transcript;
        flow.error = None;
        Ok(Self::commit(&mut flow))
    }

    async fn advance(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;
        if let Err(e) = Self::require_step(&flow, "advance", &[AppStep::EditText]) {
            return Err(Self::fail(&mut flow, e));
        }

        flow.step = AppStep::Configure;
        flow.error = None;
        Ok(Self::commit(&mut flow))
    }

    async fn update_config(
        &self,
        flow_id: Uuid,
        config: UserConfig,
    ) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;
        if let Err(msg) = config.validate() {
            let err = FlowServiceError::Reply(ReplyServiceError::Invalid(msg));
            return Err(Self::fail(&mut flow, err));
        }

        flow.config = config;
        flow.error = None;
        Ok(Self::commit(&mut flow))
    }

    async fn generate(
        &self,
        flow_id: Uuid,
        session: &UserSession,
    ) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;

        let (transcript, config, revision) = {
            let mut flow = entry.lock().await;
            if let Err(e) = Self::require_step(&flow, "generate replies", &[AppStep::Configure]) {
                return Err(Self::fail(&mut flow, e));
            }
            (flow.transcript.clone(), flow.config.clone(), flow.revision)
        };

        let outcome = self.replies.generate_replies(&transcript, &config).await;

        let mut flow = entry.lock().await;
        if flow.revision != revision {
            tracing::warn!(flow_id = %flow_id, "Flow changed during generation, replies dropped");
            return Err(FlowServiceError::Superseded);
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Err(Self::fail(&mut flow, e.into())),
        };

        flow.results = Some(response);
        flow.error = None;
        if session.is_pro || self.settings.interstitial_seconds == 0 {
            flow.gate = None;
            flow.step = AppStep::Results;
        } else {
            flow.gate = Some(Interstitial::start(self.settings.interstitial_seconds));
        }

        tracing::info!(
            flow_id = %flow_id,
            user_id = %session.id,
            is_pro = session.is_pro,
            gated = flow.gate.is_some(),
            "Replies ready"
        );

        Ok(Self::commit(&mut flow))
    }

    async fn complete_gate(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;
        let seconds_left = match &flow.gate {
            Some(gate) => gate.seconds_left(),
            None => return Err(Self::fail(&mut flow, FlowServiceError::NoGate)),
        };

        if seconds_left > 0 {
            tracing::debug!(flow_id = %flow_id, seconds_left, "Gate completion refused");
            return Err(FlowServiceError::GateActive(seconds_left));
        }

        flow.gate = None;
        flow.step = AppStep::Results;
        flow.error = None;
        Ok(Self::commit(&mut flow))
    }

    async fn back(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;

        match flow.step {
            AppStep::Upload => {
                let err = FlowServiceError::InvalidStep {
                    action: "go back",
                    step: flow.step,
                };
                return Err(Self::fail(&mut flow, err));
            }
            AppStep::EditText => {
                flow.image = None;
                flow.transcript.clear();
                flow.step = AppStep::Upload;
            }
            AppStep::Configure => {
                flow.results = None;
                flow.gate = None;
                flow.step = AppStep::EditText;
            }
            AppStep::Results => {
                flow.step = AppStep::Configure;
            }
        }

        flow.error = None;
        Ok(Self::commit(&mut flow))
    }

    async fn reset(&self, flow_id: Uuid) -> Result<FlowView, FlowServiceError> {
        let entry = self.load(flow_id).await?;
        let mut flow = entry.lock().await;
        flow.reset();
        Ok(Self::commit(&mut flow))
    }
}
