use crate::config::GatewayEnvironment;
use crate::domain::error::{CheckoutError, SdkLoadError};
use crate::domain::order::CustomerEcho;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    SdkLoading,
    SdkReady,
    CheckingOut,
    Success,
    Failed,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    SelfFrame,
    Popup,
}

#[async_trait::async_trait]
pub trait CheckoutSdk: Send + Sync {
    async fn checkout(&self, session_id: &str, target: RedirectTarget) -> Result<(), CheckoutError>;
}

#[async_trait::async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self, environment: GatewayEnvironment) -> Result<Box<dyn CheckoutSdk>, SdkLoadError>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Duration,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: Option<String>,
    pub environment: GatewayEnvironment,
}

pub struct CheckoutInitiator {
    loader: Arc<dyn SdkLoader>,
    navigator: Arc<dyn Navigator>,
    policy: LoadPolicy,
    fallback_base: String,
    state: CheckoutState,
    sdk: Option<(GatewayEnvironment, Box<dyn CheckoutSdk>)>,
    last_error: Option<CheckoutError>,
}

impl CheckoutInitiator {
    pub fn new(
        loader: Arc<dyn SdkLoader>,
        navigator: Arc<dyn Navigator>,
        policy: LoadPolicy,
        fallback_base: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            navigator,
            policy,
            fallback_base: fallback_base.into(),
            state: CheckoutState::Idle,
            sdk: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn last_error(&self) -> Option<&CheckoutError> {
        self.last_error.as_ref()
    }

    /// Attempts run one at a time. A timed-out attempt's future is dropped, so
    /// a load that completes late can never install a second handle.
    pub async fn preload(&mut self, environment: GatewayEnvironment) -> Result<(), SdkLoadError> {
        if matches!(&self.sdk, Some((env, _)) if *env == environment) {
            self.state = CheckoutState::SdkReady;
            return Ok(());
        }
        self.sdk = None;
        self.state = CheckoutState::SdkLoading;

        let mut last_error = SdkLoadError::Script("sdk was never requested".to_string());
        for attempt in 1..=self.policy.max_attempts {
            match tokio::time::timeout(self.policy.attempt_timeout, self.loader.load(environment)).await {
                Ok(Ok(sdk)) => {
                    tracing::info!(attempt, environment = environment.sdk_mode(), "checkout sdk loaded");
                    self.sdk = Some((environment, sdk));
                    self.state = CheckoutState::SdkReady;
                    return Ok(());
                }
                Ok(Err(e)) => last_error = e,
                Err(_) => last_error = SdkLoadError::Timeout(self.policy.attempt_timeout),
            }
            tracing::warn!(
                attempt,
                max_attempts = self.policy.max_attempts,
                error = %last_error,
                "checkout sdk load failed"
            );
            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        self.state = CheckoutState::Failed;
        Err(last_error)
    }

    pub async fn start(&mut self, session: &CheckoutSession, customer: &CustomerEcho) -> CheckoutState {
        let Some(session_id) = session.session_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            return self.fall_back(customer, CheckoutError::MissingSession);
        };

        if let Err(e) = self.preload(session.environment).await {
            return self.fall_back(customer, e.into());
        }

        self.state = CheckoutState::CheckingOut;
        let result = match &self.sdk {
            Some((_, sdk)) => sdk.checkout(session_id, RedirectTarget::SelfFrame).await,
            None => Err(CheckoutError::SdkLoad(SdkLoadError::Script(
                "sdk handle missing after load".to_string(),
            ))),
        };

        match result {
            Ok(()) => {
                self.state = CheckoutState::Success;
                self.state
            }
            Err(e) => self.fall_back(customer, e),
        }
    }

    pub fn fall_back(&mut self, customer: &CustomerEcho, error: CheckoutError) -> CheckoutState {
        tracing::warn!(error = %error, "checkout failed, redirecting to hosted form");
        self.state = CheckoutState::Failed;
        self.last_error = Some(error);

        let url = prefilled_fallback_url(&self.fallback_base, customer);
        self.navigator.navigate(&url);
        self.state = CheckoutState::Fallback;
        self.state
    }
}

pub fn prefilled_fallback_url(base: &str, customer: &CustomerEcho) -> String {
    let fields = [
        ("name", customer.name.trim()),
        ("email", customer.email.trim()),
        ("phone", customer.phone.trim()),
    ];
    let present: Vec<(&str, &str)> = fields.into_iter().filter(|(_, v)| !v.is_empty()).collect();
    if present.is_empty() {
        return base.to_string();
    }

    match url::Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(&present);
            url.to_string()
        }
        Err(_) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&present)
                .finish();
            format!("{}?{}", base, query)
        }
    }
}
