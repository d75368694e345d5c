//! Background AI task dispatch.
//!
//! One logical request at a time: submission validates synchronously (empty
//! input, missing credential, already running), then the provider call runs
//! on a spawned task and delivers exactly one outcome over a oneshot
//! channel. The in-flight flag clears before delivery, so the dispatcher is
//! reusable the moment the outcome arrives. No retries, no timeout, no
//! cancellation of the underlying request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use genstudio_config::api_keys;
use genstudio_config::constants::defaults;
use genstudio_config::models::{ModelPreset, Provider};
use genstudio_config::settings::SettingsStore;
use tokio::sync::oneshot;

use crate::llm::factory::{ProviderFactory, default_factory};
use crate::llm::provider::CompletionRequest;
use crate::prompts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMode {
    /// Transform the active code buffer per the user's instruction.
    CodeTransform,
    /// Explain, summarize, or quiz over document material.
    DocumentAnalysis,
    /// Whole-buffer refactor; carries the buffer's language tag.
    Refactor { language: String },
}

#[derive(Debug, Clone)]
pub struct Task {
    pub mode: TaskMode,
    pub preset: &'static ModelPreset,
    pub content: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Exactly one of these is delivered per accepted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    #[error("nothing to process: the input is empty")]
    EmptyInput,
    #[error("API key for {} is not configured", .0.label())]
    MissingCredential(Provider),
    #[error("a task is already running")]
    Busy,
}

pub struct TaskDispatcher {
    factory: ProviderFactory,
    settings: Option<SettingsStore>,
    in_flight: Arc<AtomicBool>,
    state: Arc<Mutex<TaskState>>,
}

impl TaskDispatcher {
    pub fn new() -> Self {
        Self::with_factory(default_factory())
    }

    /// Construct with a custom provider factory. Tests use this to
    /// substitute canned providers.
    pub fn with_factory(factory: ProviderFactory) -> Self {
        Self {
            factory,
            settings: SettingsStore::default_location(),
            in_flight: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(TaskState::Pending)),
        }
    }

    pub fn with_settings_store(mut self, store: Option<SettingsStore>) -> Self {
        self.settings = store;
        self
    }

    pub fn state(&self) -> TaskState {
        self.state.lock().map(|state| *state).unwrap_or(TaskState::Failed)
    }

    fn set_state(state: &Arc<Mutex<TaskState>>, value: TaskState) {
        if let Ok(mut guard) = state.lock() {
            *guard = value;
        }
    }

    fn build_prompt(task: &Task) -> String {
        match &task.mode {
            TaskMode::CodeTransform => prompts::code_prompt(&task.instruction, &task.content),
            TaskMode::DocumentAnalysis => {
                prompts::document_prompt(&task.instruction, &task.content)
            }
            TaskMode::Refactor { language } => {
                prompts::refactor_prompt(language, &task.content)
            }
        }
    }

    fn max_tokens_for(task: &Task) -> Option<u32> {
        // Only the Anthropic API requires an explicit ceiling.
        if task.preset.provider != Provider::Anthropic {
            return None;
        }
        Some(match task.mode {
            TaskMode::Refactor { .. } => defaults::REFACTOR_MAX_TOKENS,
            _ => defaults::ANTHROPIC_DEFAULT_MAX_TOKENS,
        })
    }

    /// Validate and launch a task. All failures here are synchronous; once
    /// `Ok` is returned, exactly one [`TaskOutcome`] will arrive on the
    /// receiver.
    pub fn submit(&self, task: Task) -> Result<oneshot::Receiver<TaskOutcome>, TaskError> {
        if task.content.trim().is_empty() {
            return Err(TaskError::EmptyInput);
        }

        let provider_kind = task.preset.provider;
        let api_key = api_keys::resolve_api_key(provider_kind, self.settings.as_ref())
            .ok_or(TaskError::MissingCredential(provider_kind))?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TaskError::Busy);
        }

        let prompt = Self::build_prompt(&task);
        let mut request = CompletionRequest::new(prompt).with_model(task.preset.model);
        if let Some(max_tokens) = Self::max_tokens_for(&task) {
            request = request.with_max_tokens(max_tokens);
        }

        let provider = (self.factory)(task.preset, api_key);
        Self::set_state(&self.state, TaskState::Running);
        tracing::debug!(
            provider = provider_kind.as_str(),
            model = task.preset.model,
            "task submitted"
        );

        let (sender, receiver) = oneshot::channel();
        let in_flight = Arc::clone(&self.in_flight);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = match provider.generate(request).await {
                Ok(response) => {
                    Self::set_state(&state, TaskState::Succeeded);
                    TaskOutcome::Success(response.content)
                }
                Err(err) => {
                    tracing::warn!("task failed: {err}");
                    Self::set_state(&state, TaskState::Failed);
                    TaskOutcome::Error(err.to_string())
                }
            };

            // Clear before delivery so a listener reacting to the outcome
            // can immediately submit again.
            in_flight.store(false, Ordering::SeqCst);
            let _ = sender.send(outcome);
        });

        Ok(receiver)
    }
}

impl Default for TaskDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{
        CompletionRequest, CompletionResponse, LLMError, LLMProvider,
    };
    use async_trait::async_trait;
    use genstudio_config::models::find_preset;
    use serial_test::serial;
    use std::env;
    use std::time::Duration;

    struct StubProvider {
        reply: Result<String, String>,
        hold: Option<Arc<tokio::sync::Notify>>,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    #[async_trait]
    impl LLMProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LLMError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request);
            }
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                }),
                Err(message) => Err(LLMError::Network(message.clone())),
            }
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["stub-model".to_string()]
        }
    }

    struct Fixture {
        dispatcher: TaskDispatcher,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
        hold: Arc<tokio::sync::Notify>,
    }

    fn fixture(reply: Result<String, String>, held: bool) -> Fixture {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hold = Arc::new(tokio::sync::Notify::new());
        let factory_seen = Arc::clone(&seen);
        let factory_hold = held.then(|| Arc::clone(&hold));

        let factory: ProviderFactory = Box::new(move |_, _| {
            Box::new(StubProvider {
                reply: reply.clone(),
                hold: factory_hold.clone(),
                seen: Arc::clone(&factory_seen),
            })
        });

        Fixture {
            dispatcher: TaskDispatcher::with_factory(factory).with_settings_store(None),
            seen,
            hold,
        }
    }

    fn task_with(preset_label: &str, mode: TaskMode) -> Task {
        Task {
            mode,
            preset: find_preset(preset_label).unwrap(),
            content: "fn main() {}".to_string(),
            instruction: "Explain".to_string(),
        }
    }

    fn set_key(provider: Provider) {
        unsafe {
            env::set_var(provider.default_api_key_env(), "test-key");
        }
    }

    fn clear_key(provider: Provider) {
        unsafe {
            env::remove_var(provider.default_api_key_env());
        }
    }

    #[tokio::test]
    #[serial]
    async fn empty_input_is_rejected_synchronously() {
        set_key(Provider::OpenAI);
        let fixture = fixture(Ok("never".into()), false);

        let mut task = task_with("OpenAI: GPT-4o", TaskMode::CodeTransform);
        task.content = "   \n\t ".to_string();

        let err = fixture.dispatcher.submit(task).unwrap_err();
        assert!(matches!(err, TaskError::EmptyInput));
        assert!(fixture.seen.lock().unwrap().is_empty());
        clear_key(Provider::OpenAI);
    }

    #[tokio::test]
    #[serial]
    async fn missing_credential_is_rejected_synchronously() {
        clear_key(Provider::Perplexity);
        let fixture = fixture(Ok("never".into()), false);

        let task = task_with("Perplexity: Sonar Large", TaskMode::DocumentAnalysis);
        let err = fixture.dispatcher.submit(task).unwrap_err();
        assert!(matches!(
            err,
            TaskError::MissingCredential(Provider::Perplexity)
        ));
        assert!(fixture.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn success_delivers_provider_text_verbatim() {
        set_key(Provider::OpenAI);
        let fixture = fixture(Ok("the answer".into()), false);

        let receiver = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap();
        let outcome = receiver.await.unwrap();

        assert_eq!(outcome, TaskOutcome::Success("the answer".to_string()));
        assert_eq!(fixture.dispatcher.state(), TaskState::Succeeded);
        clear_key(Provider::OpenAI);
    }

    #[tokio::test]
    #[serial]
    async fn failure_delivers_one_error_and_dispatcher_recovers() {
        set_key(Provider::OpenAI);
        let fixture = fixture(Err("connection refused".into()), false);

        let receiver = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap();
        let outcome = receiver.await.unwrap();

        match outcome {
            TaskOutcome::Error(message) => assert!(message.contains("connection refused")),
            other => panic!("expected error outcome, got {other:?}"),
        }
        assert_eq!(fixture.dispatcher.state(), TaskState::Failed);

        // A new task is accepted after the failure.
        let receiver = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap();
        let _ = receiver.await.unwrap();
        clear_key(Provider::OpenAI);
    }

    #[tokio::test]
    #[serial]
    async fn second_submit_while_running_is_busy() {
        set_key(Provider::OpenAI);
        let fixture = fixture(Ok("slow reply".into()), true);

        let receiver = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap();

        // Wait until the provider call is actually in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fixture.dispatcher.state(), TaskState::Running);

        let err = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap_err();
        assert!(matches!(err, TaskError::Busy));

        fixture.hold.notify_one();
        let outcome = receiver.await.unwrap();
        assert_eq!(outcome, TaskOutcome::Success("slow reply".to_string()));

        // Accepted again after completion.
        let fixture2_task = task_with("OpenAI: GPT-4o", TaskMode::CodeTransform);
        fixture.hold.notify_one();
        let receiver = fixture.dispatcher.submit(fixture2_task).unwrap();
        let _ = receiver.await.unwrap();
        clear_key(Provider::OpenAI);
    }

    #[tokio::test]
    #[serial]
    async fn anthropic_requests_carry_mode_specific_ceilings() {
        set_key(Provider::Anthropic);

        let fixture = fixture(Ok("ok".into()), false);
        let receiver = fixture
            .dispatcher
            .submit(task_with(
                "Anthropic: Claude 3.5 Sonnet",
                TaskMode::CodeTransform,
            ))
            .unwrap();
        let _ = receiver.await.unwrap();

        let receiver = fixture
            .dispatcher
            .submit(task_with(
                "Anthropic: Claude 3.5 Sonnet",
                TaskMode::Refactor {
                    language: "rust".to_string(),
                },
            ))
            .unwrap();
        let _ = receiver.await.unwrap();

        let seen = fixture.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, Some(4096));
        assert_eq!(seen[1].max_tokens, Some(8192));
        clear_key(Provider::Anthropic);
    }

    #[tokio::test]
    #[serial]
    async fn non_anthropic_requests_carry_no_ceiling() {
        set_key(Provider::Gemini);
        let fixture = fixture(Ok("ok".into()), false);

        let receiver = fixture
            .dispatcher
            .submit(task_with(
                "Google: Gemini 2.5 Flash",
                TaskMode::CodeTransform,
            ))
            .unwrap();
        let _ = receiver.await.unwrap();

        let seen = fixture.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, None);
        clear_key(Provider::Gemini);
    }

    #[tokio::test]
    #[serial]
    async fn prompt_carries_system_and_user_parts() {
        set_key(Provider::OpenAI);
        let fixture = fixture(Ok("ok".into()), false);

        let receiver = fixture
            .dispatcher
            .submit(task_with("OpenAI: GPT-4o", TaskMode::CodeTransform))
            .unwrap();
        let _ = receiver.await.unwrap();

        let seen = fixture.seen.lock().unwrap();
        let prompt = &seen[0].prompt;
        assert!(prompt.starts_with("You are an Expert Software Architect.\n\n"));
        assert!(prompt.contains("Instruction: Explain"));
        assert!(prompt.contains("Code Context:\nfn main() {}"));
        clear_key(Provider::OpenAI);
    }
}
