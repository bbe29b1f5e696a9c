//! The skin check-in form: input validation, the per-session analysis state, and the
//! at-most-one-in-flight rule.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::gemini::{AnalysisBackend, GeminiError};
use crate::prompt::{DEFAULT_IMAGE_MIME, build_request};
use crate::response::{WellnessResponse, parse_reply};

pub const MISSING_INPUT_MESSAGE: &str = "Please provide an image or describe your symptoms.";
pub const SERVICE_ERROR_MESSAGE: &str =
    "Unable to analyze. Please check your connection and try again.";
pub const IN_FLIGHT_MESSAGE: &str =
    "An analysis is already in progress. Please wait for it to finish.";
pub const BUSY_MESSAGE: &str = "We are handling a lot of check-ins right now. Please try again shortly.";
pub const DEFAULT_SESSION_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wraps uploaded bytes; an undeclared type is sent as JPEG.
    pub fn new(mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        Self { mime_type, bytes }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    pub text: String,
    pub image: Option<ImageUpload>,
}

impl AnalysisInput {
    /// True when there is neither a photo nor any non-blank text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Success(WellnessResponse),
    Error(String),
}

impl AnalysisState {
    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing)
    }

    pub fn result(&self) -> Option<&WellnessResponse> {
        match self {
            AnalysisState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no image or symptom text provided")]
    MissingInput,
    #[error("an analysis is already running for this session")]
    InFlight,
    #[error("session board is full of running analyses")]
    Busy,
    #[error(transparent)]
    Service(#[from] GeminiError),
    #[error("analysis task ended unexpectedly")]
    TaskFailed,
}

impl SubmitError {
    /// Fixed text shown to the visitor; service details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::MissingInput => MISSING_INPUT_MESSAGE,
            SubmitError::InFlight => IN_FLIGHT_MESSAGE,
            SubmitError::Busy => BUSY_MESSAGE,
            SubmitError::Service(_) | SubmitError::TaskFailed => SERVICE_ERROR_MESSAGE,
        }
    }
}

/// Analysis state per browser session, bounded by least-recent use.
///
/// Sessions that are mid-analysis are never evicted.
#[derive(Clone)]
pub struct SessionBoard {
    sessions: Arc<Mutex<LruCache<String, AnalysisState>>>,
}

impl SessionBoard {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn state(&self, session: &str) -> AnalysisState {
        self.sessions
            .lock()
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    pub fn in_flight(&self) -> usize {
        self.sessions
            .lock()
            .iter()
            .filter(|(_, state)| state.is_analyzing())
            .count()
    }

    /// Moves `session` to [`AnalysisState::Analyzing`] unless it is already there.
    pub fn try_begin(&self, session: &str) -> Result<InFlight, SubmitError> {
        let mut sessions = self.sessions.lock();
        match sessions.get(session).map(AnalysisState::is_analyzing) {
            Some(true) => return Err(SubmitError::InFlight),
            Some(false) => {}
            None => {
                if sessions.len() >= sessions.cap().get() {
                    let victim = sessions
                        .iter()
                        .rev()
                        .find(|(_, state)| !state.is_analyzing())
                        .map(|(key, _)| key.clone())
                        .ok_or(SubmitError::Busy)?;
                    sessions.pop(&victim);
                }
            }
        }
        sessions.put(session.to_string(), AnalysisState::Analyzing);
        drop(sessions);
        Ok(InFlight {
            board: self.clone(),
            session: session.to_string(),
            finished: false,
        })
    }

    fn finish(&self, session: &str, state: AnalysisState) {
        self.sessions.lock().put(session.to_string(), state);
    }
}

impl Default for SessionBoard {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

/// Claim on a session's analysis slot. Dropping it unfinished records a service error.
pub struct InFlight {
    board: SessionBoard,
    session: String,
    finished: bool,
}

impl InFlight {
    pub fn finish(mut self, state: AnalysisState) {
        self.board.finish(&self.session, state);
        self.finished = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.board.finish(
                &self.session,
                AnalysisState::Error(SERVICE_ERROR_MESSAGE.to_string()),
            );
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn AnalysisBackend>,
    board: SessionBoard,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn AnalysisBackend>, board: SessionBoard) -> Self {
        Self { backend, board }
    }

    pub fn board(&self) -> &SessionBoard {
        &self.board
    }

    /// Runs one analysis without session bookkeeping.
    pub async fn analyze(&self, input: &AnalysisInput) -> Result<WellnessResponse, SubmitError> {
        if input.is_empty() {
            return Err(SubmitError::MissingInput);
        }
        Ok(run_analysis(self.backend.as_ref(), input).await?)
    }

    /// Runs one analysis for `session`, recording the outcome on the session board.
    ///
    /// The call proceeds on its own task, so a caller that goes away does not cancel it; the
    /// result still lands on the board for the next page view.
    pub async fn submit(
        &self,
        session: &str,
        input: AnalysisInput,
    ) -> Result<WellnessResponse, SubmitError> {
        if input.is_empty() {
            return Err(SubmitError::MissingInput);
        }
        let ticket = self.board.try_begin(session)?;
        let backend = Arc::clone(&self.backend);
        let task = tokio::spawn(async move {
            let outcome = run_analysis(backend.as_ref(), &input).await;
            let state = match &outcome {
                Ok(response) => AnalysisState::Success(response.clone()),
                Err(_) => AnalysisState::Error(SERVICE_ERROR_MESSAGE.to_string()),
            };
            ticket.finish(state);
            outcome
        });
        match task.await {
            Ok(outcome) => Ok(outcome?),
            Err(err) => {
                error!(error = %err, "analysis task failed");
                Err(SubmitError::TaskFailed)
            }
        }
    }
}

async fn run_analysis(
    backend: &dyn AnalysisBackend,
    input: &AnalysisInput,
) -> Result<WellnessResponse, GeminiError> {
    let request = build_request(&input.text, input.image.as_ref());
    let reply = match backend.generate(&request).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(error = %err, "analysis request failed");
            return Err(err);
        }
    };
    let text = reply.text.ok_or(GeminiError::EmptyReply)?;
    let response = parse_reply(&text, reply.citations);
    info!(
        has_image = input.image.is_some(),
        text_len = input.text.len(),
        suggestions = response.wellness_suggestions.len(),
        resources = response.resources().len(),
        "analysis complete"
    );
    Ok(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gemini::{GenerateContentRequest, ModelReply};
    use crate::response::Resource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    pub(crate) const REPLY: &str = r#"```json
{"visualInterpretation": "Dry, slightly red patch.", "symptomSummary": "Itchy after swimming.", "wellnessSuggestions": ["Rinse after swimming", "Moisturize <b>twice</b> daily"], "trackableSummary": "Itch 4/10.", "disclaimer": ""}
```"#;

    pub(crate) enum Script {
        Reply,
        Empty,
        Fail,
    }

    pub(crate) struct StubBackend {
        script: Script,
        gate: Option<Arc<Notify>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_request: Mutex<Option<GenerateContentRequest>>,
    }

    impl StubBackend {
        pub(crate) fn new(script: Script) -> Self {
            Self {
                script,
                gate: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn gated(script: Script, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(script)
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisBackend for StubBackend {
        async fn generate(
            &self,
            request: &GenerateContentRequest,
        ) -> Result<ModelReply, GeminiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.script {
                Script::Reply => Ok(ModelReply {
                    text: Some(REPLY.to_string()),
                    citations: vec![
                        Resource::new("Eczema care", "https://www.aad.org/eczema"),
                        Resource::new("Eczema care tips", "https://www.aad.org/eczema"),
                        Resource::new("NEA", "https://nationaleczema.org/"),
                    ],
                }),
                Script::Empty => Ok(ModelReply::default()),
                Script::Fail => Err(GeminiError::Status {
                    status: 503,
                    body: "overloaded".to_string(),
                }),
            }
        }
    }

    fn text_input(text: &str) -> AnalysisInput {
        AnalysisInput {
            text: text.to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn empty_submission_never_calls_backend() {
        let backend = Arc::new(StubBackend::new(Script::Reply));
        let analyzer = Analyzer::new(backend.clone(), SessionBoard::default());

        for input in [text_input(""), text_input("   \n\t")] {
            let err = analyzer.submit("s1", input).await.unwrap_err();
            assert!(matches!(err, SubmitError::MissingInput));
            assert_eq!(err.user_message(), MISSING_INPUT_MESSAGE);
        }
        assert_eq!(backend.calls(), 0);
        assert_eq!(analyzer.board().state("s1"), AnalysisState::Idle);
    }

    #[tokio::test]
    async fn image_alone_is_enough() {
        let backend = Arc::new(StubBackend::new(Script::Reply));
        let analyzer = Analyzer::new(backend.clone(), SessionBoard::default());
        let input = AnalysisInput {
            text: String::new(),
            image: Some(ImageUpload::new(None, vec![0xff, 0xd8])),
        };
        analyzer.submit("s1", input).await.unwrap();
        let request = backend.last_request.lock().clone().unwrap();
        assert!(request.has_image());
    }

    #[tokio::test]
    async fn success_is_recorded_on_board() {
        let backend = Arc::new(StubBackend::new(Script::Reply));
        let analyzer = Analyzer::new(backend.clone(), SessionBoard::default());

        let response = analyzer
            .submit("s1", text_input("itchy after swimming"))
            .await
            .unwrap();
        assert_eq!(response.symptom_summary, "Itchy after swimming.");
        assert_eq!(
            response.resources(),
            &[
                Resource::new("Eczema care tips", "https://www.aad.org/eczema"),
                Resource::new("NEA", "https://nationaleczema.org/"),
            ]
        );
        assert_eq!(
            analyzer.board().state("s1").result(),
            Some(&response)
        );
        assert_eq!(analyzer.board().state("other"), AnalysisState::Idle);
    }

    #[tokio::test]
    async fn service_failure_records_fixed_message() {
        let backend = Arc::new(StubBackend::new(Script::Fail));
        let analyzer = Analyzer::new(backend, SessionBoard::default());
        let err = analyzer.submit("s1", text_input("rash")).await.unwrap_err();
        assert!(matches!(err, SubmitError::Service(GeminiError::Status { status: 503, .. })));
        assert_eq!(err.user_message(), SERVICE_ERROR_MESSAGE);
        assert_eq!(
            analyzer.board().state("s1").error_message(),
            Some(SERVICE_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn empty_reply_is_a_service_error() {
        let analyzer = Analyzer::new(
            Arc::new(StubBackend::new(Script::Empty)),
            SessionBoard::default(),
        );
        let err = analyzer.analyze(&text_input("rash")).await.unwrap_err();
        assert!(matches!(err, SubmitError::Service(GeminiError::EmptyReply)));
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(StubBackend::gated(Script::Reply, gate.clone()));
        let analyzer = Analyzer::new(backend.clone(), SessionBoard::default());

        let first = {
            let analyzer = analyzer.clone();
            tokio::spawn(async move { analyzer.submit("s1", text_input("first")).await })
        };
        while !analyzer.board().state("s1").is_analyzing() {
            tokio::task::yield_now().await;
        }
        assert_eq!(analyzer.board().in_flight(), 1);

        let err = analyzer.submit("s1", text_input("second")).await.unwrap_err();
        assert!(matches!(err, SubmitError::InFlight));
        assert_eq!(err.user_message(), IN_FLIGHT_MESSAGE);

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(backend.calls(), 1);
        assert!(analyzer.board().state("s1").result().is_some());
        assert_eq!(analyzer.board().in_flight(), 0);
    }

    #[test]
    fn dropped_ticket_frees_the_slot() {
        let board = SessionBoard::new(4);
        let ticket = board.try_begin("s1").unwrap();
        assert!(matches!(board.try_begin("s1"), Err(SubmitError::InFlight)));
        drop(ticket);
        assert_eq!(
            board.state("s1").error_message(),
            Some(SERVICE_ERROR_MESSAGE)
        );
        assert!(board.try_begin("s1").is_ok());
    }

    #[test]
    fn full_board_evicts_idle_sessions_only() {
        let board = SessionBoard::new(2);
        board.try_begin("a").unwrap().finish(AnalysisState::Idle);
        let _b = board.try_begin("b").unwrap();

        let _c = board.try_begin("c").unwrap();
        assert!(!board.sessions.lock().contains("a"));
        assert!(board.state("b").is_analyzing());
        assert!(board.state("c").is_analyzing());

        assert!(matches!(board.try_begin("d"), Err(SubmitError::Busy)));
    }

    #[test]
    fn undeclared_image_type_defaults_to_jpeg() {
        assert_eq!(ImageUpload::new(None, vec![]).mime_type, "image/jpeg");
        assert_eq!(ImageUpload::new(Some(" "), vec![]).mime_type, "image/jpeg");
        assert_eq!(ImageUpload::new(Some("image/png"), vec![]).mime_type, "image/png");
    }
}
