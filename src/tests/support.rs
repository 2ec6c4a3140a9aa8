//! Mock providers and a test harness for wiring them into the app.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app::AppState;
use crate::config::{Environment, Settings};
use crate::domain::intent::{Intent, IntentClassification};
use crate::domain::language::DetectedLanguage;
use crate::domain::grading::GradingOutcome;
use crate::domain::quiz::{Difficulty, QuizCreated};
use crate::domain::status::StatusBoard;
use crate::pipeline::ChatOrchestrator;
use crate::services::extractor::DocumentExtractor;
use crate::services::grader::GradingProvider;
use crate::services::intent::IntentClassifier;
use crate::services::moderator::ModerationProvider;
use crate::services::quiz::QuizProvider;
use crate::services::translator::TranslationProvider;
use crate::services::{ExplanationProvider, ProviderError, ResponseCache};

pub fn test_settings() -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        cache_max_entries: 200,
        cache_ttl_seconds: 3600,
        translate_api_url: "http://localhost:1".to_string(),
        translate_api_key: None,
        llm_api_url: "http://localhost:1".to_string(),
        llm_api_key: None,
        llm_model: "test-model".to_string(),
        llm_explain_model: "test-model".to_string(),
        ai_timeout_seconds: 5,
        document_service_url: "http://localhost:1".to_string(),
        document_service_token: None,
        forms_api_url: "http://localhost:1".to_string(),
        forms_api_token: None,
        max_upload_bytes: 15 * 1024 * 1024,
    }
}

/// Translator that reports a fixed detected language and wraps translated
/// text in a `[target]` marker so assertions can see which direction ran.
pub struct MockTranslator {
    pub code: &'static str,
    pub name: &'static str,
    pub fail_translate: bool,
    /// Start failing at this zero-based translate call, when set.
    pub fail_from_call: Option<usize>,
    pub detect_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
}

impl MockTranslator {
    pub fn english() -> Self {
        Self::for_language("en", "English")
    }

    pub fn for_language(code: &'static str, name: &'static str) -> Self {
        Self {
            code,
            name,
            fail_translate: false,
            fail_from_call: None,
            detect_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DetectedLanguage {
            code: self.code.to_string(),
            name: self.name.to_string(),
            confidence: 0.99,
        })
    }

    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let call = self.translate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_translate || self.fail_from_call.is_some_and(|n| call >= n) {
            return Err(ProviderError::Transport("translation down".to_string()));
        }
        Ok(format!("[{}] {}", target, text))
    }
}

#[derive(Clone, Copy)]
pub enum ModeratorBehavior {
    Clean,
    Flagged,
    Unstructured,
    Fail,
}

pub struct MockModerator {
    pub behavior: ModeratorBehavior,
    pub calls: AtomicUsize,
}

impl MockModerator {
    pub fn new(behavior: ModeratorBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModerationProvider for MockModerator {
    async fn analyze(&self, _text: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ModeratorBehavior::Clean => Ok(r#"{"analysis": "benign", "inappropriate_categories": [], "severity_score": 0.0, "confidence": 0.95, "explanation": "No issues found."}"#.to_string()),
            ModeratorBehavior::Flagged => Ok(r#"{"analysis": "hostile", "inappropriate_categories": ["HARASSMENT"], "severity_score": 0.8, "confidence": 0.9, "explanation": "Personal attack detected."}"#.to_string()),
            ModeratorBehavior::Unstructured => Ok("Looks fine to me.".to_string()),
            ModeratorBehavior::Fail => Err(ProviderError::Transport("moderation down".to_string())),
        }
    }
}

pub struct MockIntentClassifier {
    pub intent: Intent,
    pub confidence: f64,
    pub calls: AtomicUsize,
}

impl MockIntentClassifier {
    pub fn new(intent: Intent, confidence: f64) -> Self {
        Self {
            intent,
            confidence,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IntentClassifier for MockIntentClassifier {
    async fn classify(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IntentClassification {
            intent: self.intent,
            confidence: self.confidence,
            reasoning: "mock classification".to_string(),
        })
    }
}

pub struct MockGrader {
    pub marks: u32,
    pub rubrics: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl MockGrader {
    pub fn scoring(marks: u32) -> Self {
        Self {
            marks,
            rubrics: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GradingProvider for MockGrader {
    async fn grade(
        &self,
        _assignment_text: &str,
        rubric: &str,
        total_marks: u32,
    ) -> Result<GradingOutcome, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rubrics.lock().push(rubric.to_string());
        Ok(GradingOutcome {
            marks_obtained: self.marks.min(total_marks),
            total_marks,
            feedback: "Solid work with room to tighten the argument.".to_string(),
        })
    }
}

pub struct MockExplainer {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockExplainer {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ExplanationProvider for MockExplainer {
    async fn explain(&self, topic: &str, _include_history: bool) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Transport("explainer down".to_string()));
        }
        Ok(format!("An in-depth explanation of {}.", topic))
    }
}

pub struct MockExtractor {
    pub text: String,
    pub calls: AtomicUsize,
}

impl MockExtractor {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub struct MockQuizProvider;

#[async_trait]
impl QuizProvider for MockQuizProvider {
    async fn create_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<QuizCreated, ProviderError> {
        Ok(QuizCreated {
            form_id: "form-123".to_string(),
            responder_url: "https://forms.example/form-123".to_string(),
            title: format!("Auto Quiz: {} ({})", topic, difficulty.title_label()),
            description: "mock quiz".to_string(),
            topic: topic.to_string(),
            difficulty,
            question_count: 20,
        })
    }
}

/// Wires mock providers into an `AppState`/`ChatOrchestrator` pair.
pub struct Harness {
    pub translator: Arc<MockTranslator>,
    pub moderator: Arc<MockModerator>,
    pub intent: Arc<MockIntentClassifier>,
    pub grader: Arc<MockGrader>,
    pub explainer: Arc<MockExplainer>,
    pub extractor: Arc<MockExtractor>,
    pub cache: Arc<ResponseCache>,
    pub status: Arc<StatusBoard>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            translator: Arc::new(MockTranslator::english()),
            moderator: Arc::new(MockModerator::new(ModeratorBehavior::Clean)),
            intent: Arc::new(MockIntentClassifier::new(Intent::General, 0.9)),
            grader: Arc::new(MockGrader::scoring(82)),
            explainer: Arc::new(MockExplainer::working()),
            extractor: Arc::new(MockExtractor::with_text("Kirchhoff's laws describe current and voltage in circuits.")),
            cache: Arc::new(ResponseCache::new(200, Duration::from_secs(3600))),
            status: Arc::new(StatusBoard::new(true, true)),
        }
    }

    pub fn orchestrator(&self) -> ChatOrchestrator {
        ChatOrchestrator::new(
            self.translator.clone(),
            self.moderator.clone(),
            self.intent.clone(),
            self.grader.clone(),
            self.explainer.clone(),
            self.extractor.clone(),
            self.cache.clone(),
            self.status.clone(),
        )
    }

    pub fn state(&self) -> Arc<AppState> {
        AppState::new(
            test_settings(),
            self.cache.clone(),
            self.status.clone(),
            self.translator.clone(),
            self.moderator.clone(),
            self.intent.clone(),
            self.grader.clone(),
            self.explainer.clone(),
            self.extractor.clone(),
            Arc::new(MockQuizProvider),
        )
    }
}

/// Base64-encode a minimal valid PDF payload.
pub fn pdf_document() -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\ntrailer\n%%EOF")
}

/// Base64 payload that is not a PDF.
pub fn bogus_document() -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(b"PK\x03\x04 this is a zip, not a pdf")
}
