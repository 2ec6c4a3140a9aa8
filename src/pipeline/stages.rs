//! Chat pipeline stages: translation, moderation, intent routing.
//!
//! Each stage validates its input, invokes one collaborator and returns a
//! typed `StageResult` so the orchestrator pattern-matches on failures.

use tracing::{debug, info, warn};

use crate::domain::intent::{Intent, IntentClassification, RoutingDecision};
use crate::domain::language::TranslationOutcome;
use crate::domain::moderation::{ModerationAnalysis, ModerationOutcome};
use crate::error::{StageError, StageResult};
use crate::services::intent::IntentClassifier;
use crate::services::moderator::ModerationProvider;
use crate::services::translator::TranslationProvider;

/// Character limit imposed by the translation API.
pub const TRANSLATION_MAX_CHARS: usize = 30_000;
/// Character limit for one moderation pass.
pub const MODERATION_MAX_CHARS: usize = 10_000;
/// Policy constant: severity at or above this rejects the content.
pub const SEVERITY_REJECT_THRESHOLD: f64 = 0.3;
/// Intent routing only acts on classifications above this confidence.
pub const INTENT_CONFIDENCE_THRESHOLD: f64 = 0.5;

const ENGLISH_CODE: &str = "en";

fn validate_input(text: &str, max_chars: usize) -> StageResult<()> {
    if text.trim().is_empty() {
        return Err(StageError::EmptyInput);
    }
    if text.chars().count() > max_chars {
        return Err(StageError::InputTooLong { max: max_chars });
    }
    Ok(())
}

/// Detects the source language and ensures English text for the rest of
/// the pipeline.
pub struct TranslationStage<'a> {
    provider: &'a dyn TranslationProvider,
}

impl<'a> TranslationStage<'a> {
    pub fn new(provider: &'a dyn TranslationProvider) -> Self {
        Self { provider }
    }

    pub async fn run(&self, text: &str) -> StageResult<TranslationOutcome> {
        validate_input(text, TRANSLATION_MAX_CHARS)?;

        let detected = self
            .provider
            .detect_language(text)
            .await
            .map_err(|e| StageError::TranslationFailed(e.to_string()))?;

        debug!(
            language = %detected.name,
            code = %detected.code,
            confidence = detected.confidence,
            "Language detected"
        );

        // Already English: the translate call is skipped entirely.
        if detected.code.eq_ignore_ascii_case(ENGLISH_CODE) {
            return Ok(TranslationOutcome {
                detected_language: detected.name,
                detected_language_code: detected.code,
                confidence: detected.confidence,
                translated_text: text.to_string(),
                is_english: true,
            });
        }

        let translated = self
            .provider
            .translate(text, &detected.code, ENGLISH_CODE)
            .await
            .map_err(|e| StageError::TranslationFailed(e.to_string()))?;

        Ok(TranslationOutcome {
            detected_language: detected.name,
            detected_language_code: detected.code,
            confidence: detected.confidence,
            translated_text: translated,
            is_english: false,
        })
    }
}

/// Analyzes English text for inappropriate content and produces the
/// approve/reject decision.
pub struct ModerationStage<'a> {
    provider: &'a dyn ModerationProvider,
}

impl<'a> ModerationStage<'a> {
    pub fn new(provider: &'a dyn ModerationProvider) -> Self {
        Self { provider }
    }

    pub async fn run(&self, text: &str) -> StageResult<ModerationOutcome> {
        validate_input(text, MODERATION_MAX_CHARS)?;

        let raw = self
            .provider
            .analyze(text)
            .await
            .map_err(|e| StageError::ModerationFailed(e.to_string()))?;

        // Format drift never fails the pipeline: unparseable output is
        // treated as unstructured analysis with nothing flagged.
        let analysis = parse_analysis(&raw);

        let approved = analysis.inappropriate_categories.is_empty()
            && analysis.severity_score < SEVERITY_REJECT_THRESHOLD;

        if approved {
            info!("Content approved");
        } else {
            info!(
                categories = ?analysis.inappropriate_categories,
                severity = analysis.severity_score,
                "Content rejected"
            );
        }

        Ok(ModerationOutcome {
            approved,
            confidence: analysis.confidence,
            flagged_categories: analysis.inappropriate_categories,
            explanation: analysis.explanation,
            severity_score: analysis.severity_score,
        })
    }
}

fn parse_analysis(raw: &str) -> ModerationAnalysis {
    match serde_json::from_str::<ModerationAnalysis>(raw) {
        Ok(analysis) => analysis,
        Err(_) => {
            warn!("Moderation response was not structured, using fallback analysis");
            ModerationAnalysis::unstructured(raw)
        }
    }
}

/// Classifies intent and maps it to a routing decision.
pub struct IntentRouter<'a> {
    classifier: &'a dyn IntentClassifier,
}

impl<'a> IntentRouter<'a> {
    pub fn new(classifier: &'a dyn IntentClassifier) -> Self {
        Self { classifier }
    }

    /// Intent is advisory: a collaborator failure degrades to a general
    /// reply instead of blocking the request.
    pub async fn classify(&self, text: &str) -> IntentClassification {
        let mut classification = match self.classifier.classify(text).await {
            Ok(classification) => classification,
            Err(e) => {
                let error = StageError::IntentClassificationFailed(e.to_string());
                warn!(error = %error, "Defaulting to general intent");
                IntentClassification::fallback(&e.to_string())
            }
        };

        classification.confidence = classification.confidence.clamp(0.0, 1.0);

        info!(
            intent = classification.intent.as_str(),
            confidence = classification.confidence,
            reasoning = %classification.reasoning,
            "Intent classification"
        );

        classification
    }

    pub fn route(classification: &IntentClassification, has_document: bool) -> RoutingDecision {
        let confident = classification.confidence > INTENT_CONFIDENCE_THRESHOLD;

        match classification.intent {
            Intent::Grading if confident && has_document => RoutingDecision::GradeDocument,
            Intent::Grading if confident => RoutingDecision::PromptForDocument,
            Intent::Grading => RoutingDecision::Clarify(Intent::Grading),
            Intent::Explanation if confident => RoutingDecision::ExplainTopic,
            Intent::Explanation => RoutingDecision::Clarify(Intent::Explanation),
            Intent::General => RoutingDecision::GeneralReply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::DetectedLanguage;
    use crate::services::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTranslator {
        code: &'static str,
        name: &'static str,
        translated: &'static str,
        translate_calls: AtomicUsize,
    }

    impl FakeTranslator {
        fn new(code: &'static str, name: &'static str, translated: &'static str) -> Self {
            Self {
                code,
                name,
                translated,
                translate_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranslationProvider for FakeTranslator {
        async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, ProviderError> {
            Ok(DetectedLanguage {
                code: self.code.to_string(),
                name: self.name.to_string(),
                confidence: 0.98,
            })
        }

        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, ProviderError> {
            self.translate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.translated.to_string())
        }
    }

    struct FakeModerator {
        raw: String,
    }

    #[async_trait]
    impl ModerationProvider for FakeModerator {
        async fn analyze(&self, _text: &str) -> Result<String, ProviderError> {
            Ok(self.raw.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl IntentClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
            Err(ProviderError::Transport("connection refused".to_string()))
        }
    }

    struct FixedClassifier(IntentClassification);

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn english_input_skips_translate_call() {
        let translator = FakeTranslator::new("en", "English", "unused");
        let stage = TranslationStage::new(&translator);

        let outcome = stage.run("Hello, how are you today?").await.unwrap();
        assert!(outcome.is_english);
        assert_eq!(outcome.translated_text, "Hello, how are you today?");
        assert_eq!(translator.translate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_english_input_is_translated() {
        let translator = FakeTranslator::new("es", "Spanish", "hello friend");
        let stage = TranslationStage::new(&translator);

        let outcome = stage.run("hola amigo").await.unwrap();
        assert!(!outcome.is_english);
        assert_eq!(outcome.translated_text, "hello friend");
        assert_eq!(outcome.detected_language, "Spanish");
        assert_eq!(translator.translate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_and_oversized_input_fail_validation() {
        let translator = FakeTranslator::new("en", "English", "unused");
        let stage = TranslationStage::new(&translator);

        assert!(matches!(stage.run("   ").await, Err(StageError::EmptyInput)));

        let oversized = "a".repeat(TRANSLATION_MAX_CHARS + 1);
        assert!(matches!(
            stage.run(&oversized).await,
            Err(StageError::InputTooLong { .. })
        ));
    }

    #[tokio::test]
    async fn moderation_approves_clean_structured_result() {
        let moderator = FakeModerator {
            raw: r#"{"analysis": "benign", "inappropriate_categories": [], "severity_score": 0.0, "confidence": 0.95, "explanation": "Clean."}"#.to_string(),
        };
        let stage = ModerationStage::new(&moderator);

        let outcome = stage.run("The weather is nice today.").await.unwrap();
        assert!(outcome.approved);
        assert_eq!(outcome.confidence, 0.95);
        assert!(outcome.flagged_categories.is_empty());
    }

    #[tokio::test]
    async fn moderation_rejects_flagged_categories() {
        let moderator = FakeModerator {
            raw: r#"{"inappropriate_categories": ["HARASSMENT"], "severity_score": 0.8, "confidence": 0.9, "explanation": "Personal attack."}"#.to_string(),
        };
        let stage = ModerationStage::new(&moderator);

        let outcome = stage.run("some hostile text").await.unwrap();
        assert!(!outcome.approved);
        assert_eq!(outcome.flagged_categories, vec!["HARASSMENT"]);
    }

    #[tokio::test]
    async fn severity_boundary_is_rejecting() {
        // Exactly 0.3 severity with no flagged categories is NOT approved.
        let moderator = FakeModerator {
            raw: r#"{"inappropriate_categories": [], "severity_score": 0.3, "confidence": 0.9}"#.to_string(),
        };
        let outcome = ModerationStage::new(&moderator).run("edgy text").await.unwrap();
        assert!(!outcome.approved);

        let moderator = FakeModerator {
            raw: r#"{"inappropriate_categories": [], "severity_score": 0.29, "confidence": 0.9}"#.to_string(),
        };
        let outcome = ModerationStage::new(&moderator).run("edgy text").await.unwrap();
        assert!(outcome.approved);
    }

    #[tokio::test]
    async fn unparseable_moderation_output_falls_back() {
        let moderator = FakeModerator {
            raw: "The content looks fine to me overall.".to_string(),
        };
        let stage = ModerationStage::new(&moderator);

        let outcome = stage.run("anything").await.unwrap();
        assert!(outcome.approved);
        assert_eq!(outcome.confidence, 0.5);
        assert!(outcome.flagged_categories.is_empty());
        assert_eq!(outcome.severity_score, 0.0);
    }

    #[tokio::test]
    async fn classifier_failure_defaults_to_general() {
        let router = IntentRouter::new(&FailingClassifier);
        let classification = router.classify("whatever").await;

        assert_eq!(classification.intent, Intent::General);
        assert_eq!(classification.confidence, 0.0);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let classifier = FixedClassifier(IntentClassification {
            intent: Intent::Explanation,
            confidence: 1.7,
            reasoning: String::new(),
        });
        let router = IntentRouter::new(&classifier);

        let classification = router.classify("explain gravity").await;
        assert_eq!(classification.confidence, 1.0);
    }

    #[test]
    fn routing_decision_table() {
        let class = |intent, confidence| IntentClassification {
            intent,
            confidence,
            reasoning: String::new(),
        };

        assert_eq!(
            IntentRouter::route(&class(Intent::Grading, 0.9), true),
            RoutingDecision::GradeDocument
        );
        assert_eq!(
            IntentRouter::route(&class(Intent::Grading, 0.9), false),
            RoutingDecision::PromptForDocument
        );
        // Threshold is strict: exactly 0.5 does not trigger
        assert_eq!(
            IntentRouter::route(&class(Intent::Grading, 0.5), true),
            RoutingDecision::Clarify(Intent::Grading)
        );
        assert_eq!(
            IntentRouter::route(&class(Intent::Explanation, 0.8), false),
            RoutingDecision::ExplainTopic
        );
        assert_eq!(
            IntentRouter::route(&class(Intent::Explanation, 0.3), false),
            RoutingDecision::Clarify(Intent::Explanation)
        );
        assert_eq!(
            IntentRouter::route(&class(Intent::General, 0.99), false),
            RoutingDecision::GeneralReply
        );
    }
}
