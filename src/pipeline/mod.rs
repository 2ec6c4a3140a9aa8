//! Chat orchestration pipeline.
//!
//! Sequences translation, moderation, intent routing and the conditional
//! grading/explanation branches over one `PipelineState`, then composes
//! and back-translates the final reply. Any collaborator failure after
//! the cache check degrades into the response-cache fallback chain so the
//! endpoint always answers with something structurally valid.

pub mod compose;
pub mod stages;
pub mod state;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::chat::{ChatRequest, ChatResponse, ExplanationOutcome};
use crate::domain::grading::{GradeBand, GradingReport};
use crate::domain::intent::{Intent, RoutingDecision};
use crate::domain::language::TranslationInfo;
use crate::domain::moderation::ModerationInfo;
use crate::domain::status::StatusBoard;
use crate::error::{StageError, StageResult};
use crate::services::cache::CachedReply;
use crate::services::{
    looks_like_pdf, DocumentExtractor, ExplanationProvider, GradingProvider, IntentClassifier,
    ModerationProvider, ResponseCache, TranslationProvider,
};
use self::compose::{clean_for_translation, compose, MIN_TRANSLATABLE_CHARS};
use self::stages::{IntentRouter, ModerationStage, TranslationStage};
use self::state::PipelineState;

pub const GRADING_TOTAL_MARKS: u32 = 100;

const PROCESSING_ISSUE_PART: &str = "\u{274C} **Sorry, I encountered an issue processing your message. Please try again.**";
const PDF_ISSUE_PART: &str = "\u{274C} **Sorry, I couldn't process your PDF file. Please make sure it's a valid document and try again.**";
const INVALID_PDF_PART: &str = "\u{274C} **Invalid PDF file.** Please upload a valid PDF document.";

/// Orchestrates one chat request through the full pipeline.
pub struct ChatOrchestrator {
    translator: Arc<dyn TranslationProvider>,
    moderator: Arc<dyn ModerationProvider>,
    intent: Arc<dyn IntentClassifier>,
    grader: Arc<dyn GradingProvider>,
    explainer: Arc<dyn ExplanationProvider>,
    extractor: Arc<dyn DocumentExtractor>,
    cache: Arc<ResponseCache>,
    status: Arc<StatusBoard>,
}

impl ChatOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        translator: Arc<dyn TranslationProvider>,
        moderator: Arc<dyn ModerationProvider>,
        intent: Arc<dyn IntentClassifier>,
        grader: Arc<dyn GradingProvider>,
        explainer: Arc<dyn ExplanationProvider>,
        extractor: Arc<dyn DocumentExtractor>,
        cache: Arc<ResponseCache>,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            translator,
            moderator,
            intent,
            grader,
            explainer,
            extractor,
            cache,
            status,
        }
    }

    pub async fn run(&self, request: ChatRequest) -> ChatResponse {
        let message = request.message.clone().unwrap_or_default();
        let has_message = !message.trim().is_empty();
        let document = request.document.clone().filter(|d| !d.is_empty());
        let has_document = document.is_some();

        info!(user_id = %request.user_id, has_document = has_document, "Chat request");

        // At least one of message/document must be present
        if !has_message && !has_document {
            return ChatResponse::failure(
                message,
                "Please enter a message or upload a PDF file for me to process.",
                "Empty input",
            );
        }

        // Cache fast path: message-only requests
        if has_message && !has_document {
            if let Some(cached) = self.cache.get(&message, false) {
                info!("Cache hit for chat message");
                return cached_to_response(&message, cached, "**[Cached Response]** ");
            }
        }

        let mut state = PipelineState::new(has_message.then(|| message.clone()), document);

        match self.run_pipeline(&mut state).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Chat pipeline failed, entering fallback");
                self.fallback(&message, has_message, has_document, &e)
            }
        }
    }

    async fn run_pipeline(&self, state: &mut PipelineState) -> StageResult<ChatResponse> {
        let mut should_grade = false;

        if state.has_message() {
            should_grade = self.process_message(state).await?;
        }

        if state.has_document() {
            if !state.has_message() {
                // Document with no accompanying message: grading is assumed
                should_grade = true;
                state.push_part("\u{1F4C4} **PDF file received** - Processing for grading...");
            }

            if should_grade {
                self.grade_document(state).await;
            } else if state.final_approved {
                state.push_part(
                    "\u{1F4C4} **I see you've uploaded a PDF file.** If you'd like me to grade it, \
                     just ask me to evaluate or assess your work!",
                );
            }
        }

        let mut reply = compose(&state.parts);

        // Back-translate the fully composed response whenever the source
        // language is known and non-English. Failure keeps the English
        // reply.
        if let Some(code) = state.reply_language_code().map(str::to_string) {
            match self.back_translate(&reply, &code).await {
                Some(translated) => reply = translated,
                None => warn!(code = %code, "Back-translation failed, keeping English response"),
            }
        }

        let translation_info = state
            .translation
            .as_ref()
            .filter(|t| !t.is_english)
            .map(TranslationInfo::from_outcome);

        // Cache only clean, approved, message-only results
        if state.has_message() && !state.has_document() && state.final_approved {
            self.cache.put(
                state.message.as_deref().unwrap_or_default(),
                CachedReply {
                    reply: reply.clone(),
                    translation_info: translation_info.clone(),
                    explanation_result: state.explanation_result.clone(),
                    final_approved: state.final_approved,
                    success: true,
                    is_fallback: false,
                },
                false,
                None,
            );
        }

        if let Some(stage_error) = &state.stage_error {
            info!(error = %stage_error, "Pipeline completed with degraded stages");
        }

        let user_message = state
            .message
            .clone()
            .unwrap_or_else(|| "PDF file uploaded".to_string());

        Ok(ChatResponse {
            success: true,
            user_message,
            reply,
            translation_info,
            moderation_info: state.moderation.as_ref().map(ModerationInfo::from_outcome),
            grading_result: state.grading_result.clone(),
            explanation_result: state.explanation_result.clone(),
            final_approved: state.final_approved,
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: None,
        })
    }

    /// Translate, moderate and route the text message. Returns whether the
    /// attached document should be graded.
    ///
    /// Only a moderation collaborator failure escapes as an error (the
    /// caller falls back to cached responses); every other stage failure
    /// degrades into a user-facing response part.
    async fn process_message(&self, state: &mut PipelineState) -> StageResult<bool> {
        let message = state.message.clone().unwrap_or_default();

        let translation = match TranslationStage::new(self.translator.as_ref())
            .run(&message)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Translation stage failed");
                state.record_error(e);
                state.final_approved = false;
                state.push_part(PROCESSING_ISSUE_PART);
                return Ok(false);
            }
        };

        if !translation.is_english {
            info!(
                language = %translation.detected_language,
                code = %translation.detected_language_code,
                "Non-English message translated"
            );
        }
        state.translation = Some(translation);
        let english = state.english_text().unwrap_or_default().to_string();

        let moderation = match ModerationStage::new(self.moderator.as_ref()).run(&english).await {
            Ok(outcome) => outcome,
            Err(e @ StageError::ModerationFailed(_)) => return Err(e),
            Err(e) => {
                warn!(error = %e, "Moderation validation failed");
                state.record_error(e);
                state.final_approved = false;
                state.push_part(PROCESSING_ISSUE_PART);
                return Ok(false);
            }
        };

        let approved = moderation.approved;
        state.moderation = Some(moderation);
        state.final_approved = approved;

        if !approved {
            state.push_part(
                "\u{274C} **Sorry, I can't process this message as it doesn't meet our content \
                 guidelines. Please try rephrasing your request.**",
            );
            return Ok(false);
        }

        // Translation banner / acknowledgment
        {
            let t = state.translation.as_ref().expect("translation outcome set above");
            if t.is_english {
                state.push_part("\u{1F4AC} **Message received and processed.**");
            } else {
                state.push_part(format!(
                    "\u{1F310} **Translated from {}:** {}",
                    t.detected_language, t.translated_text
                ));
            }
        }

        let classification = IntentRouter::new(self.intent.as_ref()).classify(&english).await;
        let decision = IntentRouter::route(&classification, state.has_document());
        state.intent = Some(classification);

        let mut should_grade = false;
        match decision {
            RoutingDecision::GradeDocument => {
                should_grade = true;
                state.push_part("\u{1F4DD} **Processing your document for grading...**");
            }
            RoutingDecision::PromptForDocument => {
                state.push_part("\u{1F4C4} **Please upload a PDF file to grade.**");
            }
            RoutingDecision::Clarify(Intent::Grading) => {
                state.push_part(
                    "\u{1F914} **Want me to grade something?** Please upload a PDF file and be \
                     more specific.",
                );
            }
            RoutingDecision::ExplainTopic => {
                self.explain_topic(state, &english).await;
            }
            RoutingDecision::Clarify(_) => {
                state.push_part(
                    "\u{1F914} **Want me to explain something?** Please be more specific about \
                     the topic.",
                );
            }
            RoutingDecision::GeneralReply => {
                state.push_part(
                    "\u{1F4AC} **Thanks for your message!** How can I help you today?",
                );
            }
        }

        Ok(should_grade)
    }

    /// Generate an explanation for the (translated) topic. The explanation
    /// text itself is back-translated into the user's language before
    /// being embedded, independent of the final full-response pass.
    async fn explain_topic(&self, state: &mut PipelineState, topic: &str) {
        if !self.status.explanation_available() {
            state.record_error(StageError::ExplanationUnavailable);
            state.push_part("\u{274C} **Sorry, the explanation service is currently unavailable.**");
            return;
        }

        match self.explainer.explain(topic, true).await {
            Ok(text) => {
                let mut explanation = text;
                if let Some(code) = state.reply_language_code().map(str::to_string) {
                    if let Some(translated) = self.back_translate(&explanation, &code).await {
                        info!("Explanation translated to user's language");
                        explanation = translated;
                    }
                }

                state.explanation_result = Some(ExplanationOutcome {
                    topic: topic.to_string(),
                    explanation: explanation.clone(),
                    intent_confidence: state
                        .intent
                        .as_ref()
                        .map(|c| c.confidence)
                        .unwrap_or_default(),
                    reasoning: state
                        .intent
                        .as_ref()
                        .map(|c| c.reasoning.clone())
                        .unwrap_or_default(),
                });
                state.push_part(format!(
                    "\u{1F393} **Here's what I can tell you about {}:**\n\n{}",
                    topic, explanation
                ));
            }
            Err(e) => {
                warn!(error = %e, "Explanation generation failed");
                state.record_error(StageError::ExplanationUnavailable);
                state.push_part(
                    "\u{274C} **Sorry, I couldn't generate an explanation right now. Please try \
                     again.**",
                );
            }
        }
    }

    /// Validate, extract and grade the attached document. Every failure
    /// degrades into a response part; the rest of the reply still ships.
    async fn grade_document(&self, state: &mut PipelineState) {
        let Some(encoded) = state.document.clone() else {
            return;
        };

        let bytes = match BASE64.decode(encoded.as_bytes()) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!("Document payload was not valid base64");
                state.record_error(StageError::DocumentInvalid);
                state.push_part(INVALID_PDF_PART);
                return;
            }
        };

        if !looks_like_pdf(&bytes) {
            warn!("Document failed PDF magic byte check");
            state.record_error(StageError::DocumentInvalid);
            state.push_part(INVALID_PDF_PART);
            return;
        }

        let assignment_text = match self.extractor.extract_text(&bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Document text extraction failed");
                state.record_error(StageError::DocumentExtractionFailed(e.to_string()));
                state.push_part(PDF_ISSUE_PART);
                return;
            }
        };

        if assignment_text.trim().is_empty() {
            push_grading_report(
                state,
                GradingReport {
                    marks_obtained: 0,
                    total_marks: GRADING_TOTAL_MARKS,
                    ai_feedback: "No readable text found in the document (even with OCR). Please \
                                  check the file."
                        .to_string(),
                },
            );
            return;
        }

        let rubric = build_rubric(
            state
                .translation
                .as_ref()
                .map(|t| t.translated_text.as_str()),
        );

        match self
            .grader
            .grade(&assignment_text, &rubric, GRADING_TOTAL_MARKS)
            .await
        {
            Ok(outcome) => {
                push_grading_report(
                    state,
                    GradingReport {
                        marks_obtained: outcome.marks_obtained,
                        total_marks: outcome.total_marks,
                        ai_feedback: outcome.feedback,
                    },
                );
            }
            Err(e) => {
                warn!(error = %e, "Grading failed");
                state.record_error(StageError::GradingFailed(e.to_string()));
                state.push_part(PDF_ISSUE_PART);
            }
        }
    }

    /// Translate English text into the user's language, stripping
    /// formatting that does not survive translation. Returns `None` on
    /// failure so callers keep the English text.
    async fn back_translate(&self, text: &str, target_code: &str) -> Option<String> {
        if target_code.eq_ignore_ascii_case("en") {
            return Some(text.to_string());
        }

        let cleaned = clean_for_translation(text);
        let to_translate = if cleaned.chars().count() < MIN_TRANSLATABLE_CHARS {
            // Cleaning removed too much content
            text
        } else {
            cleaned.as_str()
        };

        match self.translator.translate(to_translate, "en", target_code).await {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!(error = %e, target = %target_code, "Back-translation failed");
                None
            }
        }
    }

    /// Three-tier fallback: exact cache hit, then similarity/synthetic
    /// fallback, then a last-resort apology.
    fn fallback(
        &self,
        message: &str,
        has_message: bool,
        has_document: bool,
        error: &StageError,
    ) -> ChatResponse {
        if has_message && !has_document {
            if let Some(cached) = self.cache.get(message, false) {
                info!("Using cached response as error fallback");
                return cached_to_response(
                    message,
                    cached,
                    "**[Cached Fallback]** Service temporarily unavailable. Here's a previous \
                     response:\n\n",
                );
            }

            info!("Using structured fallback response");
            let fallback = self.cache.fallback_response(message, "service_error");
            return cached_to_response(message, fallback, "");
        }

        ChatResponse::failure(
            if has_message { message } else { "PDF file uploaded" },
            "Sorry, I'm experiencing technical difficulties. Please try again later.",
            StageError::WorkflowFailed(error.to_string()).to_string(),
        )
    }
}

fn push_grading_report(state: &mut PipelineState, report: GradingReport) {
    let percentage = report.percentage();
    let band = GradeBand::from_percentage(percentage);

    state.push_part(format!(
        "{} **Your Grade: {}/{} ({:.1}%)**\n\n\u{1F3C5} **Performance:** {}\n\n\u{1F4DD} **Feedback:**\n{}",
        band.emoji(),
        report.marks_obtained,
        report.total_marks,
        percentage,
        band.label(),
        report.ai_feedback
    ));
    state.grading_result = Some(report);
}

fn build_rubric(user_context: Option<&str>) -> String {
    match user_context {
        Some(context) => format!(
            "Based on the user's request: \"{}\"\n\n\
             Grading Criteria:\n\
             - Content Quality and Relevance (40 marks)\n\
             - Clarity and Understanding (25 marks)\n\
             - Organization and Structure (20 marks)\n\
             - Grammar and Presentation (15 marks)\n\n\
             Instructions:\n\
             - Provide specific feedback related to the user's request\n\
             - Ignore minor syntax/grammar mistakes\n\
             - Focus on content accuracy and comprehension\n\
             - Give constructive suggestions for improvement",
            context
        ),
        None => "General Assignment Grading Criteria:\n\
                 - Content Quality and Accuracy (40 marks)\n\
                 - Clarity of Explanation (30 marks)\n\
                 - Organization and Structure (20 marks)\n\
                 - Grammar and Presentation (10 marks)\n\n\
                 Instructions:\n\
                 - Ignore minor syntax/grammar mistakes\n\
                 - Provide constructive feedback\n\
                 - Focus on overall understanding and presentation"
            .to_string(),
    }
}

fn cached_to_response(user_message: &str, cached: CachedReply, prefix: &str) -> ChatResponse {
    ChatResponse {
        success: cached.success,
        user_message: user_message.to_string(),
        reply: format!("{}{}", prefix, cached.reply),
        translation_info: cached.translation_info,
        moderation_info: None,
        grading_result: None,
        explanation_result: cached.explanation_result,
        final_approved: cached.final_approved,
        timestamp: chrono::Utc::now().to_rfc3339(),
        error: None,
    }
}
