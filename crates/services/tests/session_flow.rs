use std::sync::Arc;
use std::time::Duration;

use client::{ApiCall, ApiError, InMemoryApi, UploadReceipt};
use hurdle_core::model::{
    Answer, FeedbackOutcome, HurdleFetch, PdfId, PerformanceSummary, QueryAnswer, SubmitOutcome,
    TaskType,
};
use serde_json::json;
use services::{
    AdvancePolicy, SessionError, SessionMachine, SessionPhase, SessionSettings, SummarySource,
};

fn pdf() -> PdfId {
    PdfId::new("42").unwrap()
}

fn choice_hurdle(idx: u32) -> HurdleFetch {
    HurdleFetch::from_value(json!({
        "chunk": format!("Chunk number {idx}."),
        "task_type": "choice",
        "task": {
            "type": "choice",
            "question": format!("Question {idx}?"),
            "options": ["a", "b", "c", "d"]
        },
        "is_boss": false,
        "idx": idx
    }))
    .unwrap()
}

fn cloze_hurdle(idx: u32) -> HurdleFetch {
    HurdleFetch::from_value(json!({
        "chunk": "Mitochondria make ATP.",
        "task_type": "cloze",
        "task": {"question": "Mitochondria make _____."},
        "idx": idx
    }))
    .unwrap()
}

fn graded(correct: bool, current: u32) -> SubmitOutcome {
    SubmitOutcome {
        correct,
        score: if correct { 100.0 } else { 0.0 },
        explanation: Some("Because.".to_owned()),
        current: Some(current),
        xp: Some(current * 10),
        streak: Some(u32::from(correct)),
        ..SubmitOutcome::default()
    }
}

fn machine(api: &InMemoryApi, settings: SessionSettings) -> SessionMachine {
    SessionMachine::new(Arc::new(api.clone()), settings)
}

async fn started(api: &InMemoryApi, settings: SessionSettings) -> SessionMachine {
    api.push_hurdle(Ok(choice_hurdle(0)));
    let machine = machine(api, settings);
    let phase = machine.start_session(pdf(), 3).await.unwrap();
    assert_eq!(phase, SessionPhase::Question);
    machine
}

#[tokio::test(start_paused = true)]
async fn start_session_shows_first_hurdle_with_a_fresh_timer() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;

    let state = machine.snapshot();
    assert_eq!(state.pdf_id(), Some(&pdf()));
    assert_eq!(state.num_chunks(), 3);
    assert_eq!(state.progress().current(), 0);
    assert_eq!(state.timer().seconds, 0);
    assert!(state.timer().running);
    assert!(!state.is_loading());
    assert_eq!(state.hurdle().unwrap().task_type(), TaskType::Choice);
    assert_eq!(api.calls(), vec![ApiCall::FetchHurdle(pdf())]);
}

#[tokio::test(start_paused = true)]
async fn timer_counts_seconds_while_the_question_is_open() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;

    tokio::time::sleep(Duration::from_millis(3_200)).await;

    assert_eq!(machine.snapshot().timer().seconds, 3);
}

#[tokio::test(start_paused = true)]
async fn choice_answer_is_sent_as_index_and_server_progress_wins() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let feedback = machine.submit_answer(Answer::Choice(2)).await.unwrap();

    assert_eq!(feedback.outcome, FeedbackOutcome::Correct);
    assert_eq!(feedback.explanation, "Because.");

    let sent = api.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].answer, Some(Answer::Choice(2)));
    assert_eq!(sent[0].task_type, TaskType::Choice);
    assert_eq!(sent[0].time_ms, 1_500);
    assert!(!sent[0].skip);

    let state = machine.snapshot();
    assert_eq!(state.progress().current(), 1);
    assert_eq!(state.progress().xp(), 10);
    assert!(!state.timer().running);
    assert_eq!(state.feedback(), Some(&feedback));
}

#[tokio::test(start_paused = true)]
async fn correct_answer_advances_after_two_seconds() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));
    api.push_hurdle(Ok(choice_hurdle(1)));

    machine.submit_answer(Answer::Choice(0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_900)).await;
    assert_eq!(api.fetch_count(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let state = machine.snapshot();
    assert_eq!(api.fetch_count(), 2);
    assert!(state.feedback().is_none());
    assert_eq!(state.hurdle().unwrap().idx, 1);
    assert!(state.timer().running);
}

#[tokio::test(start_paused = true)]
async fn incorrect_answer_keeps_feedback_for_five_seconds() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(false, 0)));
    api.push_hurdle(Ok(choice_hurdle(0)));

    let feedback = machine.submit_answer(Answer::Choice(3)).await.unwrap();
    assert_eq!(feedback.outcome, FeedbackOutcome::Incorrect);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.fetch_count(), 1);
    assert!(machine.snapshot().feedback().is_some());

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert_eq!(api.fetch_count(), 2);
    assert!(machine.snapshot().feedback().is_none());
}

#[tokio::test(start_paused = true)]
async fn confirm_policy_waits_for_continue_on_correct_answers() {
    let api = InMemoryApi::new();
    let settings = SessionSettings::default().with_advance(AdvancePolicy::ConfirmCorrect {
        incorrect_delay: Duration::from_secs(5),
    });
    let machine = started(&api, settings).await;
    api.push_submission(Ok(graded(true, 1)));
    api.push_hurdle(Ok(choice_hurdle(1)));

    machine.submit_answer(Answer::Choice(1)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.fetch_count(), 1);
    assert!(machine.snapshot().feedback().unwrap().is_correct());

    let phase = machine.continue_to_next().await.unwrap();
    assert_eq!(phase, SessionPhase::Question);
    assert_eq!(api.fetch_count(), 2);
    assert!(machine.snapshot().feedback().is_none());
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_pending_is_refused_without_a_request() {
    let api = InMemoryApi::new().with_latency(Duration::from_secs(1));
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));

    let first = {
        let machine = machine.clone();
        tokio::spawn(async move { machine.submit_answer(Answer::Choice(0)).await })
    };
    tokio::task::yield_now().await;
    assert!(machine.snapshot().is_loading());

    let second = machine.submit_answer(Answer::Choice(1)).await;
    assert!(matches!(second, Err(SessionError::Busy)));

    first.await.unwrap().unwrap();
    assert_eq!(api.submissions().len(), 1);
    assert!(!machine.snapshot().is_loading());
}

#[tokio::test(start_paused = true)]
async fn skip_submits_a_skip_and_fetches_the_next_hurdle() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(SubmitOutcome {
        feedback: Some("Skipped, moving on.".to_owned()),
        current: Some(1),
        ..SubmitOutcome::default()
    }));
    api.push_hurdle(Ok(cloze_hurdle(1)));

    let phase = machine.skip().await.unwrap();

    assert_eq!(phase, SessionPhase::Question);
    assert_eq!(api.fetch_count(), 2);
    let sent = api.submissions();
    assert!(sent[0].skip);
    assert_eq!(sent[0].answer, None);

    let state = machine.snapshot();
    assert_eq!(state.hurdle().unwrap().task_type(), TaskType::Cloze);
    assert_eq!(state.progress().current(), 1);
    assert_eq!(state.feedback().unwrap().outcome, FeedbackOutcome::Skipped);
    assert!(state.timer().running);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(machine.snapshot().feedback().is_none());
    assert_eq!(api.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn restart_clears_state_and_silences_the_timer() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(machine.snapshot().timer().seconds, 2);

    machine.restart();
    let calls_at_restart = api.calls().len();
    tokio::time::sleep(Duration::from_secs(5)).await;

    let state = machine.snapshot();
    assert_eq!(state.phase(), SessionPhase::NoSession);
    assert_eq!(state.timer().seconds, 0);
    assert!(!state.timer().running);
    assert!(state.hurdle().is_none());
    assert_eq!(state.progress().current(), 0);
    assert_eq!(api.calls().len(), calls_at_restart);
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_a_pending_auto_advance() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));
    machine.submit_answer(Answer::Choice(0)).await.unwrap();

    machine.restart();
    api.push_hurdle(Ok(cloze_hurdle(0)));
    machine.start_session(PdfId::new("43").unwrap(), 5).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(api.fetch_count(), 2);
    let state = machine.snapshot();
    assert_eq!(state.pdf_id().unwrap().as_str(), "43");
    assert_eq!(state.hurdle().unwrap().task_type(), TaskType::Cloze);
}

#[tokio::test(start_paused = true)]
async fn response_arriving_after_restart_is_dropped() {
    let api = InMemoryApi::new().with_latency(Duration::from_secs(1));
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));

    let pending = {
        let machine = machine.clone();
        tokio::spawn(async move { machine.submit_answer(Answer::Choice(0)).await })
    };
    tokio::task::yield_now().await;
    machine.restart();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(SessionError::Superseded)));
    let state = machine.snapshot();
    assert_eq!(state.phase(), SessionPhase::NoSession);
    assert!(state.feedback().is_none());
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_hurdle_and_progress() {
    let api = InMemoryApi::new();
    let settings = SessionSettings::default().with_advance(AdvancePolicy::ConfirmCorrect {
        incorrect_delay: Duration::from_secs(5),
    });
    let machine = started(&api, settings).await;
    api.push_submission(Ok(graded(true, 1)));
    machine.submit_answer(Answer::Choice(0)).await.unwrap();
    let before = machine.snapshot();

    api.push_hurdle(Err(ApiError::Application("Failed to generate task".to_owned())));
    let err = machine.fetch_next_hurdle().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let after = machine.snapshot();
    assert_eq!(after.hurdle(), before.hurdle());
    assert_eq!(after.progress(), before.progress());
    assert!(!after.is_loading());
    assert_eq!(after.error(), Some("Failed to generate task"));

    machine.dismiss_error();
    assert!(machine.snapshot().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn progress_is_clamped_and_never_goes_back() {
    let api = InMemoryApi::new();
    let settings = SessionSettings::default().with_advance(AdvancePolicy::ConfirmCorrect {
        incorrect_delay: Duration::from_secs(60),
    });
    let machine = started(&api, settings).await;

    api.push_submission(Ok(graded(false, 99)));
    machine.submit_answer(Answer::Choice(0)).await.unwrap();
    assert_eq!(machine.snapshot().progress().current(), 3);

    api.push_submission(Ok(graded(false, 1)));
    machine.submit_answer(Answer::Choice(1)).await.unwrap();
    assert_eq!(machine.snapshot().progress().current(), 3);
    assert!((machine.snapshot().progress_ratio() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn mismatched_answer_is_rejected_locally() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;

    let err = machine
        .submit_answer(Answer::Text("mitochondria".to_owned()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::AnswerMismatch {
            expected: TaskType::Choice,
            ..
        }
    ));
    assert!(api.submissions().is_empty());
    assert!(!machine.snapshot().is_loading());
}

#[tokio::test(start_paused = true)]
async fn operations_without_a_session_are_refused() {
    let api = InMemoryApi::new();
    let machine = machine(&api, SessionSettings::default());

    assert!(matches!(
        machine.fetch_next_hurdle().await,
        Err(SessionError::NoSession)
    ));
    assert!(matches!(machine.skip().await, Err(SessionError::NoSession)));
    assert!(matches!(
        machine.ask("what is ATP?").await,
        Err(SessionError::NoSession)
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn performance_before_completion_is_refused() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;

    let err = machine.request_performance_summary().await.unwrap_err();

    assert!(matches!(err, SessionError::NotDone));
    assert_eq!(api.calls().len(), 1);
    assert!(!machine.snapshot().is_performance_loading());
}

#[tokio::test(start_paused = true)]
async fn completion_stops_the_timer_and_unlocks_the_summary() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_hurdle(Ok(HurdleFetch::Done));

    let phase = machine.fetch_next_hurdle().await.unwrap();
    assert_eq!(phase, SessionPhase::Done);
    let state = machine.snapshot();
    assert!(state.hurdle().is_none());
    assert!(!state.timer().running);

    assert!(matches!(
        machine.submit_answer(Answer::Choice(0)).await,
        Err(SessionError::AlreadyDone)
    ));

    api.push_report(Ok(PerformanceSummary {
        total_questions: Some(3),
        correct: Some(2),
        accuracy: Some(2.0 / 3.0),
        ..PerformanceSummary::default()
    }));
    let summary = machine.request_performance_summary().await.unwrap();

    assert_eq!(summary.correct, Some(2));
    assert_eq!(machine.snapshot().performance(), Some(&summary));
    assert_eq!(api.calls().last(), Some(&ApiCall::Performance(pdf())));
}

#[tokio::test(start_paused = true)]
async fn ask_stores_the_rendered_answer() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_query(Ok(QueryAnswer {
        answer: "ATP stores energy.".to_owned(),
        confidence: None,
        source_chunks: Some(2),
    }));

    let response = machine.ask("  what is ATP?  ").await.unwrap();

    assert!(response.starts_with("ATP stores energy."));
    let state = machine.snapshot();
    assert_eq!(state.query().query, "what is ATP?");
    assert_eq!(state.query().response, response);
    assert!(!state.query().loading);
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::Query {
            pdf_id: pdf(),
            query: "what is ATP?".to_owned()
        })
    );

    assert!(matches!(machine.ask("   ").await, Err(SessionError::EmptyQuery)));
}

#[tokio::test(start_paused = true)]
async fn upload_starts_a_session_on_the_new_document() {
    let api = InMemoryApi::new();
    api.push_upload(Ok(UploadReceipt {
        pdf_id: pdf(),
        num_chunks: 8,
        title: Some("Cells".to_owned()),
    }));
    api.push_hurdle(Ok(choice_hurdle(0)));
    let machine = machine(&api, SessionSettings::default());

    let receipt = machine
        .upload_and_start("cells.pdf", b"%PDF-1.4".to_vec())
        .await
        .unwrap();

    assert_eq!(receipt.num_chunks, 8);
    let state = machine.snapshot();
    assert_eq!(state.phase(), SessionPhase::Question);
    assert_eq!(state.num_chunks(), 8);
    assert_eq!(
        api.calls()[0],
        ApiCall::Upload {
            file_name: "cells.pdf".to_owned(),
            size: 8
        }
    );
}

#[tokio::test(start_paused = true)]
async fn failed_upload_leaves_no_session() {
    let api = InMemoryApi::new();
    api.push_upload(Err(ApiError::Status {
        status: 400,
        message: "Only PDF files are allowed".to_owned(),
    }));
    let machine = machine(&api, SessionSettings::default());

    let err = machine
        .upload_and_start("notes.txt", b"hello".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(_)));
    let state = machine.snapshot();
    assert_eq!(state.phase(), SessionPhase::NoSession);
    assert!(state.error().is_some());
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn dismissing_feedback_keeps_the_hurdle() {
    let api = InMemoryApi::new();
    let settings = SessionSettings::default().with_advance(AdvancePolicy::ConfirmCorrect {
        incorrect_delay: Duration::from_secs(5),
    });
    let machine = started(&api, settings).await;
    api.push_submission(Ok(graded(true, 1)));
    machine.submit_answer(Answer::Choice(0)).await.unwrap();

    machine.dismiss_feedback();

    let state = machine.snapshot();
    assert!(state.feedback().is_none());
    assert_eq!(state.phase(), SessionPhase::Question);
    assert_eq!(api.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn correct_answer_locks_the_hurdle_until_the_next_one_arrives() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(graded(true, 1)));
    api.push_hurdle(Ok(choice_hurdle(1)));
    machine.submit_answer(Answer::Choice(0)).await.unwrap();
    assert!(machine.snapshot().is_answered());

    assert!(matches!(
        machine.submit_answer(Answer::Choice(0)).await,
        Err(SessionError::AlreadyAnswered)
    ));
    assert!(matches!(
        machine.skip().await,
        Err(SessionError::AlreadyAnswered)
    ));
    assert_eq!(api.submissions().len(), 1);
    let state = machine.snapshot();
    assert!(!state.is_loading());
    assert!(state.feedback().unwrap().is_correct());

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    let state = machine.snapshot();
    assert_eq!(state.hurdle().unwrap().idx, 1);
    assert!(!state.is_answered());

    api.push_submission(Ok(graded(true, 2)));
    machine.submit_answer(Answer::Choice(1)).await.unwrap();
    assert_eq!(api.submissions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn incorrect_answer_can_be_retried() {
    let api = InMemoryApi::new();
    let settings = SessionSettings::default().with_advance(AdvancePolicy::ConfirmCorrect {
        incorrect_delay: Duration::from_secs(60),
    });
    let machine = started(&api, settings).await;
    api.push_submission(Ok(graded(false, 0)));
    api.push_submission(Ok(graded(true, 1)));

    machine.submit_answer(Answer::Choice(3)).await.unwrap();
    assert!(!machine.snapshot().is_answered());
    let retry = machine.submit_answer(Answer::Choice(1)).await.unwrap();

    assert!(retry.is_correct());
    assert_eq!(api.submissions().len(), 2);
    assert_eq!(machine.snapshot().progress().current(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_submit_keeps_the_question_open() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Err(ApiError::Status {
        status: 500,
        message: "Internal Server Error".to_owned(),
    }));
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    let before = machine.snapshot();

    let err = machine.submit_answer(Answer::Choice(0)).await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let after = machine.snapshot();
    assert_eq!(after.hurdle(), before.hurdle());
    assert_eq!(after.progress(), before.progress());
    assert!(after.feedback().is_none());
    assert!(!after.is_loading());
    assert!(!after.is_answered());
    assert!(after.error().is_some());
    assert!(after.timer().running);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(machine.snapshot().timer().seconds, 2);
    assert_eq!(api.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_skip_keeps_the_question_and_can_be_retried() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Err(ApiError::Unavailable("connection refused".to_owned())));

    let err = machine.skip().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let state = machine.snapshot();
    assert_eq!(state.hurdle().unwrap().idx, 0);
    assert!(state.feedback().is_none());
    assert!(!state.is_loading());
    assert!(state.error().is_some());
    assert!(state.timer().running);
    assert_eq!(api.fetch_count(), 1);

    api.push_submission(Ok(SubmitOutcome::default()));
    api.push_hurdle(Ok(choice_hurdle(1)));
    machine.skip().await.unwrap();
    let state = machine.snapshot();
    assert_eq!(state.hurdle().unwrap().idx, 1);
    assert!(state.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn skip_whose_next_fetch_fails_keeps_the_note_and_waits_for_a_retry() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_submission(Ok(SubmitOutcome {
        current: Some(1),
        ..SubmitOutcome::default()
    }));
    api.push_hurdle(Err(ApiError::Application("Failed to generate task".to_owned())));

    let err = machine.skip().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let state = machine.snapshot();
    assert_eq!(state.feedback().unwrap().outcome, FeedbackOutcome::Skipped);
    assert_eq!(state.error(), Some("Failed to generate task"));
    assert_eq!(state.progress().current(), 1);
    assert!(state.is_answered());
    assert!(!state.is_loading());
    assert!(!state.timer().running);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(machine.snapshot().feedback().is_some());
    assert_eq!(api.fetch_count(), 2);
    assert!(matches!(
        machine.submit_answer(Answer::Choice(0)).await,
        Err(SessionError::AlreadyAnswered)
    ));

    api.push_hurdle(Ok(cloze_hurdle(1)));
    let phase = machine.continue_to_next().await.unwrap();
    assert_eq!(phase, SessionPhase::Question);
    let state = machine.snapshot();
    assert_eq!(state.hurdle().unwrap().task_type(), TaskType::Cloze);
    assert!(!state.is_answered());
    assert!(state.feedback().is_none());
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_query_clears_its_loading_flag() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_query(Err(ApiError::Application("No relevant content found".to_owned())));

    let err = machine.ask("what is ATP?").await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let state = machine.snapshot();
    assert!(!state.query().loading);
    assert!(state.query().response.is_empty());
    assert_eq!(state.error(), Some("No relevant content found"));
    assert_eq!(state.phase(), SessionPhase::Question);
}

#[tokio::test(start_paused = true)]
async fn failed_report_clears_its_loading_flag() {
    let api = InMemoryApi::new();
    let machine = started(&api, SessionSettings::default()).await;
    api.push_hurdle(Ok(HurdleFetch::Done));
    machine.fetch_next_hurdle().await.unwrap();
    api.push_report(Err(ApiError::Status {
        status: 404,
        message: "Not Found".to_owned(),
    }));

    let err = machine.request_performance_summary().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    let state = machine.snapshot();
    assert!(!state.is_performance_loading());
    assert!(state.performance().is_none());
    assert!(state.error().is_some());
    assert_eq!(state.phase(), SessionPhase::Done);
}

#[tokio::test(start_paused = true)]
async fn completion_message_source_asks_the_completion_endpoint() {
    let api = InMemoryApi::new();
    let settings =
        SessionSettings::default().with_summary_source(SummarySource::CompletionMessage);
    let machine = started(&api, settings).await;
    api.push_hurdle(Ok(HurdleFetch::Done));
    machine.fetch_next_hurdle().await.unwrap();
    api.push_report(Ok(PerformanceSummary {
        message: Some("Great work!".to_owned()),
        ..PerformanceSummary::default()
    }));

    let summary = machine.request_performance_summary().await.unwrap();

    assert_eq!(summary.message.as_deref(), Some("Great work!"));
    assert_eq!(api.calls().last(), Some(&ApiCall::CompletionMessage(pdf())));
    assert!(!api.calls().contains(&ApiCall::Performance(pdf())));
}
