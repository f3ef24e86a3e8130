use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};

use bergen_core::model::{WordChapter, WordEntry};
use bergen_core::time::test_clock;
use services::{
    AppServices, AppServicesError, ControllerError, QuizConfig, QuizController, QuizPhase,
    QuizSnapshot,
};
use storage::{InMemoryRepository, StorageError, WordBank, WordRepository};

fn bank(n: usize) -> Arc<WordBank> {
    let entries = (0..n)
        .map(|i| {
            WordEntry::new(
                format!("ord{i}"),
                vec![format!("riktig {i}")],
                vec![format!("feil {i}a"), format!("feil {i}b")],
                None,
                "Uttrykk",
            )
            .unwrap()
        })
        .collect();
    Arc::new(WordBank::new(vec![WordChapter::new("Uttrykk", entries)]))
}

fn config(questions: usize) -> QuizConfig {
    QuizConfig::default()
        .with_question_count(questions)
        .with_seed(Some(42))
}

async fn wait_for(
    rx: &mut watch::Receiver<QuizSnapshot>,
    pred: impl FnMut(&QuizSnapshot) -> bool,
) -> QuizSnapshot {
    rx.wait_for(pred).await.unwrap().clone()
}

fn option_starting_with(snapshot: &QuizSnapshot, prefix: &str) -> String {
    snapshot
        .question
        .as_ref()
        .unwrap()
        .option_texts()
        .into_iter()
        .find(|o| o.starts_with(prefix))
        .unwrap()
        .to_owned()
}

#[tokio::test(start_paused = true)]
async fn answered_question_reveals_then_auto_advances() {
    let (handle, mut rx, _task) = QuizController::spawn(bank(3), config(3), test_clock());

    let visible = wait_for(&mut rx, |s| s.phase == QuizPhase::OptionsVisible).await;
    assert_eq!(visible.question.as_ref().unwrap().options.len(), 3);
    handle
        .select_answer(option_starting_with(&visible, "riktig"))
        .await
        .unwrap();

    let revealed = wait_for(&mut rx, |s| s.phase == QuizPhase::ResultRevealed).await;
    assert_eq!(revealed.score, 1);
    let revealed_at = Instant::now();

    let next = wait_for(&mut rx, |s| s.current_index == 1).await;
    assert!(revealed_at.elapsed() >= Duration::from_millis(4_500));
    assert_eq!(next.phase, QuizPhase::AwaitingOptions);
    assert!(next.selected_answer.is_none());
    assert_eq!(next.score, 1);
}

#[tokio::test(start_paused = true)]
async fn selection_before_options_is_ignored() {
    let (handle, mut rx, _task) = QuizController::spawn(bank(3), config(3), test_clock());
    assert_eq!(rx.borrow().phase, QuizPhase::AwaitingOptions);

    handle.select_option(0).await.unwrap();
    let next = wait_for(&mut rx, |s| s.phase != QuizPhase::AwaitingOptions).await;
    assert_eq!(next.phase, QuizPhase::OptionsVisible);
    assert!(next.selected_answer.is_none());
    assert_eq!(next.time_remaining, Duration::from_secs(15));

    handle.select_option(0).await.unwrap();
    let selected = wait_for(&mut rx, |s| s.phase == QuizPhase::AnswerSelected).await;
    assert!(selected.selected_answer.is_some());
}

#[tokio::test(start_paused = true)]
async fn timed_out_question_waits_for_next() {
    let (handle, mut rx, _task) = QuizController::spawn(bank(3), config(3), test_clock());

    let timed_out = wait_for(&mut rx, |s| s.phase == QuizPhase::TimedOut).await;
    assert!(timed_out.awaiting_advance);
    assert!(timed_out.result_revealed);
    assert_eq!(timed_out.time_remaining, Duration::ZERO);

    sleep(Duration::from_secs(30)).await;
    let idle = rx.borrow().clone();
    assert_eq!(idle.current_index, 0);
    assert_eq!(idle.phase, QuizPhase::TimedOut);

    // Late selections after a timeout are ignored.
    handle
        .select_answer(option_starting_with(&idle, "riktig"))
        .await
        .unwrap();
    handle.next_question().await.unwrap();
    let next = wait_for(&mut rx, |s| s.current_index == 1).await;
    assert_eq!(next.score, 0);
    assert!(!next.timed_out);
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_pending_reveal() {
    let (handle, mut rx, _task) = QuizController::spawn(bank(5), config(3), test_clock());

    let visible = wait_for(&mut rx, |s| s.phase == QuizPhase::OptionsVisible).await;
    let first_session = visible.session_id;
    handle
        .select_answer(option_starting_with(&visible, "feil"))
        .await
        .unwrap();
    wait_for(&mut rx, |s| s.phase == QuizPhase::AnswerSelected).await;

    handle.restart().await.unwrap();
    let fresh = wait_for(&mut rx, |s| s.session_id != first_session).await;
    assert_eq!(fresh.current_index, 0);
    assert_eq!(fresh.score, 0);

    sleep(Duration::from_secs(1)).await;
    let after = rx.borrow().clone();
    assert_eq!(after.session_id, fresh.session_id);
    assert_eq!(after.phase, QuizPhase::AwaitingOptions);
    assert!(!after.result_revealed);
    assert!(after.selected_answer.is_none());
}

#[tokio::test(start_paused = true)]
async fn end_early_keeps_score_and_builds_summary() {
    let (handle, mut rx, _task) = QuizController::spawn(bank(4), config(4), test_clock());

    let visible = wait_for(&mut rx, |s| s.phase == QuizPhase::OptionsVisible).await;
    handle
        .select_answer(option_starting_with(&visible, "riktig"))
        .await
        .unwrap();
    wait_for(&mut rx, |s| s.phase == QuizPhase::ResultRevealed).await;

    handle.end_early().await.unwrap();
    let done = wait_for(&mut rx, |s| s.completed).await;
    assert!(done.question.is_none());
    let summary = done.summary.unwrap();
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.score(), 1);
    assert_eq!(summary.answered(), 1);
    assert!(summary.ended_early());
    assert_eq!(summary.percentage(), 25);
}

#[tokio::test(start_paused = true)]
async fn empty_bank_completes_immediately() {
    let (_handle, rx, _task) =
        QuizController::spawn(Arc::new(WordBank::default()), config(10), test_clock());

    let snapshot = rx.borrow().clone();
    assert!(snapshot.completed);
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.summary.unwrap().percentage(), 0);
}

#[tokio::test(start_paused = true)]
async fn handle_reports_closed_after_shutdown() {
    let (handle, _rx, task) = QuizController::spawn(bank(2), config(2), test_clock());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert_eq!(handle.next_question().await, Err(ControllerError::Closed));
}

struct FailingRepository;

#[async_trait]
impl WordRepository for FailingRepository {
    async fn load_chapters(&self) -> Result<Vec<WordChapter>, StorageError> {
        Err(StorageError::Io("disk on fire".into()))
    }
}

#[tokio::test]
async fn app_services_surface_storage_errors() {
    let err = AppServices::from_repository(&FailingRepository, test_clock())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppServicesError::Storage(StorageError::Io(_))));
}

#[tokio::test(start_paused = true)]
async fn app_services_run_quiz_and_flashcards_from_one_bank() {
    let repo = InMemoryRepository::with_chapters(vec![WordChapter::new(
        "Uttrykk",
        bank(6).entries().to_vec(),
    )]);
    let services = AppServices::from_repository(&repo, test_clock())
        .await
        .unwrap()
        .with_quiz_config(config(5));
    assert_eq!(services.word_bank().len(), 6);
    assert_eq!(services.quiz_config().question_count, 5);

    let (handle, rx, _task) = services.start_quiz();
    assert_eq!(rx.borrow().total, 5);
    handle.shutdown().await.unwrap();

    let mut cards = services.start_flashcards();
    assert_eq!(cards.len(), 6);
    cards.tap();
    assert!(cards.showing_answer());
}
