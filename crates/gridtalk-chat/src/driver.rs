//! The turn loop: drives one stimulus at a time through the store and backend

use std::sync::Arc;

use gridtalk_ai::Orchestrate;

use crate::{
    codec,
    error::{Error, Result},
    session::SessionStore,
    turn::Turn,
    window::window,
};

/// What happens to the pending image after a submission consumes it.
///
/// The default keeps the upload in place so follow-up questions can refer to
/// the same image; it stays until the user removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageRetention {
    /// Keep the pending image across submissions until explicitly removed
    #[default]
    Retain,
    /// Clear the pending image after the first submission that uses it
    ConsumeOnce,
}

/// Turn loop configuration
#[derive(Debug, Clone)]
pub struct TurnLoopConfig {
    /// Maximum number of history turns sent to the backend
    pub history_limit: usize,
    /// Pending-image consumption policy
    pub image_retention: ImageRetention,
}

impl Default for TurnLoopConfig {
    fn default() -> Self {
        Self {
            history_limit: 6,
            image_retention: ImageRetention::default(),
        }
    }
}

/// Turn loop state. `AwaitingReply` spans exactly the backend call; there is
/// no overlap of in-flight calls within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    AwaitingReply,
}

/// The render surface: a full projection of the conversation, redrawn from a
/// store snapshot after every completed state transition. Decoupled from the
/// loop so the loop is testable without a UI.
pub trait Render {
    fn render(&mut self, turns: &[Turn]);
}

/// Renderer that draws nothing, for headless one-shot runs
struct NullRender;

impl Render for NullRender {
    fn render(&mut self, _turns: &[Turn]) {}
}

/// The turn loop: owns one session's store and processes one external
/// stimulus (submission, upload, upload removal) to completion at a time.
pub struct TurnLoop {
    config: TurnLoopConfig,
    store: SessionStore,
    orchestrator: Arc<dyn Orchestrate>,
    state: LoopState,
}

impl TurnLoop {
    /// Create a turn loop with a fresh session store
    pub fn new(config: TurnLoopConfig, orchestrator: Arc<dyn Orchestrate>) -> Self {
        Self {
            config,
            store: SessionStore::new(),
            orchestrator,
            state: LoopState::Idle,
        }
    }

    /// Current loop state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The session store (read-only)
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Read-only copy of the conversation
    pub fn snapshot(&self) -> Vec<Turn> {
        self.store.snapshot()
    }

    /// Replace the conversation (for loading a previous session)
    pub fn set_turns(&mut self, turns: Vec<Turn>) {
        self.store = SessionStore::new();
        for turn in turns {
            self.store.append(turn);
        }
    }

    /// Upload stimulus: validate the raw file bytes through the codec and
    /// populate the pending image slot. On codec failure the slot is left
    /// unset and the session continues.
    pub fn attach_image(&mut self, bytes: &[u8], renderer: &mut impl Render) -> Result<(u32, u32)> {
        debug_assert_eq!(self.state, LoopState::Idle);
        let raw = codec::load(bytes)?;
        let encoded = codec::encode(&raw)?;
        let dimensions = (raw.width(), raw.height());
        self.store.set_pending_image(raw, encoded);
        tracing::debug!(width = dimensions.0, height = dimensions.1, "image attached");
        renderer.render(&self.store.snapshot());
        Ok(dimensions)
    }

    /// Upload-removal stimulus: clear the pending image slot. Idempotent.
    pub fn remove_image(&mut self, renderer: &mut impl Render) {
        debug_assert_eq!(self.state, LoopState::Idle);
        self.store.clear_pending_image();
        renderer.render(&self.store.snapshot());
    }

    /// Whether an uploaded image is waiting to be attached to a submission
    pub fn has_pending_image(&self) -> bool {
        self.store.pending_image().is_some()
    }

    /// Submission stimulus: build the user turn (consuming any pending
    /// image), window the prior history, call the backend, and append the
    /// reply. Returns the reply text.
    ///
    /// The turn append is atomic — on any failure before or during the
    /// backend call, the store holds either nothing new or only the
    /// fully-constructed user turn, never a partial state.
    pub async fn submit(&mut self, prompt: &str, renderer: &mut impl Render) -> Result<String> {
        debug_assert_eq!(self.state, LoopState::Idle);

        // Construct and validate before any mutation
        let (turn, image_arg) = match self.store.pending_image() {
            Some(pending) => (
                Turn::user_with_image(prompt, pending.raw.clone())?,
                Some(pending.encoded.clone()),
            ),
            None => (Turn::user(prompt)?, None),
        };

        // Window over the history as it stood before this submission
        let prior = self.store.snapshot();
        let history = window(&prior, self.config.history_limit);

        self.store.append(turn);
        if image_arg.is_some() && self.config.image_retention == ImageRetention::ConsumeOnce {
            self.store.clear_pending_image();
        }
        renderer.render(&self.store.snapshot());

        tracing::debug!(
            history_len = history.len(),
            has_image = image_arg.is_some(),
            "submitting turn"
        );

        self.state = LoopState::AwaitingReply;
        let result = self
            .orchestrator
            .invoke(prompt, image_arg.as_deref(), &history)
            .await;
        self.state = LoopState::Idle;

        match result {
            Ok(reply) => {
                self.store.append(Turn::assistant(&reply)?);
                renderer.render(&self.store.snapshot());
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend call failed; no assistant turn appended");
                renderer.render(&self.store.snapshot());
                Err(Error::Backend(e))
            }
        }
    }
}

/// Run a single-turn conversation in a fresh session and return the reply.
/// This is the scripted smoke-test entry point: no history, no image.
pub async fn one_shot(orchestrator: Arc<dyn Orchestrate>, prompt: &str) -> Result<String> {
    let mut driver = TurnLoop::new(TurnLoopConfig::default(), orchestrator);
    driver.submit(prompt, &mut NullRender).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RawImage;
    use async_trait::async_trait;
    use gridtalk_ai::{ChatRole, HistoryEntry};
    use std::io::Cursor;
    use std::sync::Mutex;

    struct RecordedCall {
        prompt: String,
        image: Option<String>,
        history: Vec<HistoryEntry>,
    }

    struct MockOrchestrator {
        reply: String,
        fail: Mutex<bool>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockOrchestrator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                fail: Mutex::new(false),
                calls: Mutex::new(vec![]),
            })
        }

        fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Orchestrate for MockOrchestrator {
        async fn invoke(
            &self,
            prompt: &str,
            image: Option<&str>,
            history: &[HistoryEntry],
        ) -> gridtalk_ai::Result<String> {
            self.calls.lock().unwrap().push(RecordedCall {
                prompt: prompt.to_string(),
                image: image.map(str::to_string),
                history: history.to_vec(),
            });
            if *self.fail.lock().unwrap() {
                Err(gridtalk_ai::Error::api("server_error", "backend unavailable"))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    /// Renderer that records every snapshot it is handed
    #[derive(Default)]
    struct RecordingRender {
        frames: Vec<Vec<String>>,
    }

    impl Render for RecordingRender {
        fn render(&mut self, turns: &[Turn]) {
            self.frames
                .push(turns.iter().map(|t| t.content.text().to_string()).collect());
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut img = RawImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([200, 100, 50, 255]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    fn prior_turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("q{}", i)).unwrap()
                } else {
                    Turn::assistant(format!("a{}", i)).unwrap()
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_first_submission_sees_empty_history() {
        let mock = MockOrchestrator::new("hi there");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        let mut render = RecordingRender::default();

        let reply = driver.submit("hello", &mut render).await.unwrap();
        assert_eq!(reply, "hi there");

        let calls = mock.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "hello");
        assert!(calls[0].image.is_none());
        assert!(calls[0].history.is_empty());
        drop(calls);

        let turns = driver.snapshot();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].content.text(), "hello");
        assert_eq!(turns[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_window_excludes_in_flight_turn() {
        let mock = MockOrchestrator::new("a7");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        driver.set_turns(prior_turns(7));

        driver
            .submit("q7", &mut RecordingRender::default())
            .await
            .unwrap();

        let calls = mock.calls.lock().unwrap();
        let history = &calls[0].history;
        // turns #2..#7 of the prior conversation, in order; never the
        // in-flight "q7"
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].content, "a1");
        assert_eq!(history[5].content, "q6");
        assert!(history.iter().all(|e| e.content != "q7"));
    }

    #[tokio::test]
    async fn test_pending_image_travels_with_submission() {
        let mock = MockOrchestrator::new("that is a one-line diagram");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        let mut render = RecordingRender::default();

        driver.attach_image(&png_bytes(), &mut render).unwrap();
        driver.submit("what is this?", &mut render).await.unwrap();

        let turns = driver.snapshot();
        assert_eq!(turns[0].content.text(), "what is this?");
        assert!(turns[0].content.image().is_some());

        let calls = mock.calls.lock().unwrap();
        let expected = codec::encode(turns[0].content.image().unwrap()).unwrap();
        assert_eq!(calls[0].image.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_backend_failure_appends_no_assistant_turn() {
        let mock = MockOrchestrator::new("unused");
        mock.set_fail(true);
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        let mut render = RecordingRender::default();

        let err = driver.submit("hello", &mut render).await.unwrap_err();
        assert!(matches!(err, Error::Backend(_)));

        // only the user turn made it in, and the session stays usable
        assert_eq!(driver.snapshot().len(), 1);
        assert_eq!(driver.state(), LoopState::Idle);

        mock.set_fail(false);
        driver.submit("try again", &mut render).await.unwrap();
        assert_eq!(driver.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_retain_policy_keeps_image_for_reuse() {
        let mock = MockOrchestrator::new("ok");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        let mut render = RecordingRender::default();

        driver.attach_image(&png_bytes(), &mut render).unwrap();
        driver.submit("first look", &mut render).await.unwrap();
        assert!(driver.has_pending_image());

        driver.submit("second look", &mut render).await.unwrap();
        let calls = mock.calls.lock().unwrap();
        assert!(calls[1].image.is_some());
    }

    #[tokio::test]
    async fn test_consume_once_policy_clears_image() {
        let mock = MockOrchestrator::new("ok");
        let config = TurnLoopConfig {
            image_retention: ImageRetention::ConsumeOnce,
            ..Default::default()
        };
        let mut driver = TurnLoop::new(config, mock.clone());
        let mut render = RecordingRender::default();

        driver.attach_image(&png_bytes(), &mut render).unwrap();
        driver.submit("first look", &mut render).await.unwrap();
        assert!(!driver.has_pending_image());

        driver.submit("second look", &mut render).await.unwrap();
        let calls = mock.calls.lock().unwrap();
        assert!(calls[1].image.is_none());
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_any_mutation() {
        let mock = MockOrchestrator::new("unused");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock.clone());
        let mut render = RecordingRender::default();
        driver.attach_image(&png_bytes(), &mut render).unwrap();

        let err = driver.submit("", &mut render).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(driver.snapshot().is_empty());
        assert!(driver.has_pending_image());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_upload_leaves_slot_unset() {
        let mock = MockOrchestrator::new("unused");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock);
        let mut render = RecordingRender::default();

        let err = driver
            .attach_image(b"not an image", &mut render)
            .unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
        assert!(!driver.has_pending_image());
    }

    #[tokio::test]
    async fn test_render_redraws_all_turns_each_cycle() {
        let mock = MockOrchestrator::new("reply");
        let mut driver = TurnLoop::new(TurnLoopConfig::default(), mock);
        let mut render = RecordingRender::default();

        driver.submit("one", &mut render).await.unwrap();
        driver.submit("two", &mut render).await.unwrap();

        // each submission renders after the user append and after the reply
        assert_eq!(render.frames.len(), 4);
        assert_eq!(render.frames[0], ["one"]);
        assert_eq!(render.frames[1], ["one", "reply"]);
        assert_eq!(render.frames[3], ["one", "reply", "two", "reply"]);
    }

    #[tokio::test]
    async fn test_one_shot_runs_a_fresh_conversation() {
        let mock = MockOrchestrator::new("42");
        let reply = one_shot(mock.clone(), "calculate v at each bus").await.unwrap();
        assert_eq!(reply, "42");

        let calls = mock.calls.lock().unwrap();
        assert!(calls[0].history.is_empty());
        assert!(calls[0].image.is_none());
    }
}
