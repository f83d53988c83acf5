//! Conversion state machine.
//!
//! `Idle -> Validating -> Submitting -> AwaitingResponse -> Succeeded | Failed`.
//!
//! `Succeeded` and `Failed` are resting states just like `Idle`: they keep the
//! last artifact or error on screen and accept a new submission directly,
//! which goes straight back to `Validating`. There is no automatic return to
//! `Idle`; editing the input drops a `Failed` error back to `Idle`, while a
//! `Succeeded` artifact stays until the next submission replaces it.
//! The request runs on a worker thread that owns the progress ticker for the
//! lifetime of the request; the UI thread calls [`Orchestrator::poll`] to
//! drain its events.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::classifier::{classify, UNKNOWN_FAILURE};
use crate::client::{BackendFailure, ConversionBackend};
use crate::config::{AppConfig, BackendConfig, ConversionPolicy};
use crate::download::{prepare_download, DownloadError, DownloadRequest};
use crate::history::{original_format, ConversionHistory, HistoryEntry};
use crate::input::InputSelector;
use crate::models::{
    ConversionJob, ConvertSuccess, ConvertedArtifact, ErrorState, OutputFormat, SelectedFile,
};
use crate::progress::{ProgressTicker, COMPLETE};
use crate::submission::SubmissionPayload;
use crate::validation::{ValidationError, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionPhase {
    Idle,
    Validating,
    Submitting,
    AwaitingResponse,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    /// Ready. `notice` carries a validation or download-guard error.
    Idle { notice: Option<ErrorState> },
    Validating,
    Submitting { progress: f32 },
    AwaitingResponse { progress: f32 },
    Succeeded { artifact: ConvertedArtifact },
    /// `progress` is wherever the ticker was when the failure arrived.
    Failed { error: ErrorState, progress: f32 },
}

impl ConversionState {
    pub fn phase(&self) -> ConversionPhase {
        match self {
            Self::Idle { .. } => ConversionPhase::Idle,
            Self::Validating => ConversionPhase::Validating,
            Self::Submitting { .. } => ConversionPhase::Submitting,
            Self::AwaitingResponse { .. } => ConversionPhase::AwaitingResponse,
            Self::Succeeded { .. } => ConversionPhase::Succeeded,
            Self::Failed { .. } => ConversionPhase::Failed,
        }
    }
}

#[derive(Debug)]
enum JobEvent {
    Dispatched,
    Progress(f32),
    Finished(Result<ConvertSuccess, BackendFailure>),
}

struct ActiveJob {
    events: Receiver<JobEvent>,
    source_url: Option<String>,
    history_label: String,
    format: OutputFormat,
}

pub struct Orchestrator {
    backend: Arc<dyn ConversionBackend>,
    config: BackendConfig,
    policy: ConversionPolicy,
    validator: Validator,
    selector: InputSelector,
    format: OutputFormat,
    state: ConversionState,
    active: Option<ActiveJob>,
    history: ConversionHistory,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ConversionBackend>, config: &AppConfig) -> Self {
        Self {
            backend,
            config: config.backend.clone(),
            validator: Validator::new(&config.policy),
            policy: config.policy.clone(),
            selector: InputSelector::new(),
            format: OutputFormat::default(),
            state: ConversionState::Idle { notice: None },
            active: None,
            history: ConversionHistory::default(),
        }
    }

    pub fn backend(&self) -> Arc<dyn ConversionBackend> {
        Arc::clone(&self.backend)
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    pub fn phase(&self) -> ConversionPhase {
        self.state.phase()
    }

    pub fn is_converting(&self) -> bool {
        matches!(
            self.state,
            ConversionState::Submitting { .. } | ConversionState::AwaitingResponse { .. }
        )
    }

    pub fn progress(&self) -> f32 {
        match &self.state {
            ConversionState::Idle { .. } | ConversionState::Validating => 0.0,
            ConversionState::Submitting { progress }
            | ConversionState::AwaitingResponse { progress }
            | ConversionState::Failed { progress, .. } => *progress,
            ConversionState::Succeeded { .. } => COMPLETE,
        }
    }

    pub fn artifact(&self) -> Option<&ConvertedArtifact> {
        match &self.state {
            ConversionState::Succeeded { artifact } => Some(artifact),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorState> {
        match &self.state {
            ConversionState::Idle { notice } => notice.as_ref(),
            ConversionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn selector(&self) -> &InputSelector {
        &self.selector
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn history(&self) -> &ConversionHistory {
        &self.history
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        log::debug!("Selected file {} ({} bytes)", file.name, file.size);
        self.selector.set_file(file);
        self.clear_error();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.selector.set_url(url);
        self.clear_error();
    }

    pub fn clear_input(&mut self) {
        self.selector.clear();
        self.clear_error();
    }

    /// Stale errors never survive an input edit; a finished artifact does.
    fn clear_error(&mut self) {
        if matches!(
            self.state,
            ConversionState::Failed { .. } | ConversionState::Idle { notice: Some(_) }
        ) {
            self.transition(ConversionState::Idle { notice: None });
        }
    }

    /// Validates the current input and, when it passes, submits one job.
    ///
    /// Ignored while a job is already in flight.
    pub fn start_conversion(&mut self) -> Result<(), ValidationError> {
        if self.is_converting() {
            log::debug!("Conversion already in flight; ignoring convert request");
            return Ok(());
        }

        self.transition(ConversionState::Validating);
        let checked = self
            .validator
            .validate(self.selector.current())
            .and_then(|()| {
                self.selector
                    .current()
                    .cloned()
                    .ok_or(ValidationError::EmptyInput)
            });
        let input = match checked {
            Ok(input) => input,
            Err(err) => {
                log::info!("Rejected conversion input: {err}");
                self.transition(ConversionState::Idle {
                    notice: Some(ErrorState::new(err.to_string())),
                });
                return Err(err);
            }
        };

        let job = ConversionJob {
            input,
            format: self.format,
        };
        let payload = SubmissionPayload::build(&job);
        let (tx, rx) = mpsc::channel();

        self.active = Some(ActiveJob {
            events: rx,
            source_url: job.input.source_url().map(str::to_string),
            history_label: original_format(&job.input),
            format: job.format,
        });
        self.transition(ConversionState::Submitting { progress: 0.0 });

        spawn_job(
            Arc::clone(&self.backend),
            payload,
            self.policy.tick_interval,
            tx,
        );
        Ok(())
    }

    /// Applies pending worker events. Returns `true` when state changed.
    pub fn poll(&mut self) -> bool {
        let Some(active) = self.active.as_ref() else {
            return false;
        };

        let mut events = Vec::new();
        let mut disconnected = false;
        loop {
            match active.events.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        let changed = !events.is_empty() || disconnected;
        for event in events {
            match event {
                JobEvent::Dispatched => {
                    if let ConversionState::Submitting { progress } = self.state {
                        self.transition(ConversionState::AwaitingResponse { progress });
                    }
                }
                JobEvent::Progress(value) => match &mut self.state {
                    ConversionState::Submitting { progress }
                    | ConversionState::AwaitingResponse { progress } => {
                        if value > *progress {
                            *progress = value;
                        }
                    }
                    _ => {}
                },
                JobEvent::Finished(outcome) => {
                    self.finish(outcome);
                    return true;
                }
            }
        }

        if disconnected && self.is_converting() {
            log::error!("Conversion worker ended without a result");
            let progress = self.progress();
            self.active = None;
            self.transition(ConversionState::Failed {
                error: ErrorState::new(UNKNOWN_FAILURE),
                progress,
            });
        }

        changed
    }

    fn finish(&mut self, outcome: Result<ConvertSuccess, BackendFailure>) {
        let Some(active) = self.active.take() else {
            return;
        };

        match outcome {
            Ok(reply) => {
                log::info!("Conversion successful: {}", reply.name);
                self.history.record(HistoryEntry {
                    name: reply.name.clone(),
                    original_format: active.history_label,
                    converted_format: active.format.to_string(),
                    size: reply.size.clone(),
                });
                self.transition(ConversionState::Succeeded {
                    artifact: reply.into(),
                });
            }
            Err(failure) => {
                log::error!("Conversion error: {failure:?}");
                let progress = self.progress();
                let error = classify(active.source_url.as_deref(), &failure, &self.policy);
                self.transition(ConversionState::Failed { error, progress });
            }
        }
    }

    /// Resolves the finished artifact's download link.
    ///
    /// Without an artifact the guard error becomes the visible error.
    pub fn request_download(&mut self) -> Result<DownloadRequest, DownloadError> {
        let result = prepare_download(&self.config, self.artifact());
        if let Err(err) = &result {
            log::warn!("Download not possible: {err}");
            if !self.is_converting() && self.artifact().is_none() {
                self.transition(ConversionState::Idle {
                    notice: Some(ErrorState::new(err.to_string())),
                });
            }
        }
        result
    }

    fn transition(&mut self, next: ConversionState) {
        let (from, to) = (self.state.phase(), next.phase());
        if from != to {
            log::debug!("Conversion state {from:?} -> {to:?}");
        }
        self.state = next;
    }
}

fn spawn_job(
    backend: Arc<dyn ConversionBackend>,
    payload: SubmissionPayload,
    tick_interval: Duration,
    tx: Sender<JobEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let ticks = tx.clone();
        let ticker = ProgressTicker::start(tick_interval, move |value| {
            ticks.send(JobEvent::Progress(value)).is_ok()
        });

        if tx.send(JobEvent::Dispatched).is_err() {
            log::debug!("Conversion abandoned before dispatch");
            return;
        }
        let outcome = backend.convert(payload);

        // The ticker is joined before the result is sent, so every tick is
        // queued ahead of it.
        ticker.stop();
        if tx.send(JobEvent::Finished(outcome)).is_err() {
            log::debug!("Conversion finished with nobody left to report to");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversionInput;
    use crate::config::DEFAULT_BACKEND_URL;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;
    use url::Url;

    type Reply = Result<ConvertSuccess, BackendFailure>;

    struct FakeBackend {
        calls: AtomicUsize,
        delay: Duration,
        reply: Mutex<Option<Reply>>,
        seen: Mutex<Vec<SubmissionPayload>>,
        panic: bool,
    }

    impl FakeBackend {
        fn replying(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
                panic: false,
            })
        }

        fn slow(reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Arc::into_inner(Self::replying(reply)).unwrap()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ConversionBackend for FakeBackend {
        fn convert(&self, payload: SubmissionPayload) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(payload);
            std::thread::sleep(self.delay);
            if self.panic {
                panic!("backend exploded");
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(BackendFailure::Transport("no reply".into())))
        }

        fn fetch(&self, _url: &Url) -> Result<Bytes, DownloadError> {
            Ok(Bytes::new())
        }
    }

    fn song() -> ConvertSuccess {
        ConvertSuccess {
            name: "song.mp3".to_string(),
            size: "3.1 MB".to_string(),
            bitrate: "192kbps".to_string(),
            download_url: "/api/download/song.mp3".to_string(),
        }
    }

    fn config(tick: Duration) -> AppConfig {
        AppConfig {
            backend: BackendConfig::parse(DEFAULT_BACKEND_URL).unwrap(),
            policy: ConversionPolicy {
                tick_interval: tick,
                ..ConversionPolicy::default()
            },
        }
    }

    fn orchestrator(backend: Arc<FakeBackend>) -> Orchestrator {
        Orchestrator::new(backend, &config(Duration::from_millis(1)))
    }

    fn settle(orchestrator: &mut Orchestrator) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            orchestrator.poll();
            if !orchestrator.is_converting() {
                return;
            }
            assert!(Instant::now() < deadline, "conversion never settled");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_empty_input_never_reaches_backend() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend.clone());

        assert_eq!(orchestrator.start_conversion(), Err(ValidationError::EmptyInput));
        assert_eq!(orchestrator.phase(), ConversionPhase::Idle);
        assert_eq!(
            orchestrator.error().map(|e| e.message.as_str()),
            Some("Please upload a file or enter a URL")
        );
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_invalid_url_never_reaches_backend() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend.clone());
        orchestrator.set_url("https://vimeo.com/1");

        assert_eq!(orchestrator.start_conversion(), Err(ValidationError::InvalidUrl));
        assert_eq!(orchestrator.phase(), ConversionPhase::Idle);
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_success_populates_artifact_and_completes_progress() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend.clone());
        orchestrator.set_url("https://www.youtube.com/watch?v=abc");

        orchestrator.start_conversion().unwrap();
        assert!(orchestrator.is_converting());
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), ConversionPhase::Succeeded);
        assert_eq!(orchestrator.progress(), 100.0);
        assert!(orchestrator.error().is_none());
        let artifact = orchestrator.artifact().unwrap();
        assert_eq!(artifact.name, "song.mp3");
        assert_eq!(artifact.download_path, "/api/download/song.mp3");
        assert_eq!(backend.calls(), 1);
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[test]
    fn test_failure_is_classified_and_progress_frozen() {
        let backend = FakeBackend::slow(
            Err(BackendFailure::Rejected {
                status: 500,
                message: Some("YouTube bot verification required".to_string()),
            }),
            Duration::from_millis(30),
        );
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("https://www.youtube.com/watch?v=abc");
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), ConversionPhase::Failed);
        let error = orchestrator.error().unwrap();
        assert!(error.is_source_platform_block);
        assert!(error.message.contains("YouTube bot verification required"));
        assert!(orchestrator.progress() < 100.0);
        assert!(orchestrator.artifact().is_none());
    }

    #[test]
    fn test_progress_is_monotonic_and_capped_while_in_flight() {
        let backend = FakeBackend::slow(Ok(song()), Duration::from_millis(150));
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("youtu.be/abc");
        orchestrator.start_conversion().unwrap();

        let mut last = 0.0;
        while orchestrator.is_converting() {
            orchestrator.poll();
            let now = orchestrator.progress();
            if orchestrator.is_converting() {
                assert!(now <= 95.0, "progress {now} above ceiling while in flight");
            }
            assert!(now >= last, "progress went backwards: {last} -> {now}");
            last = now;
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(orchestrator.phase(), ConversionPhase::Succeeded);
        assert_eq!(orchestrator.progress(), 100.0);
    }

    #[test]
    fn test_new_job_clears_previous_outcome() {
        let backend = FakeBackend::slow(Ok(song()), Duration::from_millis(50));
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("https://soundcloud.com/a/b");
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);
        assert!(orchestrator.artifact().is_some());

        orchestrator.start_conversion().unwrap();
        assert!(orchestrator.artifact().is_none());
        assert!(orchestrator.error().is_none());
        assert_eq!(orchestrator.progress(), 0.0);
        settle(&mut orchestrator);
    }

    #[test]
    fn test_new_job_after_failure_starts_clean() {
        let backend = FakeBackend::slow(
            Err(BackendFailure::Rejected {
                status: 500,
                message: Some("Conversion failed".to_string()),
            }),
            Duration::from_millis(30),
        );
        let mut orchestrator = orchestrator(backend.clone());
        orchestrator.set_url("https://soundcloud.com/a/b");
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);
        assert_eq!(orchestrator.phase(), ConversionPhase::Failed);
        assert!(orchestrator.progress() > 0.0);

        orchestrator.start_conversion().unwrap();
        assert_eq!(orchestrator.phase(), ConversionPhase::Submitting);
        assert!(orchestrator.error().is_none());
        assert_eq!(orchestrator.progress(), 0.0);
        settle(&mut orchestrator);
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_job_is_abandoned_when_orchestrator_is_gone() {
        let backend = FakeBackend::replying(Ok(song()));
        let payload = SubmissionPayload::build(&ConversionJob {
            input: ConversionInput::Url("https://youtu.be/x".to_string()),
            format: OutputFormat::Mp3,
        });
        let (tx, rx) = mpsc::channel();
        drop(rx);

        spawn_job(backend.clone(), payload, Duration::from_millis(1), tx)
            .join()
            .unwrap();
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_second_submit_while_in_flight_is_ignored() {
        let backend = FakeBackend::slow(Ok(song()), Duration::from_millis(50));
        let mut orchestrator = orchestrator(backend.clone());
        orchestrator.set_url("https://soundcloud.com/a/b");
        orchestrator.start_conversion().unwrap();
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);

        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_non_media_file_is_still_submitted() {
        let backend = FakeBackend::replying(Err(BackendFailure::Rejected {
            status: 415,
            message: Some("Unsupported media".to_string()),
        }));
        let mut orchestrator = orchestrator(backend.clone());
        orchestrator.select_file(SelectedFile::new("/docs/report.txt", 12));
        orchestrator.set_format(OutputFormat::Wav);
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);

        assert_eq!(backend.calls(), 1);
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].field_names(), ["file", "format"]);
        assert_eq!(seen[0].format, OutputFormat::Wav);
        let error = orchestrator.error().unwrap();
        assert_eq!(error.message, "Unsupported media");
        assert!(!error.is_source_platform_block);
    }

    #[test]
    fn test_input_change_clears_error_but_keeps_artifact() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend);
        assert!(orchestrator.start_conversion().is_err());
        assert!(orchestrator.error().is_some());

        orchestrator.set_url("https://youtu.be/x");
        assert!(orchestrator.error().is_none());

        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);
        orchestrator.select_file(SelectedFile::new("/a/b.mp3", 1));
        assert!(orchestrator.artifact().is_some());
        assert!(matches!(
            orchestrator.selector().current(),
            Some(ConversionInput::File(_))
        ));
    }

    #[test]
    fn test_clear_input_empties_selection_and_error() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("https://example.com/nope");
        assert_eq!(orchestrator.start_conversion(), Err(ValidationError::InvalidUrl));

        orchestrator.clear_input();

        assert!(orchestrator.selector().is_empty());
        assert!(orchestrator.error().is_none());
        assert_eq!(orchestrator.phase(), ConversionPhase::Idle);
    }

    #[test]
    fn test_worker_panic_lands_in_failed() {
        let backend = Arc::new(FakeBackend {
            panic: true,
            ..Arc::into_inner(FakeBackend::replying(Ok(song()))).unwrap()
        });
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("https://youtu.be/x");
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);

        assert_eq!(orchestrator.phase(), ConversionPhase::Failed);
        assert_eq!(orchestrator.error().unwrap().message, UNKNOWN_FAILURE);
        assert!(orchestrator.progress() < 100.0);
    }

    #[test]
    fn test_download_without_artifact_sets_error() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend);

        assert_eq!(orchestrator.request_download(), Err(DownloadError::NoArtifact));
        assert_eq!(
            orchestrator.error().map(|e| e.message.as_str()),
            Some("No URL available for the converted file.")
        );
    }

    #[test]
    fn test_download_after_success_resolves_against_backend() {
        let backend = FakeBackend::replying(Ok(song()));
        let mut orchestrator = orchestrator(backend);
        orchestrator.set_url("https://youtu.be/x");
        orchestrator.start_conversion().unwrap();
        settle(&mut orchestrator);

        let request = orchestrator.request_download().unwrap();
        assert_eq!(request.url.as_str(), "http://127.0.0.1:2001/api/download/song.mp3");
        assert_eq!(request.file_name, "song.mp3");
        assert!(orchestrator.artifact().is_some());
    }
}
