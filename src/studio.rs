// src/studio.rs
use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::errors::{Operation, StudioError};
use crate::models::GeneratedImage;
use crate::services::ImageGenerator;
use crate::session::Session;

/// The process-wide session plus the client that serves its submits.
///
/// The session lock is released while the remote call is outstanding, so
/// reads and configuration edits keep working; the session's own loading
/// flag is what turns away a second submit. The remote call and its commit
/// run on a spawned task, so a caller that goes away mid-request still
/// leaves the session idle once the call resolves.
pub struct Studio {
    session: Arc<Mutex<Session>>,
    generator: Arc<dyn ImageGenerator>,
}

impl Studio {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            generator,
        }
    }

    /// Runs `f` against the session under the lock.
    pub async fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self.session.lock().await;
        f(&mut session)
    }

    pub async fn generate(&self) -> Result<GeneratedImage, StudioError> {
        let ticket = self.session.lock().await.begin_generate()?;
        info!(
            "Submitting generation (reference: {})",
            ticket.reference.is_some()
        );

        let session = Arc::clone(&self.session);
        let generator = Arc::clone(&self.generator);
        let task = tokio::spawn(async move {
            let outcome = generator
                .generate(&ticket.prompt, &ticket.config, ticket.reference.as_ref())
                .await;
            if let Err(e) = &outcome {
                error!("Generation failed: {}", e);
            }

            session.lock().await.finish_generate(ticket, outcome)
        });

        self.settle(task, Operation::Generate).await
    }

    pub async fn edit(&self) -> Result<GeneratedImage, StudioError> {
        let ticket = self.session.lock().await.begin_edit()?;
        info!("Submitting edit");

        let session = Arc::clone(&self.session);
        let generator = Arc::clone(&self.generator);
        let task = tokio::spawn(async move {
            let outcome = generator.edit(&ticket.source, &ticket.instruction).await;
            if let Err(e) = &outcome {
                error!("Edit failed: {}", e);
            }

            session.lock().await.finish_edit(ticket, outcome)
        });

        self.settle(task, Operation::Edit).await
    }

    async fn settle(
        &self,
        task: JoinHandle<Result<GeneratedImage, StudioError>>,
        operation: Operation,
    ) -> Result<GeneratedImage, StudioError> {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("{:?} task did not complete: {}", operation, e);
                self.session.lock().await.abandon_pending();
                Err(StudioError::remote(operation, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::errors::{Operation, StudioError};
    use crate::models::{ArtDirection, InlineImage};
    use crate::services::ImageGenerator;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Generate {
            prompt: String,
            config: ArtDirection,
            reference: Option<InlineImage>,
        },
        Edit {
            source: InlineImage,
            instruction: String,
        },
    }

    /// Replays scripted outcomes in order; `None` scripts a failure. When
    /// gated, every call waits for `release` before answering.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        outcomes: StdMutex<VecDeque<Option<InlineImage>>>,
        calls: StdMutex<Vec<Call>>,
        gate: Option<Notify>,
    }

    impl ScriptedGenerator {
        pub fn new(outcomes: impl IntoIterator<Item = Option<InlineImage>>) -> Self {
            Self {
                outcomes: StdMutex::new(outcomes.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn gated(outcomes: impl IntoIterator<Item = Option<InlineImage>>) -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::new(outcomes)
            }
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, call: Call, operation: Operation) -> Result<InlineImage, StudioError> {
            self.calls.lock().unwrap().push(call);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.outcomes.lock().unwrap().pop_front().flatten() {
                Some(image) => Ok(image),
                None => Err(StudioError::remote(operation, "scripted failure")),
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            config: &ArtDirection,
            reference: Option<&InlineImage>,
        ) -> Result<InlineImage, StudioError> {
            let call = Call::Generate {
                prompt: prompt.to_string(),
                config: *config,
                reference: reference.cloned(),
            };
            self.answer(call, Operation::Generate).await
        }

        async fn edit(
            &self,
            source: &InlineImage,
            instruction: &str,
        ) -> Result<InlineImage, StudioError> {
            let call = Call::Edit {
                source: source.clone(),
                instruction: instruction.to_string(),
            };
            self.answer(call, Operation::Edit).await
        }
    }

    pub fn png(n: u8) -> InlineImage {
        InlineImage::new("image/png", vec![n; 4])
    }
}
