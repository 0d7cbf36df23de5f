use crate::GlobalArgs;
use anyhow::{Context, Result};
use slidewright_application::{PresentationOrchestrator, SlideComposer};
use slidewright_core::config::RootConfig;
use slidewright_core::credential::{CredentialProvider, StaticCredentialProvider};
use slidewright_core::presentation::{DocumentService, InMemoryDocumentService};
use slidewright_infrastructure::{ConfigService, SlidewrightPaths};
use slidewright_interaction::{EnvTokenProvider, OAuthAuthorizer, SlidesApiClient};
use slidewright_telemetry::{LoggingGuard, ProgressEvent, init_tracing};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Everything a command needs: configuration, logging, and the wired
/// document service and credential provider.
pub struct Runtime {
    pub config: RootConfig,
    service: Arc<dyn DocumentService>,
    credentials: Arc<dyn CredentialProvider>,
    dry_run: Option<Arc<InMemoryDocumentService>>,
    progress: Option<ProgressPrinter>,
    _logging: LoggingGuard,
}

impl Runtime {
    pub fn start(global: &GlobalArgs) -> Result<Self> {
        let paths = SlidewrightPaths::new(global.config_dir.as_deref());
        let mut config = ConfigService::new(&paths)
            .and_then(|service| service.get_config())
            .context("Failed to load configuration")?;
        if global.json_logs {
            config.logging.json = true;
        }

        let (progress, sender) = if global.progress {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Some(ProgressPrinter::spawn(receiver)), Some(sender))
        } else {
            (None, None)
        };

        let logs_dir = paths.logs_dir().ok();
        let logging = init_tracing(&config.logging, logs_dir.as_deref(), sender)
            .context("Failed to initialize logging")?;

        let (service, credentials, dry_run): (
            Arc<dyn DocumentService>,
            Arc<dyn CredentialProvider>,
            _,
        ) = if global.dry_run {
            tracing::info!("Dry run: using the in-memory document service");
            let memory = Arc::new(InMemoryDocumentService::new());
            (
                memory.clone(),
                Arc::new(StaticCredentialProvider::new("dry-run")),
                Some(memory),
            )
        } else {
            let client = SlidesApiClient::from_config(&config.slides)
                .context("Failed to create Slides API client")?;
            let env_tokens = EnvTokenProvider::new();
            let credentials: Arc<dyn CredentialProvider> = if env_tokens.is_available() {
                tracing::debug!("Using access token from the environment");
                Arc::new(env_tokens)
            } else {
                Arc::new(
                    OAuthAuthorizer::from_paths(&paths, config.auth.clone())
                        .context("Failed to set up OAuth")?,
                )
            };
            (Arc::new(client), credentials, None)
        };

        Ok(Self {
            config,
            service,
            credentials,
            dry_run,
            progress,
            _logging: logging,
        })
    }

    pub fn orchestrator(&self) -> PresentationOrchestrator {
        PresentationOrchestrator::new(
            self.service.clone(),
            self.credentials.clone(),
            self.config.composer.clone(),
        )
    }

    pub fn composer(&self) -> SlideComposer {
        SlideComposer::new(self.service.clone(), self.config.composer.clone())
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.is_some()
    }

    /// Prints where to find `document_id`: its URL, or its in-memory
    /// contents on a dry run.
    pub async fn show_document(&self, document_id: &str) -> Result<()> {
        match &self.dry_run {
            Some(memory) => {
                if let Some(document) = memory.document(document_id).await {
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
            }
            None => println!("https://docs.google.com/presentation/d/{document_id}/edit"),
        }
        Ok(())
    }

    /// Flushes pending progress output.
    pub async fn finish(self) -> Result<()> {
        if let Some(progress) = self.progress {
            progress.shutdown().await?;
        }
        Ok(())
    }
}

struct ProgressPrinter {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressPrinter {
    fn spawn(mut receiver: mpsc::UnboundedReceiver<ProgressEvent>) -> Self {
        let (shutdown, mut stop) = oneshot::channel();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = receiver.recv() => print_event(&event),
                    _ = &mut stop => {
                        while let Ok(event) = receiver.try_recv() {
                            print_event(&event);
                        }
                        break;
                    }
                }
            }
        });
        Self { shutdown, handle }
    }

    async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.handle.await.context("Progress printer panicked")
    }
}

fn print_event(event: &ProgressEvent) {
    if event.target.starts_with("slidewright") {
        println!("  {event}");
    }
}
