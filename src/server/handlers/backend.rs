//! Module implementing the backend that does the blocking work
//! (upstream requests & rendering) on behalf of request handlers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use memegen::{Compositor, Editor, ExportError, ExportFormat, ExportOutput,
              FetchError, RenderError, StyleParameters, Template, TemplateFetcher, Upstream};
use thiserror::Error;
use tokio::task;
use tokio::time;


/// Template ID that stands for a randomly picked template.
pub const RANDOM_TEMPLATE: &str = "random";


/// Does the actual work of the request handlers.
pub struct Backend {
    fetcher: TemplateFetcher<Box<dyn Upstream>>,
    compositor: Compositor,
    // Configuration params.
    task_timeout: Duration,
}

impl Backend {
    pub fn new<U: Upstream + 'static>(upstream: U, compositor: Compositor) -> Self {
        let upstream: Box<dyn Upstream> = Box::new(upstream);
        Backend{
            fetcher: TemplateFetcher::with_upstream(upstream),
            compositor,
            task_timeout: Duration::from_secs(0),
        }
    }

    #[inline]
    pub fn fetcher(&self) -> &TemplateFetcher<Box<dyn Upstream>> {
        &self.fetcher
    }

    #[inline]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Backend")
            .field("compositor", &self.compositor)
            .field("task_timeout", &self.task_timeout)
            .finish()
    }
}

// Configuration tweaks.
impl Backend {
    pub fn set_task_timeout(&mut self, timeout: Duration) -> &mut Self {
        let secs = timeout.as_secs();
        if secs > 0 {
            trace!("Setting request timeout to {} secs", secs);
        } else {
            trace!("Disabling request timeout");
        }
        self.task_timeout = timeout;
        self
    }
}

// Running tasks.
impl Backend {
    /// Run a blocking function on the thread pool for blocking work,
    /// subject to the task timeout.
    pub async fn run<F, T>(self: Arc<Self>, f: F) -> Result<T, TaskError>
        where F: FnOnce(&Backend) -> T + Send + 'static, T: Send + 'static
    {
        let timeout = self.task_timeout;
        let handle = task::spawn_blocking(move || f(&self));

        // The blocking thread isn't interrupted if the timeout elapses,
        // it just finishes its work in the background.
        let result = if timeout.as_secs() > 0 {
            time::timeout(timeout, handle).await.map_err(|_| {
                warn!("Task timed out after {} secs", timeout.as_secs());
                TaskError::Timeout
            })?
        } else {
            handle.await
        };
        result.map_err(|e| {
            error!("Blocking task failed: {}", e);
            TaskError::Unavailable
        })
    }
}

// Rendering.
impl Backend {
    /// Render a meme and export it to given format.
    pub fn render(&self, source: ImageRef, style: StyleParameters,
                  format: ExportFormat) -> Result<ExportOutput, MemeError> {
        debug!("Rendering meme from {:?}", source);

        let mut editor = Editor::new(self.compositor.clone());
        editor.set_style(style)?;
        match source {
            ImageRef::Upload(bytes) => {
                editor.upload_image(&bytes).map_err(|e| match e {
                    RenderError::Decode(_) => MemeError::BadImage(e),
                    e => MemeError::Render(e),
                })?;
            }
            ImageRef::Template(id) => {
                let template = self.find_template(&id)?;
                let pending = editor.select_template(template.clone());
                let bytes = match self.fetcher.load_image(&template) {
                    Ok(b) => b,
                    Err(e) => {
                        editor.image_failed(pending, &e);
                        return Err(e.into());
                    }
                };
                editor.image_loaded(pending, &bytes)?;
            }
        }

        let output = editor.export(format)?;
        debug!("Successfully rendered meme as {:?}, final result size: {} bytes",
            output.format(), output.len());
        Ok(output)
    }

    fn find_template(&self, id: &str) -> Result<Template, MemeError> {
        if id == RANDOM_TEMPLATE {
            return Ok(self.fetcher.pick_random_template()?);
        }
        self.fetcher.find_template(id)?
            .ok_or_else(|| MemeError::TemplateNotFound(id.to_owned()))
    }
}


/// Reference to the image that a meme is rendered from.
#[derive(Clone, PartialEq)]
pub enum ImageRef {
    /// Encoded image sent with the request.
    Upload(Vec<u8>),
    /// ID of the template (or `RANDOM_TEMPLATE`).
    Template(String),
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ImageRef::Upload(ref bytes) => write!(fmt, "Upload(<{} bytes>)", bytes.len()),
            ImageRef::Template(ref id) => write!(fmt, "Template({:?})", id),
        }
    }
}


/// Error that can occur while running a task on the `Backend`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Timeout while performing the task.
    #[error("request timed out")]
    Timeout,
    /// The task couldn't complete.
    #[error("service temporarily unavailable")]
    Unavailable,
}

/// Error that can occur while rendering a meme.
#[derive(Debug, Error)]
pub enum MemeError {
    #[error("template `{0}` not found")]
    TemplateNotFound(String),
    #[error("cannot fetch template: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid image: {0}")]
    BadImage(#[source] RenderError),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Export(#[from] ExportError),
}
