use crate::{builtin_card, load_obj, AssetError};
use pickscene_scene::{Model, ModelConfig};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Load the configured model and apply its root transform and color.
pub fn load_model(config: &ModelConfig) -> Result<Model, AssetError> {
    let mut model = match &config.path {
        Some(path) => load_obj(path)?,
        None => builtin_card(),
    };
    model.root = config.root_transform();
    for part in model.parts_mut() {
        part.resting_color = config.resting_color;
        part.reset_color();
    }
    Ok(model)
}

/// Progress of a background load, as seen by one `poll`.
#[derive(Debug)]
pub enum LoadStatus {
    Pending,
    Ready(Model),
    Failed(AssetError),
    /// The result was already handed out.
    Finished,
}

/// Loads a model on a background thread.
///
/// Poll once per frame; the result is delivered exactly once. There is no
/// cancellation or retry.
#[derive(Debug)]
pub struct ModelLoader {
    rx: Option<Receiver<Result<Model, AssetError>>>,
}

impl ModelLoader {
    pub fn spawn(config: ModelConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let source = config
                    .path
                    .as_ref()
                    .map_or_else(|| "builtin card".to_string(), |p| p.display().to_string());
                tracing::debug!(%source, "loading model");
                // The receiver may be gone if the host already shut down.
                let _ = worker_tx.send(load_model(&config));
            });
        if let Err(e) = spawned {
            let _ = tx.send(Err(AssetError::Io(e)));
        }
        Self { rx: Some(rx) }
    }

    /// Non-blocking check for the result.
    pub fn poll(&mut self) -> LoadStatus {
        let Some(rx) = &self.rx else {
            return LoadStatus::Finished;
        };
        let status = match rx.try_recv() {
            Ok(Ok(model)) => LoadStatus::Ready(model),
            Ok(Err(e)) => LoadStatus::Failed(e),
            Err(TryRecvError::Empty) => return LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => LoadStatus::Failed(AssetError::Disconnected),
        };
        self.rx = None;
        if let LoadStatus::Failed(e) = &status {
            tracing::warn!(error = %e, "model load failed; continuing without a model");
        }
        status
    }

    /// Block until the load finishes.
    pub fn wait(mut self) -> Result<Model, AssetError> {
        let rx = self.rx.take().ok_or(AssetError::Disconnected)?;
        rx.recv().map_err(|_| AssetError::Disconnected)?
    }

    pub fn is_finished(&self) -> bool {
        self.rx.is_none()
    }
}
