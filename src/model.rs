use std::path::{Path, PathBuf};

use tensorflow::{
    Graph, ImportGraphDefOptions, Operation, Session, SessionOptions, SessionRunArgs, Tensor,
};
use thiserror::Error;

use crate::preprocess::ImageTensor;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tensorflow: {0}")]
    TensorFlow(String),
    #[error("operation '{0}' not found in graph")]
    MissingOperation(String),
    #[error("model returned an empty output")]
    EmptyOutput,
    #[error("model predicted class {class_id} but only {labels} labels are loaded")]
    UnknownClass { class_id: usize, labels: usize },
}

impl From<tensorflow::Status> for ModelError {
    fn from(status: tensorflow::Status) -> Self {
        ModelError::TensorFlow(status.to_string())
    }
}

/// A pre-trained image classifier. Maps one `[1, height, width, 3]` tensor to
/// per-class probabilities.
///
/// Implementations are shared read-only across concurrent requests.
pub trait Classifier: Send + Sync {
    fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>, ModelError>;
}

/// Frozen TensorFlow graph run through a single session.
pub struct TfClassifier {
    session: Session,
    input: Operation,
    output: Operation,
}

impl TfClassifier {
    pub fn load(model_path: &Path, input_op: &str, output_op: &str) -> Result<Self, ModelError> {
        let model_bytes = std::fs::read(model_path).map_err(|source| ModelError::Io {
            path: model_path.to_path_buf(),
            source,
        })?;
        Self::from_graph_def(&model_bytes, input_op, output_op)
    }

    pub fn from_graph_def(
        graph_def: &[u8],
        input_op: &str,
        output_op: &str,
    ) -> Result<Self, ModelError> {
        let mut graph = Graph::new();
        graph.import_graph_def(graph_def, &ImportGraphDefOptions::new())?;
        let session = Session::new(&SessionOptions::new(), &graph)?;

        Ok(TfClassifier {
            session,
            input: operation(&graph, input_op)?,
            output: operation(&graph, output_op)?,
        })
    }
}

fn operation(graph: &Graph, name: &str) -> Result<Operation, ModelError> {
    graph
        .operation_by_name(name)?
        .ok_or_else(|| ModelError::MissingOperation(name.to_string()))
}

impl Classifier for TfClassifier {
    fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>, ModelError> {
        let input_tensor = Tensor::new(&input.dims).with_values(&input.data)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&self.input, 0, &input_tensor);
        let output_token = args.request_fetch(&self.output, 0);
        self.session.run(&mut args)?;

        let output_tensor: Tensor<f32> = args.fetch(output_token)?;
        Ok(output_tensor.to_vec())
    }
}
