/// Pipeline - headless implementation of the Pipeline trait

use lattice_renderer::lattice::device::{Pipeline as RendererPipeline, ResourceId, VertexLayout};

pub struct Pipeline {
    pub(crate) id: ResourceId,
    pub(crate) label: String,
    /// Input layout; draws with a non-empty layout need a vertex buffer
    pub(crate) input_layout: VertexLayout,
}

impl RendererPipeline for Pipeline {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}
