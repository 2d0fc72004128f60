pub mod colormap;
pub mod primitive;
pub mod registry;
pub mod scene;
pub mod transform;

pub use colormap::{palette, Colormap, Rgba};
pub use primitive::{GroupId, Layer, Primitive, RenderSurface};
pub use registry::{EdgeVisual, VertexState, VertexVisual, VisualRegistry};
pub use scene::SceneBuffer;
pub use transform::CoordinateTransform;
