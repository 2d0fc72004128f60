pub mod path;
pub mod props;
pub mod store;

pub use path::{shortest_path, GraphPath};
pub use props::{Properties, Scalar};
pub use store::{Delta, EdgeData, GraphStore, VertexData};
