pub mod document;
pub mod error;
pub mod execution_queue;
pub mod expression;
pub mod graph_view;
pub mod node;
pub mod pairing;
pub mod painter;
pub mod unroll;
pub mod virtual_connection;

#[cfg(test)]
pub(crate) mod test_nodes;

pub use document::value::TaggedValue;
pub use document::{DocumentNode, InputConnector, NodeId, NodeNetwork, OutputConnector};
pub use error::{GraphError, NodeError};
pub use execution_queue::calculate_execution_queue;
pub use expression::{ColorModel, Expression, FuncContext, FuncValue, PixelContext, ShaderValue};
pub use graph_view::{GraphSource, GraphView};
pub use node::{Node, NodeInputs, PairKind, PairRole, PropertyDescriptor, PropertyKind, ValidationIssue};
pub use painter::Painter;
pub use pairing::{find_partner, loop_body};
pub use unroll::{UnrolledLoop, unroll};
pub use virtual_connection::{VirtualConnections, VirtualScope};
