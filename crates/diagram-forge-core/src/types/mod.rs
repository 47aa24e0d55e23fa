mod area;
mod color;
mod column;
mod diagram;
mod diagram_id;
mod element_id;
mod index;
mod label_alignment;
mod position;
mod reference;
mod relationship_kind;
mod table;

pub use area::Area;
pub use color::Color;
pub use column::Column;
pub use diagram::{Diagram, DEFAULT_DATABASE_TYPE, DEFAULT_DIAGRAM_NAME};
pub use diagram_id::DiagramId;
pub use element_id::{AreaId, ReferenceId, TableId};
pub use index::Index;
pub use label_alignment::{LabelHorizontal, LabelVertical};
pub use position::Position;
pub use reference::Reference;
pub use relationship_kind::RelationshipKind;
pub use table::Table;
