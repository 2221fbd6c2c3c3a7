pub mod bar_layout;
pub mod connector;
pub mod label_domain;
pub mod primitives;
pub mod time_scale;
pub mod types;

pub use bar_layout::{
    Anchor, BarLayoutResolver, BarPair, ElementConfig, Position, RowKind, Size,
};
pub use connector::{
    ARROW_MARGIN, ARROW_SIZE, ARROW_Z_INDEX, ArrowDirection, Arrowhead, BarEdge,
    CONNECTOR_Z_INDEX, ConnectorPath, ConnectorRouter, RelationKind, RouteContext, RowBand,
    Segment,
};
pub use label_domain::{LabelDomainResolver, LabelInput, LabelOrder, LabelPlacement};
pub use time_scale::TimeScale;
pub use types::{Point, Rect, TimeRange, Viewport};
