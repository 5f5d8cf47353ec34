pub mod pdv;
pub mod result;
pub mod tokens;
pub mod trajectory;
pub mod vector;

pub use pdv::Pdv;
pub use result::{ResearchDimensions, SearchResult, UrlUsage};
pub use trajectory::TrajectoryAccumulator;
