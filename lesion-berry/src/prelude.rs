//! 常用类型的统一导出.

pub use crate::attribution::{Attribution, OrganOverlap, OrganSlot};
pub use crate::catalog::{Catalog, Diaphragm, Laterality, OrganEntry};
pub use crate::classify::{ClavicleFinding, ClavicleRegion, Landmarks, Position};
pub use crate::deauville::ReferenceUptake;
pub use crate::error::{LesionError, Result, VolumeRole};
pub use crate::instance::InstanceMap;
pub use crate::metrics::{LesionMetrics, SuvStats};
pub use crate::pipeline::{analyze, run_batch, run_subject, AnalysisOptions, BatchOutcome, SubjectReport};
pub use crate::report::{LesionRecord, Summary};
pub use crate::subject::{FilePatterns, SubjectPaths, SubjectVolumes};
pub use crate::{AnatomyVolume, Idx3d, MaskVolume, NiftiHeaderAttr, PetVolume, Point3d, Volume};
