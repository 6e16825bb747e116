pub mod assemble;
pub mod builder;
pub mod compile;
pub mod encode;
pub mod locate;
pub mod metadata;
pub mod paths;
pub mod refset;
pub mod walker;

pub use builder::{BuildResult, ScriptBuilder, StagingFailure, StagingReport};
pub use compile::{CompileOutcome, CompileRequest, Compiler, CscCompiler};
pub use locate::{LocateError, Locator};
pub use metadata::{MetadataError, ReferenceScanner, SidecarScanner};
pub use refset::{ReferenceSet, same_assembly};
pub use walker::{WalkError, walk};
