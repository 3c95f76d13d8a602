//! 课件包 - 基础设施层
//!
//! 定位内容目录中的光盘镜像，并把它解包到独占的临时目录

pub mod extract;
pub mod locate;
pub mod scratch;

pub use extract::{extract_iso, extract_iso_blocking, ExtractSummary};
pub use locate::find_course_package;
pub use scratch::ScratchDir;
