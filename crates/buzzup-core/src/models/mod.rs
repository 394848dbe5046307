pub mod batch;
pub mod file_item;
pub mod task;

pub use batch::BatchResult;
pub use file_item::FileItem;
pub use task::{TaskState, UploadTask};
